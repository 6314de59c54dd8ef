use alloc::{collections::VecDeque, string::String, vec, vec::Vec};

use thiserror::Error;

use super::{Grammar, TransitionOutcome};

/// Configuration that is legal but cannot behave as written.
///
/// The engine runs such grammars unchanged; these are advisory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarWarning {
    #[error("transition {index} of state '{state}' has an empty trigger and never fires")]
    DeadTransition { state: String, index: usize },
    #[error("transition {index} of state '{state}' is shadowed by catch-all transition {by}")]
    ShadowedTransition {
        state: String,
        index: usize,
        by: usize,
    },
    /// Tokens with this tag are always claimed by a transition first.
    #[error("rule for tag '{tag}' in state '{state}' is never used")]
    UnusedRule { state: String, tag: String },
    #[error("state '{0}' cannot be reached from the initial state")]
    UnreachableState(String),
}

impl Grammar {
    /// Find dead, shadowed, and unreachable configuration.
    #[must_use]
    pub fn lint(&self) -> Vec<GrammarWarning> {
        let mut warnings = Vec::new();

        for (_, state) in self.states() {
            let mut catch_all = None;
            for (index, transition) in state.transitions().iter().enumerate() {
                if let Some(by) = catch_all {
                    warnings.push(GrammarWarning::ShadowedTransition {
                        state: state.name().into(),
                        index,
                        by,
                    });
                } else if transition.trigger().is_dead() {
                    warnings.push(GrammarWarning::DeadTransition {
                        state: state.name().into(),
                        index,
                    });
                } else if transition.trigger().is_catch_all() {
                    catch_all = Some(index);
                }
            }

            for tag in state.rules().keys() {
                if state.transitions().iter().any(|t| t.matches(tag)) {
                    warnings.push(GrammarWarning::UnusedRule {
                        state: state.name().into(),
                        tag: tag.clone(),
                    });
                }
            }
        }

        let mut reached = vec![false; self.len()];
        let mut queue = VecDeque::from([self.initial]);
        reached[self.initial.0] = true;
        while let Some(id) = queue.pop_front() {
            let Some(state) = self.state(id) else {
                continue;
            };
            for transition in state.transitions() {
                if let TransitionOutcome::Descend(next) = transition.perform() {
                    if !reached[next.0] {
                        reached[next.0] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        for (id, state) in self.states() {
            if !reached[id.0] {
                warnings.push(GrammarWarning::UnreachableState(state.name().into()));
            }
        }

        warnings
    }
}
