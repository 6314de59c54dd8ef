use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::mem;

use crate::{
    context::ParseContext,
    error::ParseError,
    grammar::{StateId, TokenRule, Transition, TransitionFlag, TransitionOutcome},
};

/// Result of one [`State::process`] activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Continue with this state: a descended child, or the caller resumed
    /// after an ascend.
    Switch(StateId),
    /// Stop. `true` when the outermost scope closed, `false` when a reject
    /// transition fired.
    Halt(bool),
}

/// A scanning unit: consumes tokens until one of its transitions fires or the
/// input runs out.
///
/// States carry no per-parse data. Everything that changes during a run lives
/// in the [`ParseContext`], so one state can be suspended on the stack and
/// resumed any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    name: String,
    transitions: Vec<Transition>,
    rules: BTreeMap<String, TokenRule>,
}

impl State {
    pub(crate) fn new(
        name: String,
        transitions: Vec<Transition>,
        rules: BTreeMap<String, TokenRule>,
    ) -> Self {
        Self {
            name,
            transitions,
            rules,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transitions in the order they are tried.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    #[must_use]
    pub fn rules(&self) -> &BTreeMap<String, TokenRule> {
        &self.rules
    }

    /// The rule for `tag`, defaulting to [`TokenRule::KEEP`].
    #[must_use]
    pub fn rule(&self, tag: &str) -> TokenRule {
        self.rules.get(tag).copied().unwrap_or_default()
    }

    /// Scan from the context's cursor until a transition fires or the input
    /// ends, then resolve the outcome against the context's stack.
    ///
    /// The pending buffer is flushed under this state's name on a split rule,
    /// when a transition fires (after the trigger text, if the transition
    /// writes it), and at end of input. Empty buffers are never written.
    pub fn process(&self, id: StateId, ctx: &mut ParseContext<'_, '_>) -> Result<Step, ParseError> {
        let mut buffer = String::new();

        let fired = loop {
            let cursor = ctx.cursor();
            let Some(token) = ctx.token(cursor).copied() else {
                break None;
            };
            ctx.set_cursor(cursor + 1);

            if let Some(transition) = self.transitions.iter().find(|t| t.matches(token.tag)) {
                if transition.has_flag(TransitionFlag::WriteTriggerToken) {
                    buffer.push_str(token.text);
                }
                break Some(transition);
            }

            let rule = self.rule(token.tag);
            if rule.split {
                ctx.write_fragment(&self.name, mem::take(&mut buffer))?;
            }
            if !rule.consume {
                buffer.push_str(token.text);
            }
        };
        ctx.write_fragment(&self.name, buffer)?;

        let Some(transition) = fired else {
            if ctx.options().strict_scopes && ctx.depth() > 0 {
                return Err(ParseError::UnterminatedScope {
                    state: self.name.clone(),
                    depth: ctx.depth(),
                });
            }
            return self.ascend(ctx);
        };

        match transition.perform() {
            TransitionOutcome::Ascend => self.ascend(ctx),
            TransitionOutcome::Descend(child) => {
                ctx.push_frame(id, transition.has_flag(TransitionFlag::GroupBoundary))?;
                Ok(Step::Switch(child))
            }
            TransitionOutcome::Reject => Ok(Step::Halt(false)),
        }
    }

    fn ascend(&self, ctx: &mut ParseContext<'_, '_>) -> Result<Step, ParseError> {
        Ok(match ctx.pop_frame(&self.name)? {
            Some(frame) => Step::Switch(frame.caller),
            None => Step::Halt(true),
        })
    }
}
