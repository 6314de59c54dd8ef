//! Grammar configuration: states, their transitions, and per-tag token rules.
//!
//! A grammar is assembled from name-based definitions with
//! [`GrammarBuilder`], which resolves every state name to a [`StateId`] and
//! rejects malformed configurations before any input is parsed. The resulting
//! [`Grammar`] is immutable and can be shared across threads.

mod lint;
mod transition;

use alloc::{collections::BTreeMap, string::String, vec::Vec};

pub use lint::GrammarWarning;
pub use transition::{Transition, TransitionDef, TransitionFlag, TransitionOutcome, Trigger};
use transition::Target;

use crate::{
    engine::{self, Parsed},
    error::{GrammarError, ParseError},
    options::ParserOptions,
    state::State,
    token::Token,
};

/// Index of a state within its [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

impl StateId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a state does with a token that no transition claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenRule {
    /// Flush the pending buffer before handling the token.
    pub split: bool,
    /// Drop the token's text instead of appending it to the buffer.
    pub consume: bool,
}

impl TokenRule {
    /// Append the text, no flush. This is the rule for unlisted tags.
    pub const KEEP: TokenRule = TokenRule {
        split: false,
        consume: false,
    };
    /// Flush, then start the next fragment with the token's text.
    pub const SPLIT: TokenRule = TokenRule {
        split: true,
        consume: false,
    };
    /// Silently drop the token.
    pub const CONSUME: TokenRule = TokenRule {
        split: false,
        consume: true,
    };
    /// Flush and drop the token, as for a list separator.
    pub const DELIMIT: TokenRule = TokenRule {
        split: true,
        consume: true,
    };
}

/// Name-based definition of one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDef {
    name: String,
    transitions: Vec<TransitionDef>,
    rules: Vec<(String, TokenRule)>,
}

impl StateDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Register a transition. Transitions are tried in registration order.
    #[must_use]
    pub fn transition(mut self, transition: TransitionDef) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Set the rule for tokens tagged `tag`.
    #[must_use]
    pub fn rule(mut self, tag: impl Into<String>, rule: TokenRule) -> Self {
        self.rules.push((tag.into(), rule));
        self
    }
}

/// Assembles and validates a [`Grammar`].
///
/// ```rust
/// use stackscan::{Grammar, StateDef, TokenRule, TransitionDef, Trigger};
///
/// let grammar = Grammar::builder("root")
///     .state(StateDef::new("root").transition(
///         TransitionDef::descend(Trigger::tag("LPAREN"), "args").group_boundary(),
///     ))
///     .state(
///         StateDef::new("args")
///             .transition(TransitionDef::ascend(Trigger::tag("RPAREN")))
///             .rule("COMMA", TokenRule::DELIMIT),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(grammar.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    initial: String,
    states: Vec<StateDef>,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            initial: initial.into(),
            states: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(mut self, state: StateDef) -> Self {
        self.states.push(state);
        self
    }

    /// Resolve names and validate the configuration.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if self.states.is_empty() {
            return Err(GrammarError::NoStates);
        }

        let mut names = BTreeMap::new();
        for (i, def) in self.states.iter().enumerate() {
            if names.insert(def.name.clone(), StateId(i)).is_some() {
                return Err(GrammarError::DuplicateState(def.name.clone()));
            }
        }
        let initial = *names
            .get(&self.initial)
            .ok_or_else(|| GrammarError::UnknownInitialState(self.initial.clone()))?;

        let mut states = Vec::with_capacity(self.states.len());
        for def in self.states {
            let mut transitions = Vec::with_capacity(def.transitions.len());
            for (index, t) in def.transitions.into_iter().enumerate() {
                let outcome = match t.target {
                    Target::Ascend => TransitionOutcome::Ascend,
                    Target::Reject => TransitionOutcome::Reject,
                    Target::Descend(target) => match names.get(&target) {
                        Some(id) => TransitionOutcome::Descend(*id),
                        None => {
                            return Err(GrammarError::UnknownTarget {
                                state: def.name,
                                index,
                                target,
                            });
                        }
                    },
                };
                transitions.push(Transition {
                    trigger: t.trigger,
                    group_boundary: t.group_boundary,
                    write_trigger_token: t.write_trigger_token,
                    outcome,
                });
            }

            let mut rules = BTreeMap::new();
            for (tag, rule) in def.rules {
                if rules.contains_key(&tag) {
                    return Err(GrammarError::DuplicateRule {
                        state: def.name,
                        tag,
                    });
                }
                rules.insert(tag, rule);
            }

            states.push(State::new(def.name, transitions, rules));
        }

        Ok(Grammar {
            states,
            names,
            initial,
        })
    }
}

/// An immutable, validated set of states.
#[derive(Debug, Clone)]
pub struct Grammar {
    states: Vec<State>,
    names: BTreeMap<String, StateId>,
    initial: StateId,
}

impl Grammar {
    /// Start a grammar whose parses begin in the state named `initial`.
    #[must_use]
    pub fn builder(initial: impl Into<String>) -> GrammarBuilder {
        GrammarBuilder::new(initial)
    }

    #[must_use]
    pub fn initial(&self) -> StateId {
        self.initial
    }

    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    #[must_use]
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.names.get(name).copied()
    }

    /// States in definition order.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states.iter().enumerate().map(|(i, s)| (StateId(i), s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false` for a built grammar.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Run the engine over an already tokenized input, starting from the
    /// initial state with a fresh context.
    pub fn parse_tokens(
        &self,
        tokens: Vec<Token<'_>>,
        options: ParserOptions,
    ) -> Result<Parsed, ParseError> {
        engine::parse(self, tokens, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_grammar() -> GrammarBuilder {
        Grammar::builder("root")
            .state(StateDef::new("root").transition(
                TransitionDef::descend(Trigger::tag("LPAREN"), "args").group_boundary(),
            ))
            .state(
                StateDef::new("args")
                    .transition(TransitionDef::ascend(Trigger::tag("RPAREN")))
                    .rule("COMMA", TokenRule::DELIMIT),
            )
    }

    #[test]
    fn builds_and_resolves_names() {
        let grammar = call_grammar().build().unwrap();
        let args = grammar.state_id("args").unwrap();
        assert_eq!(grammar.initial(), grammar.state_id("root").unwrap());
        assert_eq!(args.index(), 1);

        let root = grammar.state(grammar.initial()).unwrap();
        assert_eq!(root.transitions()[0].perform(), TransitionOutcome::Descend(args));
        assert!(root.transitions()[0].has_flag(TransitionFlag::GroupBoundary));
        assert!(!root.transitions()[0].has_flag(TransitionFlag::WriteTriggerToken));

        let args = grammar.state(args).unwrap();
        assert_eq!(args.rule("COMMA"), TokenRule::DELIMIT);
        assert_eq!(args.rule("WORD"), TokenRule::KEEP);
    }

    #[test]
    fn rejects_empty_grammar() {
        assert_eq!(
            Grammar::builder("root").build().unwrap_err(),
            GrammarError::NoStates
        );
    }

    #[test]
    fn rejects_duplicate_state() {
        let err = call_grammar()
            .state(StateDef::new("args"))
            .build()
            .unwrap_err();
        assert_eq!(err, GrammarError::DuplicateState("args".into()));
    }

    #[test]
    fn rejects_unknown_initial_state() {
        let err = Grammar::builder("start")
            .state(StateDef::new("root"))
            .build()
            .unwrap_err();
        assert_eq!(err, GrammarError::UnknownInitialState("start".into()));
    }

    #[test]
    fn rejects_unknown_target() {
        let err = Grammar::builder("root")
            .state(
                StateDef::new("root")
                    .transition(TransitionDef::ascend(Trigger::tag("X")))
                    .transition(TransitionDef::descend(Trigger::tag("Y"), "missing")),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownTarget {
                state: "root".into(),
                index: 1,
                target: "missing".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_rule() {
        let err = Grammar::builder("root")
            .state(
                StateDef::new("root")
                    .rule("WS", TokenRule::CONSUME)
                    .rule("WS", TokenRule::SPLIT),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GrammarError::DuplicateRule {
                state: "root".into(),
                tag: "WS".into(),
            }
        );
    }

    #[test]
    fn grammar_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }
}
