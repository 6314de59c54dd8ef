//! The driver loop.
//!
//! The engine never recurses: it repeatedly asks the active state to process
//! the context and switches to whatever state comes back, so nesting depth is
//! bounded by the context's explicit stack, not by the native call stack.

use alloc::{string::String, vec::Vec};

use tracing::{debug, trace};

use crate::{
    arena::{Arena, Tree},
    context::{ParseContext, RunStats},
    error::ParseError,
    grammar::{Grammar, StateId},
    options::ParserOptions,
    state::Step,
    token::Token,
};

/// Drive `ctx` from `initial` until a state halts.
///
/// Every step must consume a token, close a scope, or halt; a step that does
/// none of these fails with [`ParseError::NoProgress`] instead of spinning.
pub fn run(initial: StateId, ctx: &mut ParseContext<'_, '_>) -> Result<RunStats, ParseError> {
    let grammar = ctx.grammar();
    let mut active = initial;

    loop {
        let state = grammar.state(active).ok_or(ParseError::MissingState(active.index()))?;
        let cursor = ctx.cursor();
        let depth = ctx.depth();
        trace!(state = state.name(), cursor, depth, "process");

        let step = state.process(active, ctx)?;
        ctx.record_step();

        match step {
            Step::Halt(true) => {
                let stats = ctx.stats();
                debug!(
                    steps = stats.steps,
                    groups = ctx.arena().len(),
                    max_depth = stats.max_depth,
                    "accepted"
                );
                return Ok(stats);
            }
            Step::Halt(false) => {
                let token = ctx.cursor().saturating_sub(1);
                debug!(state = state.name(), token, "rejected");
                return Err(ParseError::Rejected {
                    state: String::from(state.name()),
                    token,
                });
            }
            Step::Switch(next) => {
                if ctx.cursor() == cursor && ctx.depth() >= depth {
                    return Err(ParseError::NoProgress {
                        state: String::from(state.name()),
                        cursor,
                    });
                }
                if ctx.depth() > depth {
                    debug!(
                        from = state.name(),
                        group = %ctx.current_group(),
                        depth = ctx.depth(),
                        "descend"
                    );
                } else {
                    debug!(
                        from = state.name(),
                        group = %ctx.current_group(),
                        depth = ctx.depth(),
                        "ascend"
                    );
                }
                active = next;
            }
        }
    }
}

/// Result of a completed run: the arena plus run counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    arena: Arena,
    stats: RunStats,
}

impl Parsed {
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[must_use]
    pub fn into_arena(self) -> Arena {
        self.arena
    }

    #[must_use]
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// View of the root group.
    #[must_use]
    pub fn tree(&self) -> Tree<'_> {
        self.arena.root()
    }
}

pub(crate) fn parse(
    grammar: &Grammar,
    tokens: Vec<Token<'_>>,
    options: ParserOptions,
) -> Result<Parsed, ParseError> {
    let mut ctx = ParseContext::new(grammar, tokens, options);
    let stats = run(grammar.initial(), &mut ctx)?;
    Ok(Parsed {
        arena: ctx.into_arena(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::{Entry, GroupKey, StateDef, TokenRule, TransitionDef, Trigger};

    fn call_grammar() -> Grammar {
        Grammar::builder("root")
            .state(StateDef::new("root").transition(
                TransitionDef::descend(Trigger::tag("LPAREN"), "args").group_boundary(),
            ))
            .state(
                StateDef::new("args")
                    .transition(TransitionDef::ascend(Trigger::tag("RPAREN")))
                    .transition(
                        TransitionDef::descend(Trigger::tag("LPAREN"), "args").group_boundary(),
                    )
                    .rule("COMMA", TokenRule::DELIMIT),
            )
            .build()
            .unwrap()
    }

    fn toks(pairs: &[(&'static str, &'static str)]) -> Vec<Token<'static>> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (tag, text))| Token::new(i, tag, text))
            .collect()
    }

    #[test]
    fn nested_calls_balance_the_stack() {
        let grammar = call_grammar();
        let parsed = grammar
            .parse_tokens(
                toks(&[
                    ("WORD", "f"),
                    ("LPAREN", "("),
                    ("WORD", "a"),
                    ("COMMA", ","),
                    ("WORD", "g"),
                    ("LPAREN", "("),
                    ("WORD", "b"),
                    ("RPAREN", ")"),
                    ("COMMA", ","),
                    ("WORD", "c"),
                    ("RPAREN", ")"),
                ]),
                ParserOptions::default(),
            )
            .unwrap();

        let stats = parsed.stats();
        assert_eq!(stats.pushes, 2);
        assert_eq!(stats.pops, 2);
        assert_eq!(stats.max_depth, 2);
        // root, args, args, args (resumed), root (resumed)
        assert_eq!(stats.steps, 5);

        let arena = parsed.arena();
        assert_eq!(arena.len(), 3);
        assert_eq!(
            arena.entries(GroupKey::new(1), "args"),
            &[
                Entry::Text("a".into()),
                Entry::Text("g".into()),
                Entry::Group(GroupKey::new(2)),
                Entry::Text("c".into()),
            ]
        );
        assert_eq!(arena.check_invariants(), Ok(()));
    }

    #[test]
    fn reject_reports_state_and_token() {
        let grammar = Grammar::builder("root")
            .state(StateDef::new("root").transition(TransitionDef::reject(Trigger::tag("BAD"))))
            .build()
            .unwrap();
        let err = grammar
            .parse_tokens(toks(&[("WORD", "x"), ("BAD", "!")]), ParserOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::Rejected {
                state: "root".into(),
                token: 1,
            }
        );
    }

    #[test]
    fn strict_scopes_fail_on_unterminated_input() {
        let grammar = call_grammar();
        let options = ParserOptions {
            strict_scopes: true,
            ..Default::default()
        };
        let err = grammar
            .parse_tokens(toks(&[("WORD", "x"), ("LPAREN", "(")]), options)
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::UnterminatedScope {
                state: "args".into(),
                depth: 1,
            }
        );

        let ok = grammar.parse_tokens(toks(&[("LPAREN", "("), ("RPAREN", ")")]), options);
        assert!(ok.is_ok());
    }

    #[test]
    fn run_without_tokens_halts_immediately() {
        let grammar = call_grammar();
        let parsed = grammar.parse_tokens(vec![], ParserOptions::default()).unwrap();
        assert_eq!(parsed.stats().steps, 1);
        assert_eq!(parsed.arena().len(), 1);
        assert!(parsed.tree().is_empty());
    }
}
