#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stackscan::{
    Grammar, ParseError, ParserOptions, StateDef, Token, TokenRule, TransitionDef, Trigger,
};

const TAGS: [&str; 4] = ["a", "b", "c", "d"];
const TEXTS: [&str; 5] = ["", "x", "yy", " ", "é"];
const MAX_STATES: u8 = 6;

#[derive(Debug, Arbitrary)]
enum TriggerInput {
    Any,
    Tags(Vec<u8>),
    AnyExcept(Vec<u8>),
}

#[derive(Debug, Arbitrary)]
enum OutcomeInput {
    Ascend,
    Descend(u8),
    Reject,
}

#[derive(Debug, Arbitrary)]
struct TransitionInput {
    trigger: TriggerInput,
    outcome: OutcomeInput,
    group_boundary: bool,
    write_trigger_token: bool,
}

#[derive(Debug, Arbitrary)]
struct StateInput {
    transitions: Vec<TransitionInput>,
    rules: Vec<(u8, bool, bool)>,
}

#[derive(Debug, Arbitrary)]
struct Input {
    states: Vec<StateInput>,
    tokens: Vec<(u8, u8)>,
    strict_scopes: bool,
    max_depth: Option<u8>,
}

fn tag(byte: u8) -> &'static str {
    TAGS[usize::from(byte) % TAGS.len()]
}

fn tags(bytes: &[u8]) -> Vec<&'static str> {
    bytes.iter().map(|b| tag(*b)).collect()
}

impl Input {
    fn grammar(&self) -> Option<Grammar> {
        let count = self.states.len().min(usize::from(MAX_STATES));
        if count == 0 {
            return None;
        }

        let mut builder = Grammar::builder("s0");
        for (index, state) in self.states.iter().take(count).enumerate() {
            let mut def = StateDef::new(format!("s{index}"));
            for t in &state.transitions {
                let trigger = match &t.trigger {
                    TriggerInput::Any => Trigger::Any,
                    TriggerInput::Tags(bytes) => Trigger::tags(tags(bytes)),
                    TriggerInput::AnyExcept(bytes) => Trigger::any_except(tags(bytes)),
                };
                let mut def_t = match t.outcome {
                    OutcomeInput::Ascend => TransitionDef::ascend(trigger),
                    OutcomeInput::Descend(target) => TransitionDef::descend(
                        trigger,
                        format!("s{}", usize::from(target) % count),
                    ),
                    OutcomeInput::Reject => TransitionDef::reject(trigger),
                };
                if t.group_boundary {
                    def_t = def_t.group_boundary();
                }
                if t.write_trigger_token {
                    def_t = def_t.write_trigger_token();
                }
                def = def.transition(def_t);
            }

            let mut seen = Vec::new();
            for &(byte, split, consume) in &state.rules {
                let tag = tag(byte);
                if !seen.contains(&tag) {
                    seen.push(tag);
                    def = def.rule(tag, TokenRule { split, consume });
                }
            }
            builder = builder.state(def);
        }
        builder.build().ok()
    }

    fn tokens(&self) -> Vec<Token<'static>> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, &(t, x))| Token::new(i, tag(t), TEXTS[usize::from(x) % TEXTS.len()]))
            .collect()
    }
}

fuzz_target!(|input: Input| {
    let Some(grammar) = input.grammar() else {
        return;
    };
    let _ = grammar.lint();

    let tokens = input.tokens();
    let token_count = tokens.len();
    let options = ParserOptions {
        strict_scopes: input.strict_scopes,
        max_depth: input.max_depth.map(usize::from),
    };

    match grammar.parse_tokens(tokens, options) {
        Ok(parsed) => {
            let stats = parsed.stats();
            assert!(stats.is_balanced(), "unbalanced stack: {stats:?}");
            assert!(stats.max_depth <= token_count);
            assert!(parsed.arena().len() <= stats.pushes + 1);
            if let Err(violation) = parsed.arena().check_invariants() {
                panic!("{violation}");
            }
            assert_eq!(parsed.tree(), parsed.arena().root());
        }
        Err(ParseError::UnterminatedScope { depth, .. }) => {
            assert!(input.strict_scopes && depth > 0);
        }
        Err(ParseError::DepthLimit { limit, .. }) => {
            assert_eq!(Some(limit), options.max_depth);
        }
        Err(ParseError::Rejected { token, .. }) => {
            assert!(token < token_count);
        }
        Err(err) => panic!("unexpected error: {err}"),
    }
});
