
use alloc::{format, string::String, vec::Vec};
use core::cell::Cell;

use crate::{Arena, Entry, Grammar, Lexer, StateDef, Token, TokenRule, TransitionDef, Trigger};

/// Splits input into `LPAREN`, `RPAREN`, `COMMA`, `WS` runs and `WORD` runs.
/// Counts how often it is invoked.
#[derive(Debug, Default)]
pub(crate) struct CallLexer {
    pub(crate) calls: Cell<usize>,
}

fn class(c: char) -> &'static str {
    match c {
        '(' => "LPAREN",
        ')' => "RPAREN",
        ',' => "COMMA",
        c if c.is_whitespace() => "WS",
        _ => "WORD",
    }
}

impl Lexer for CallLexer {
    fn tokenize<'src>(&self, text: &'src str) -> Vec<Token<'src>> {
        self.calls.set(self.calls.get() + 1);

        let mut tokens = Vec::new();
        let mut start = 0;
        let mut current: Option<&'static str> = None;
        for (at, c) in text.char_indices() {
            let tag = class(c);
            let runs = matches!(tag, "WORD" | "WS");
            if let Some(open) = current {
                if open != tag || !runs {
                    tokens.push(Token::new(tokens.len(), open, &text[start..at]));
                    start = at;
                }
            }
            current = Some(tag);
        }
        if let Some(open) = current {
            tokens.push(Token::new(tokens.len(), open, &text[start..]));
        }
        tokens
    }
}

/// Root buffers words; `(` opens an `args` group; `,` separates arguments;
/// `)` closes the group. Whitespace inside `args` is dropped.
pub(crate) fn call_grammar() -> Grammar {
    let open = || TransitionDef::descend(Trigger::tag("LPAREN"), "args").group_boundary();
    Grammar::builder("root")
        .state(StateDef::new("root").transition(open()))
        .state(
            StateDef::new("args")
                .transition(TransitionDef::ascend(Trigger::tag("RPAREN")))
                .transition(open())
                .rule("COMMA", TokenRule::DELIMIT)
                .rule("WS", TokenRule::CONSUME),
        )
        .build()
        .unwrap()
}

/// One line per arena: `#key name=[items]` per group, groups joined by ` | `.
pub(crate) fn render(arena: &Arena) -> String {
    let groups: Vec<String> = arena
        .iter()
        .map(|(key, group)| {
            let mut line = format!("{key}");
            for (name, entries) in group {
                let items: Vec<String> = entries
                    .iter()
                    .map(|entry| match entry {
                        Entry::Text(text) => format!("{text:?}"),
                        Entry::Group(child) => format!("{child}"),
                    })
                    .collect();
                line.push_str(&format!(" {name}=[{}]", items.join(", ")));
            }
            line
        })
        .collect();
    groups.join(" | ")
}

pub(crate) fn toks(pairs: &[(&'static str, &'static str)]) -> Vec<Token<'static>> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (tag, text))| Token::new(i, tag, text))
        .collect()
}

#[test]
fn call_lexer_covers_input() {
    let lexer = CallLexer::default();
    let tokens = lexer.tokenize("f(a, bb)");
    let tags: Vec<_> = tokens.iter().map(|t| t.tag).collect();
    assert_eq!(
        tags,
        ["WORD", "LPAREN", "WORD", "COMMA", "WS", "WORD", "RPAREN"]
    );
    let text: String = tokens.iter().map(|t| t.text).collect();
    assert_eq!(text, "f(a, bb)");
    assert_eq!(lexer.calls.get(), 1);
}
