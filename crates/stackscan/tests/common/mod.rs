#![allow(missing_docs)]
#![allow(dead_code)]

use core::fmt::Write;

use logos::Logos;
use stackscan::{Arena, Entry, Grammar, Lexer, StateDef, Token, TokenRule, TransitionDef, Trigger};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallToken {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("\"")]
    Quote,
    #[regex(r"[ \t\r\n]+")]
    Space,
    #[regex(r#"[^ \t\r\n(),"]+"#)]
    Word,
}

impl CallToken {
    pub fn tag(self) -> &'static str {
        match self {
            CallToken::LParen => "LPAREN",
            CallToken::RParen => "RPAREN",
            CallToken::Comma => "COMMA",
            CallToken::Quote => "QUOTE",
            CallToken::Space => "SPACE",
            CallToken::Word => "WORD",
        }
    }
}

/// Lexer for call expressions such as `f(a, "b c", g(d))`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallLexer;

impl Lexer for CallLexer {
    fn tokenize<'src>(&self, text: &'src str) -> Vec<Token<'src>> {
        CallToken::lexer(text)
            .spanned()
            .enumerate()
            .map(|(index, (token, span))| {
                let tag = token.map_or("ERROR", CallToken::tag);
                Token::new(index, tag, &text[span])
            })
            .collect()
    }
}

fn open_args() -> TransitionDef {
    TransitionDef::descend(Trigger::tag("LPAREN"), "args").group_boundary()
}

/// Calls with comma-separated arguments. Every argument list gets its own
/// group.
pub fn call_grammar() -> Grammar {
    Grammar::builder("root")
        .state(StateDef::new("root").transition(open_args()))
        .state(
            StateDef::new("args")
                .transition(TransitionDef::ascend(Trigger::tag("RPAREN")))
                .transition(open_args())
                .rule("COMMA", TokenRule::DELIMIT)
                .rule("SPACE", TokenRule::CONSUME),
        )
        .build()
        .unwrap()
}

/// [`call_grammar`] plus quoted strings. A string shares the group of the
/// argument list it appears in and keeps its closing quote.
pub fn quoted_call_grammar() -> Grammar {
    Grammar::builder("root")
        .state(StateDef::new("root").transition(open_args()))
        .state(
            StateDef::new("args")
                .transition(TransitionDef::ascend(Trigger::tag("RPAREN")))
                .transition(open_args())
                .transition(TransitionDef::descend(Trigger::tag("QUOTE"), "string"))
                .rule("COMMA", TokenRule::DELIMIT)
                .rule("SPACE", TokenRule::CONSUME),
        )
        .state(
            StateDef::new("string")
                .transition(TransitionDef::ascend(Trigger::tag("QUOTE")).write_trigger_token()),
        )
        .build()
        .unwrap()
}

/// One line per group: `#key name=[items]`.
pub fn render_arena(arena: &Arena) -> String {
    let mut out = String::new();
    for (key, group) in arena.iter() {
        if !out.is_empty() {
            out.push('\n');
        }
        write!(out, "{key}").unwrap();
        for (name, entries) in group {
            let items: Vec<String> = entries
                .iter()
                .map(|entry| match entry {
                    Entry::Text(text) => format!("{text:?}"),
                    Entry::Group(child) => child.to_string(),
                })
                .collect();
            write!(out, " {name}=[{}]", items.join(", ")).unwrap();
        }
    }
    out
}
