//! A stack-based token-scanning parser engine.
//!
//! A [`Grammar`] is a set of named states. Each state scans tokens, buffering
//! their text, until one of its transitions fires; a transition either
//! descends into a child state or ascends back to the suspended caller. The
//! engine keeps callers on an explicit stack, so arbitrarily deep input never
//! grows the native call stack.
//!
//! Output goes to an [`Arena`] of integer-keyed groups. Each group maps a state
//! name to an ordered list of text fragments and references to child groups.
//! Only transitions flagged [`TransitionFlag::GroupBoundary`] open a new
//! group; other descents write into their caller's group.
//!
//! Tokenization is not part of this crate: implement [`Lexer`] for your token
//! alphabet and hand it to a [`GroupParser`], or call
//! [`Grammar::parse_tokens`] directly.

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod arena;
mod context;
mod engine;
mod error;
mod grammar;
mod options;
mod parser;
mod state;
mod token;

#[cfg(test)]
mod tests;

pub use arena::{Arena, Entry, Group, GroupKey, Tree, TreeItem};
pub use context::{DebugInfo, Frame, ParseContext, RunStats};
pub use engine::{Parsed, run};
pub use error::{GrammarError, InvariantViolation, ParseError};
pub use grammar::{
    Grammar, GrammarBuilder, GrammarWarning, StateDef, StateId, TokenRule, Transition,
    TransitionDef, TransitionFlag, TransitionOutcome, Trigger,
};
pub use options::ParserOptions;
pub use parser::GroupParser;
pub use state::{State, Step};
pub use token::{Lexer, Token, TokenSnapshot};
