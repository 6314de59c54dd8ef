use alloc::string::String;

use thiserror::Error;

use crate::arena::GroupKey;

/// A grammar that cannot be assembled.
///
/// Reported by [`GrammarBuilder::build`](crate::GrammarBuilder::build), before
/// any input is parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar defines no states")]
    NoStates,
    #[error("duplicate state name '{0}'")]
    DuplicateState(String),
    #[error("initial state '{0}' is not defined")]
    UnknownInitialState(String),
    #[error("transition {index} of state '{state}' targets undefined state '{target}'")]
    UnknownTarget {
        state: String,
        index: usize,
        target: String,
    },
    #[error("state '{state}' defines more than one rule for tag '{tag}'")]
    DuplicateRule { state: String, tag: String },
}

/// A failure while running the engine over a token stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input ended with open scopes while strict scoping was enabled.
    #[error("input ended inside state '{state}' with {depth} open scope(s)")]
    UnterminatedScope { state: String, depth: usize },
    #[error("descending from state '{state}' exceeds the depth limit of {limit}")]
    DepthLimit { state: String, limit: usize },
    /// A step neither consumed a token, closed a scope, nor halted.
    #[error("state '{state}' made no progress at token {cursor}")]
    NoProgress { state: String, cursor: usize },
    /// A transition with a reject outcome fired.
    #[error("state '{state}' rejected token {token}")]
    Rejected { state: String, token: usize },
    /// The arena has no group for a key the engine handed out. This is a bug
    /// in the engine, not in the input.
    #[error("internal error: group {0} was never allocated")]
    MissingGroup(GroupKey),
    /// A state id that does not belong to the running grammar.
    #[error("internal error: no state with id {0}")]
    MissingState(usize),
}

/// An arena that breaks one of the output invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("group {group} holds an empty fragment under '{name}'")]
    EmptyFragment { group: GroupKey, name: String },
    #[error("group {group} references missing group {target} under '{name}'")]
    DanglingReference {
        group: GroupKey,
        name: String,
        target: GroupKey,
    },
    /// Children are always allocated after their parent.
    #[error("group {group} references earlier group {target} under '{name}'")]
    BackwardReference {
        group: GroupKey,
        name: String,
        target: GroupKey,
    },
    #[error("group {0} is referenced more than once")]
    SharedGroup(GroupKey),
}
