use alloc::{format, string::String, vec::Vec};

use crate::{
    arena::{Arena, Entry, GroupKey},
    error::ParseError,
    grammar::{Grammar, StateId},
    options::ParserOptions,
    token::{Token, TokenSnapshot},
};

/// A suspended caller on the parse stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Group that becomes current again when this frame is popped.
    pub resume_group: GroupKey,
    /// State to resume.
    pub caller: StateId,
}

/// Counters collected over one engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Number of state activations.
    pub steps: usize,
    pub pushes: usize,
    /// Pops that returned a frame. The final pop of an empty stack, which
    /// halts the run, is not counted.
    pub pops: usize,
    pub max_depth: usize,
}

impl RunStats {
    /// Whether every push was matched by a pop.
    #[cfg(any(test, feature = "fuzzing"))]
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.pushes == self.pops
    }
}

/// Diagnostic snapshot of a context. Not used by the parsing algorithm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DebugInfo {
    /// Token under the cursor, if any input remains.
    pub current_token: Option<TokenSnapshot>,
    /// One line per frame, outermost first: the group the frame resumes and
    /// the suspended state's name.
    pub stack_trace: Vec<String>,
    pub arena: Arena,
}

/// Per-run mutable state: tokens, cursor, explicit parse stack, and the
/// output arena.
///
/// A context is built fresh for every parse and never shared between runs.
/// The grammar it borrows is read-only.
#[derive(Debug)]
pub struct ParseContext<'g, 'src> {
    grammar: &'g Grammar,
    options: ParserOptions,
    tokens: Vec<Token<'src>>,
    cursor: usize,
    stack: Vec<Frame>,
    arena: Arena,
    current_group: GroupKey,
    stats: RunStats,
}

impl<'g, 'src> ParseContext<'g, 'src> {
    /// Create a context positioned at the first token, with the root group
    /// allocated and current.
    #[must_use]
    pub fn new(grammar: &'g Grammar, tokens: Vec<Token<'src>>, options: ParserOptions) -> Self {
        let mut arena = Arena::new();
        let root = arena.allocate();
        Self {
            grammar,
            options,
            tokens,
            cursor: 0,
            stack: Vec::new(),
            arena,
            current_group: root,
            stats: RunStats::default(),
        }
    }

    #[must_use]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    #[must_use]
    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Bounds-checked token lookup. `None` past the end signals end of input.
    #[must_use]
    pub fn token(&self, index: usize) -> Option<&Token<'src>> {
        self.tokens.get(index)
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor. The cursor never moves backwards within a run.
    pub fn set_cursor(&mut self, cursor: usize) {
        debug_assert!(
            cursor >= self.cursor,
            "cursor moved backwards from {} to {cursor}",
            self.cursor
        );
        self.cursor = cursor;
    }

    /// Number of suspended frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn stack(&self) -> &[Frame] {
        &self.stack
    }

    #[must_use]
    pub fn current_group(&self) -> GroupKey {
        self.current_group
    }

    #[must_use]
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub(crate) fn record_step(&mut self) {
        self.stats.steps += 1;
    }

    /// Suspend `caller`. When `opens_new_group` is set, the next group key is
    /// allocated and becomes current; otherwise the child shares the caller's
    /// group.
    pub fn push_frame(&mut self, caller: StateId, opens_new_group: bool) -> Result<(), ParseError> {
        if let Some(limit) = self.options.max_depth {
            if self.stack.len() >= limit {
                return Err(ParseError::DepthLimit {
                    state: self.state_name(caller).into(),
                    limit,
                });
            }
        }

        self.stack.push(Frame {
            resume_group: self.current_group,
            caller,
        });
        if opens_new_group {
            self.current_group = self.arena.allocate();
        }

        self.stats.pushes += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
        Ok(())
    }

    /// Pop the innermost frame as `exiting_state` closes.
    ///
    /// Restores the frame's group. If the exiting scope ran in its own group,
    /// that group's key is appended to the parent group under
    /// `exiting_state`. Returns `None` when the stack is already empty, which
    /// is how the outermost scope ends the run.
    pub fn pop_frame(&mut self, exiting_state: &str) -> Result<Option<Frame>, ParseError> {
        let Some(frame) = self.stack.pop() else {
            return Ok(None);
        };

        let child = self.current_group;
        self.current_group = frame.resume_group;
        if child != frame.resume_group {
            if self.arena.get(child).is_none() {
                return Err(ParseError::MissingGroup(child));
            }
            self.arena.push(frame.resume_group, exiting_state, Entry::Group(child))?;
        }

        self.stats.pops += 1;
        Ok(Some(frame))
    }

    /// Append `text` to the current group under `state_name`. Empty text is
    /// dropped.
    pub fn write_fragment(&mut self, state_name: &str, text: String) -> Result<(), ParseError> {
        if text.is_empty() {
            return Ok(());
        }
        self.arena
            .push(self.current_group, state_name, Entry::Text(text))
    }

    /// Entries under `state_name` in the current group.
    #[must_use]
    pub fn read_fragments(&self, state_name: &str) -> &[Entry] {
        self.arena.entries(self.current_group, state_name)
    }

    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[must_use]
    pub fn into_arena(self) -> Arena {
        self.arena
    }

    /// Render the stack, outermost frame first.
    #[must_use]
    pub fn stack_trace(&self) -> Vec<String> {
        self.stack
            .iter()
            .map(|frame| format!("{} {}", frame.resume_group, self.state_name(frame.caller)))
            .collect()
    }

    #[must_use]
    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            current_token: self.token(self.cursor).map(TokenSnapshot::from),
            stack_trace: self.stack_trace(),
            arena: self.arena.clone(),
        }
    }

    /// Like [`debug_info`](Self::debug_info), but moves the arena out.
    #[must_use]
    pub fn into_debug_info(self) -> DebugInfo {
        DebugInfo {
            current_token: self.token(self.cursor).map(TokenSnapshot::from),
            stack_trace: self.stack_trace(),
            arena: self.arena,
        }
    }

    fn state_name(&self, id: StateId) -> &'g str {
        self.grammar.state(id).map_or("?", |state| state.name())
    }
}
