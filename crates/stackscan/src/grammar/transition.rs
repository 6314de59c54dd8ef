use alloc::{collections::BTreeSet, string::String};

use super::StateId;

/// The set of token tags a transition fires on.
///
/// Triggers are plain data rather than closures so that a grammar stays
/// `Send + Sync` and its dead or shadowed edges can be found by
/// [`Grammar::lint`](super::Grammar::lint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Fires on every tag.
    Any,
    /// Fires on exactly these tags. An empty set never fires.
    Tags(BTreeSet<String>),
    /// Fires on every tag except these.
    AnyExcept(BTreeSet<String>),
}

impl Trigger {
    /// Fire on any of `tags`.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tags(tags.into_iter().map(Into::into).collect())
    }

    /// Fire on a single tag.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::tags([tag])
    }

    /// Fire on anything but `tags`.
    pub fn any_except<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyExcept(tags.into_iter().map(Into::into).collect())
    }

    /// Pure predicate over a token tag.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            Trigger::Any => true,
            Trigger::Tags(tags) => tags.contains(tag),
            Trigger::AnyExcept(tags) => !tags.contains(tag),
        }
    }

    /// Whether no tag can ever satisfy this trigger.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        matches!(self, Trigger::Tags(tags) if tags.is_empty())
    }

    /// Whether every tag satisfies this trigger.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        match self {
            Trigger::Any => true,
            Trigger::Tags(_) => false,
            Trigger::AnyExcept(tags) => tags.is_empty(),
        }
    }
}

/// Behavioral flags carried by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionFlag {
    /// The descent opens a new arena group for the child state. Without it the
    /// child writes into its caller's group.
    GroupBoundary,
    /// The triggering token's text is written to the pending buffer before it
    /// is flushed, so the delimiter becomes content.
    WriteTriggerToken,
}

/// What happens when a transition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Return control to the suspended caller state.
    Ascend,
    /// Switch into a child state, suspending the current one.
    Descend(StateId),
    /// Halt the parse as rejected.
    Reject,
}

/// A resolved edge out of a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub(super) trigger: Trigger,
    pub(super) group_boundary: bool,
    pub(super) write_trigger_token: bool,
    pub(super) outcome: TransitionOutcome,
}

impl Transition {
    /// Whether this edge fires for `tag`. Side-effect free.
    #[must_use]
    #[inline]
    pub fn matches(&self, tag: &str) -> bool {
        self.trigger.matches(tag)
    }

    /// The outcome of taking this edge.
    #[must_use]
    pub fn perform(&self) -> TransitionOutcome {
        self.outcome
    }

    #[must_use]
    pub fn has_flag(&self, flag: TransitionFlag) -> bool {
        match flag {
            TransitionFlag::GroupBoundary => self.group_boundary,
            TransitionFlag::WriteTriggerToken => self.write_trigger_token,
        }
    }

    #[must_use]
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }
}

/// Where a transition goes, before state names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Target {
    Ascend,
    Descend(String),
    Reject,
}

/// Builder-side description of a transition.
///
/// ```rust
/// use stackscan::{TransitionDef, Trigger};
///
/// let open = TransitionDef::descend(Trigger::tag("LPAREN"), "args").group_boundary();
/// let close = TransitionDef::ascend(Trigger::tag("RPAREN"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionDef {
    pub(super) trigger: Trigger,
    pub(super) target: Target,
    pub(super) group_boundary: bool,
    pub(super) write_trigger_token: bool,
}

impl TransitionDef {
    fn new(trigger: Trigger, target: Target) -> Self {
        Self {
            trigger,
            target,
            group_boundary: false,
            write_trigger_token: false,
        }
    }

    /// Return to the caller when `trigger` fires.
    #[must_use]
    pub fn ascend(trigger: Trigger) -> Self {
        Self::new(trigger, Target::Ascend)
    }

    /// Enter the state named `target` when `trigger` fires.
    #[must_use]
    pub fn descend(trigger: Trigger, target: impl Into<String>) -> Self {
        Self::new(trigger, Target::Descend(target.into()))
    }

    /// Halt the parse as rejected when `trigger` fires.
    #[must_use]
    pub fn reject(trigger: Trigger) -> Self {
        Self::new(trigger, Target::Reject)
    }

    /// Set [`TransitionFlag::GroupBoundary`].
    #[must_use]
    pub fn group_boundary(mut self) -> Self {
        self.group_boundary = true;
        self
    }

    /// Set [`TransitionFlag::WriteTriggerToken`].
    #[must_use]
    pub fn write_trigger_token(mut self) -> Self {
        self.write_trigger_token = true;
        self
    }

    /// Set a flag by value.
    #[must_use]
    pub fn flag(self, flag: TransitionFlag) -> Self {
        match flag {
            TransitionFlag::GroupBoundary => self.group_boundary(),
            TransitionFlag::WriteTriggerToken => self.write_trigger_token(),
        }
    }
}
