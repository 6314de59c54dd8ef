//! Output arena: integer-keyed groups of named fragment lists.
//!
//! Nesting is encoded without pointers. Each group maps a state name to an
//! ordered list of [`Entry`] values, and a child scope that ran in its own
//! group shows up in its parent as an [`Entry::Group`] holding the child's key,
//! filed under the child state's name.
//!
//! Keys are allocated densely from 0 in the order scopes are opened, so a
//! child's key is always greater than its parent's. [`Arena::tree`] relies on
//! that ordering to resolve references bottom-up without recursion.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::String,
    vec::Vec,
};
use core::fmt;

use crate::error::{InvariantViolation, ParseError};

/// Identifies one group in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct GroupKey(usize);

impl GroupKey {
    /// The root group every parse writes into first.
    pub const ROOT: GroupKey = GroupKey(0);

    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element of a group's fragment list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Entry {
    /// Literal text flushed from a state's buffer. Never empty.
    Text(String),
    /// Reference to a nested group.
    Group(GroupKey),
}

impl Entry {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Entry::Text(text) => Some(text),
            Entry::Group(_) => None,
        }
    }

    #[must_use]
    pub fn as_group(&self) -> Option<GroupKey> {
        match self {
            Entry::Text(_) => None,
            Entry::Group(key) => Some(*key),
        }
    }
}

/// A bucket of the arena: state name to ordered entries.
pub type Group = BTreeMap<String, Vec<Entry>>;

/// All groups produced by one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Arena {
    groups: Vec<Group>,
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: GroupKey) -> Option<&Group> {
        self.groups.get(key.0)
    }

    /// The entries stored under `name` in group `key`, or an empty slice.
    #[must_use]
    pub fn entries(&self, key: GroupKey, name: &str) -> &[Entry] {
        self.get(key)
            .and_then(|group| group.get(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupKey, &Group)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, group)| (GroupKey(i), group))
    }

    pub(crate) fn next_key(&self) -> GroupKey {
        GroupKey(self.groups.len())
    }

    pub(crate) fn allocate(&mut self) -> GroupKey {
        let key = self.next_key();
        self.groups.push(Group::new());
        key
    }

    pub(crate) fn push(
        &mut self,
        key: GroupKey,
        name: &str,
        entry: Entry,
    ) -> Result<(), ParseError> {
        let group = self
            .groups
            .get_mut(key.0)
            .ok_or(ParseError::MissingGroup(key))?;
        match group.get_mut(name) {
            Some(entries) => entries.push(entry),
            None => {
                group.insert(name.into(), alloc::vec![entry]);
            }
        }
        Ok(())
    }

    /// Check the output invariants: no empty fragments, every reference
    /// resolves to a later group, and no group is referenced twice.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = BTreeSet::new();
        for (group, entries) in self.iter() {
            for (name, list) in entries {
                for entry in list {
                    match entry {
                        Entry::Text(text) if text.is_empty() => {
                            return Err(InvariantViolation::EmptyFragment {
                                group,
                                name: name.clone(),
                            });
                        }
                        Entry::Text(_) => {}
                        Entry::Group(target) => {
                            if self.get(*target).is_none() {
                                return Err(InvariantViolation::DanglingReference {
                                    group,
                                    name: name.clone(),
                                    target: *target,
                                });
                            }
                            if *target <= group {
                                return Err(InvariantViolation::BackwardReference {
                                    group,
                                    name: name.clone(),
                                    target: *target,
                                });
                            }
                            if !seen.insert(*target) {
                                return Err(InvariantViolation::SharedGroup(*target));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// A view of group `key` that resolves references on demand.
    ///
    /// Returns `None` if `key` was never allocated.
    #[must_use]
    pub fn tree(&self, key: GroupKey) -> Option<Tree<'_>> {
        self.get(key)?;
        Some(Tree { arena: self, key })
    }

    /// A view of the root group. Empty if nothing was allocated.
    #[must_use]
    pub fn root(&self) -> Tree<'_> {
        Tree {
            arena: self,
            key: GroupKey::ROOT,
        }
    }
}

static EMPTY_ARENA: Arena = Arena { groups: Vec::new() };
static EMPTY_GROUP: Group = BTreeMap::new();

/// Borrowed view of one arena group with references resolved lazily.
///
/// A `Tree` is two words: the arena and a group key. Walking into a nested
/// group yields another view, so no operation on a tree needs native stack
/// proportional to nesting depth. A reference that breaks the key ordering
/// resolves to an empty tree rather than looping.
#[derive(Clone, Copy)]
pub struct Tree<'a> {
    arena: &'a Arena,
    key: GroupKey,
}

/// One element of a [`Tree`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeItem<'a> {
    Text(&'a str),
    Group(Tree<'a>),
}

impl<'a> Tree<'a> {
    fn group(self) -> &'a Group {
        self.arena.get(self.key).unwrap_or(&EMPTY_GROUP)
    }

    fn resolve(self, entry: &'a Entry) -> TreeItem<'a> {
        match entry {
            Entry::Text(text) => TreeItem::Text(text),
            Entry::Group(child) if *child > self.key => TreeItem::Group(Tree {
                arena: self.arena,
                key: *child,
            }),
            Entry::Group(child) => TreeItem::Group(Tree {
                arena: &EMPTY_ARENA,
                key: *child,
            }),
        }
    }

    /// Key of the arena group this tree views.
    #[must_use]
    pub fn key(self) -> GroupKey {
        self.key
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.group().is_empty()
    }

    /// State names present in this group, in sorted order.
    pub fn names(self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.group().keys().map(String::as_str)
    }

    /// Items written under `name`, in write order.
    pub fn get(self, name: &str) -> impl Iterator<Item = TreeItem<'a>> + use<'a> {
        let entries = self.group().get(name).map_or(&[][..], Vec::as_slice);
        entries.iter().map(move |entry| self.resolve(entry))
    }

    /// Text fragments under `name`, skipping nested groups.
    pub fn fragments(self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.get(name).filter_map(|item| match item {
            TreeItem::Text(text) => Some(text),
            TreeItem::Group(_) => None,
        })
    }

    /// Nested groups under `name`.
    pub fn groups(self, name: &str) -> impl Iterator<Item = Tree<'a>> + use<'a> {
        self.get(name).filter_map(|item| match item {
            TreeItem::Text(_) => None,
            TreeItem::Group(tree) => Some(tree),
        })
    }

    /// Concatenation of the text fragments under `name`.
    #[must_use]
    pub fn text(self, name: &str) -> String {
        self.fragments(name).collect()
    }
}

/// Structural equality: same names, same texts, and equal nested groups.
/// Keys are not compared, so views into different arenas can be equal.
impl PartialEq for Tree<'_> {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = alloc::vec![(*self, *other)];
        while let Some((left, right)) = pending.pop() {
            let (a, b) = (left.group(), right.group());
            if a.len() != b.len() {
                return false;
            }
            for ((name_a, list_a), (name_b, list_b)) in a.iter().zip(b) {
                if name_a != name_b || list_a.len() != list_b.len() {
                    return false;
                }
                for (x, y) in list_a.iter().zip(list_b) {
                    match (left.resolve(x), right.resolve(y)) {
                        (TreeItem::Text(x), TreeItem::Text(y)) if x == y => {}
                        (TreeItem::Group(x), TreeItem::Group(y)) => pending.push((x, y)),
                        _ => return false,
                    }
                }
            }
        }
        true
    }
}

impl Eq for Tree<'_> {}

impl fmt::Debug for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("key", &self.key)
            .field("entries", self.group())
            .finish()
    }
}
