//! Deltas and change events produced by comparing two snapshots.

use std::collections::BTreeMap;

use crate::CollectionKey;

/// The before/after document counts of a collection that changed.
///
/// A collection missing from the earlier snapshot has `previous == 0`; one
/// missing from the later snapshot has `current == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delta {
    pub previous: u64,
    pub current: u64,
}

impl Delta {
    pub fn new(previous: u64, current: u64) -> Self {
        Self { previous, current }
    }

    /// Signed change in document count (positive for growth).
    pub fn change(&self) -> i64 {
        self.current as i64 - self.previous as i64
    }

    /// Number of documents added or removed, regardless of direction.
    pub fn magnitude(&self) -> u64 {
        self.current.abs_diff(self.previous)
    }

    pub fn is_growth(&self) -> bool {
        self.current > self.previous
    }

    /// Whether the collection is gone (or emptied) in the later snapshot.
    pub fn is_removal(&self) -> bool {
        self.current == 0 && self.previous > 0
    }
}

/// The classified changes for one member slot in one tick.
///
/// `grown` and `shrunk_or_removed` never share a key, and every delta in
/// either map has `previous != current`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeEvent {
    /// Collections whose document count went up (including new collections).
    pub grown: BTreeMap<CollectionKey, Delta>,
    /// Collections whose document count went down, or that disappeared (current = 0).
    pub shrunk_or_removed: BTreeMap<CollectionKey, Delta>,
}

impl ChangeEvent {
    /// An event with no changes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.grown.is_empty() && self.shrunk_or_removed.is_empty()
    }

    /// Number of collections that changed in either direction.
    pub fn len(&self) -> usize {
        self.grown.len() + self.shrunk_or_removed.len()
    }

    /// Total documents added across grown collections.
    pub fn documents_added(&self) -> u64 {
        self.grown.values().map(Delta::magnitude).sum()
    }

    /// Total documents removed across shrunk or removed collections.
    pub fn documents_removed(&self) -> u64 {
        self.shrunk_or_removed.values().map(Delta::magnitude).sum()
    }

    /// Iterate over every changed collection, grown first, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CollectionKey, &Delta)> {
        self.grown.iter().chain(self.shrunk_or_removed.iter())
    }
}
