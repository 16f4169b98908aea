//! Most recent snapshot per member slot.

use clusterwatch_types::{MemberSlot, Snapshot};

/// The last successful snapshot of each slot.
///
/// Sized once from the topology. A slot that has never been snapshotted (or
/// whose every attempt failed) holds `None`.
#[derive(Debug, Clone, Default)]
pub struct SnapshotHistory {
    slots: Vec<Option<Snapshot>>,
}

impl SnapshotHistory {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: MemberSlot) -> Option<&Snapshot> {
        self.slots.get(slot.index()).and_then(Option::as_ref)
    }

    /// Store `snapshot` as the slot's latest, returning the one it replaces.
    ///
    /// Slots outside the topology are ignored.
    pub fn replace(&mut self, slot: MemberSlot, snapshot: Snapshot) -> Option<Snapshot> {
        self.slots
            .get_mut(slot.index())
            .and_then(|entry| entry.replace(snapshot))
    }

    /// Forget everything and resize for a new topology.
    pub fn reset(&mut self, slot_count: usize) {
        self.slots = vec![None; slot_count];
    }

    /// Number of slots with a baseline.
    pub fn observed(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
