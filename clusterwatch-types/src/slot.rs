//! Member slots - logical positions of tracked replica set members.

use core::fmt;

/// Index of a logical cluster member being monitored (0..N-1).
///
/// Slots are created when the cluster topology is discovered and stay fixed
/// until the topology is discovered again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MemberSlot(pub usize);

impl MemberSlot {
    /// The zero-based index of this slot.
    pub fn index(self) -> usize {
        self.0
    }

    /// Human-facing label, numbered from 1 (e.g. "Node 1").
    pub fn label(self) -> String {
        format!("Node {}", self.0 + 1)
    }

    /// All slots for a topology with `count` members, in ascending order.
    pub fn range(count: usize) -> impl Iterator<Item = MemberSlot> {
        (0..count).map(MemberSlot)
    }
}

impl From<usize> for MemberSlot {
    fn from(index: usize) -> Self {
        MemberSlot(index)
    }
}

impl fmt::Display for MemberSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_one_based() {
        assert_eq!(MemberSlot(0).label(), "Node 1");
        assert_eq!(MemberSlot(2).label(), "Node 3");
    }

    #[test]
    fn test_range_is_ascending() {
        let slots: Vec<_> = MemberSlot::range(3).collect();
        assert_eq!(slots, vec![MemberSlot(0), MemberSlot(1), MemberSlot(2)]);
    }
}
