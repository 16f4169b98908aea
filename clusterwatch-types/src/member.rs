//! Replica set members as reported by the replication status command.

/// A replica set member.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplicaMember {
    /// Member address, `host:port`.
    pub name: String,
    /// Replication state, e.g. "PRIMARY", "SECONDARY".
    pub state: String,
    /// Whether the member reports itself reachable.
    pub healthy: bool,
}

impl ReplicaMember {
    /// Create a healthy member with the given address and state.
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            healthy: true,
        }
    }

    /// Whether this member is the current primary.
    pub fn is_primary(&self) -> bool {
        self.state == "PRIMARY"
    }
}
