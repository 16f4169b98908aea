//! Replica set topology discovery.

use clusterwatch_adapters::{AdapterError, ClusterClient};
use clusterwatch_types::{MemberSlot, ReplicaMember};
use tracing::{debug, info};

use crate::error::MonitorError;

/// The members reported by the replication status, in reported order.
///
/// Member `i` owns slot `i`. The slot count is fixed until the next
/// discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    members: Vec<ReplicaMember>,
}

impl Topology {
    pub fn new(members: Vec<ReplicaMember>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[ReplicaMember] {
        &self.members
    }

    pub fn member(&self, slot: MemberSlot) -> Option<&ReplicaMember> {
        self.members.get(slot.index())
    }

    /// Number of member slots.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = MemberSlot> {
        MemberSlot::range(self.members.len())
    }

    /// The primary's slot, if a primary is currently elected.
    pub fn primary(&self) -> Option<MemberSlot> {
        self.members
            .iter()
            .position(ReplicaMember::is_primary)
            .map(MemberSlot)
    }
}

/// Run the replication status command and record one slot per member.
///
/// An error or an empty member list is `TopologyUnavailable`: a monitor with
/// no slots would never observe anything.
pub async fn discover(client: &dyn ClusterClient) -> Result<Topology, MonitorError> {
    debug!(endpoint = client.description(), "Discovering replica set topology");

    let members = client
        .replica_set_members()
        .await
        .map_err(MonitorError::TopologyUnavailable)?;

    if members.is_empty() {
        return Err(MonitorError::TopologyUnavailable(AdapterError::Unsupported(
            "replica set reported no members".to_string(),
        )));
    }

    for (slot, member) in MemberSlot::range(members.len()).zip(&members) {
        info!(slot = %slot, name = %member.name, state = %member.state, "Replica set member");
    }

    Ok(Topology::new(members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterwatch_adapters::memory::InMemoryCluster;

    #[tokio::test]
    async fn test_discover_three_members() {
        let cluster = InMemoryCluster::replica_set(&["a:27017", "b:27017", "c:27017"]);

        let topology = discover(&cluster).await.unwrap();
        assert_eq!(topology.len(), 3);
        assert_eq!(topology.primary(), Some(MemberSlot(0)));
        assert_eq!(
            topology.member(MemberSlot(2)).map(|m| m.name.as_str()),
            Some("c:27017")
        );
        assert_eq!(topology.slots().count(), 3);
    }

    #[tokio::test]
    async fn test_discover_fails_without_replication() {
        let cluster = InMemoryCluster::replica_set(&["a:27017"]);
        cluster.set_topology_unavailable(true);

        let err = discover(&cluster).await.unwrap_err();
        assert!(matches!(
            err,
            MonitorError::TopologyUnavailable(AdapterError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_discover_fails_on_empty_member_list() {
        let cluster = InMemoryCluster::new();

        let err = discover(&cluster).await.unwrap_err();
        assert!(matches!(err, MonitorError::TopologyUnavailable(_)));
    }

    #[tokio::test]
    async fn test_discover_fails_when_unreachable() {
        let cluster = InMemoryCluster::replica_set(&["a:27017"]);
        cluster.set_unavailable(true);

        let err = discover(&cluster).await.unwrap_err();
        assert!(matches!(
            err,
            MonitorError::TopologyUnavailable(AdapterError::Connection(_))
        ));
    }
}
