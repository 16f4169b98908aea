//! In-process cluster adapter.
//!
//! Holds databases, collections and document counts in memory. Useful for
//! tests and demos where a real replica set is not available: counts can be
//! changed between ticks and faults can be injected.
//!
//! ## Example
//!
//! ```rust
//! use clusterwatch_adapters::memory::InMemoryCluster;
//!
//! let cluster = InMemoryCluster::replica_set(&["db1:27017", "db2:27017"]);
//! cluster.set_count("shop", "orders", 10);
//! cluster.set_count("shop", "users", 2);
//!
//! assert_eq!(cluster.total_documents(), 12);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use clusterwatch_types::ReplicaMember;
use parking_lot::RwLock;

use crate::{AdapterError, ClusterClient};

#[derive(Debug, Default)]
struct DatabaseState {
    collections: BTreeMap<String, u64>,
    storage_size_bytes: f64,
}

#[derive(Debug, Default)]
struct ClusterState {
    databases: BTreeMap<String, DatabaseState>,
    members: Vec<ReplicaMember>,
    /// Independent per-member data, keyed by member name.
    nodes: BTreeMap<String, InMemoryCluster>,
    unavailable: bool,
    topology_unavailable: bool,
    stats_unavailable: bool,
}

/// An in-memory cluster.
///
/// Clones share the same state, so a test can keep one handle to mutate
/// counts while the monitor holds another.
#[derive(Debug, Clone)]
pub struct InMemoryCluster {
    state: Arc<RwLock<ClusterState>>,
    description: String,
}

impl Default for InMemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCluster {
    /// Create an empty cluster with no replica set members.
    pub fn new() -> Self {
        Self::named("memory://cluster")
    }

    fn named(description: &str) -> Self {
        Self {
            state: Arc::new(RwLock::new(ClusterState::default())),
            description: description.to_string(),
        }
    }

    /// Create a cluster with one member per name. The first member is primary.
    ///
    /// Each member also gets its own independent node, returned by
    /// [`InMemoryCluster::node`] and by `connect_member`.
    pub fn replica_set(member_names: &[&str]) -> Self {
        let cluster = Self::new();
        {
            let mut state = cluster.state.write();
            for (i, name) in member_names.iter().enumerate() {
                let role = if i == 0 { "PRIMARY" } else { "SECONDARY" };
                state.members.push(ReplicaMember::new(*name, role));
                state
                    .nodes
                    .insert(name.to_string(), Self::named(&format!("memory://{}", name)));
            }
        }
        cluster
    }

    /// The independent node for a member, if the cluster was built with it.
    pub fn node(&self, member_name: &str) -> Option<InMemoryCluster> {
        self.state.read().nodes.get(member_name).cloned()
    }

    /// Set the document count of a collection, creating database and collection as needed.
    pub fn set_count(&self, database: &str, collection: &str, count: u64) {
        let mut state = self.state.write();
        state
            .databases
            .entry(database.to_string())
            .or_default()
            .collections
            .insert(collection.to_string(), count);
    }

    /// Remove a collection. Returns `true` if it existed.
    pub fn drop_collection(&self, database: &str, collection: &str) -> bool {
        let mut state = self.state.write();
        state
            .databases
            .get_mut(database)
            .map(|db| db.collections.remove(collection).is_some())
            .unwrap_or(false)
    }

    /// Remove a database and all its collections. Returns `true` if it existed.
    pub fn drop_database(&self, database: &str) -> bool {
        self.state.write().databases.remove(database).is_some()
    }

    /// Set the storage size reported for a database.
    pub fn set_storage_size(&self, database: &str, bytes: f64) {
        let mut state = self.state.write();
        state
            .databases
            .entry(database.to_string())
            .or_default()
            .storage_size_bytes = bytes;
    }

    /// Replace the replica set member list.
    pub fn set_members(&self, members: Vec<ReplicaMember>) {
        self.state.write().members = members;
    }

    /// Make every I/O call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unavailable = unavailable;
    }

    /// Make the replication status command fail.
    pub fn set_topology_unavailable(&self, unavailable: bool) {
        self.state.write().topology_unavailable = unavailable;
    }

    /// Make the database statistics command fail.
    pub fn set_stats_unavailable(&self, unavailable: bool) {
        self.state.write().stats_unavailable = unavailable;
    }

    /// Total documents across every collection, internal ones included.
    pub fn total_documents(&self) -> u64 {
        self.state
            .read()
            .databases
            .values()
            .flat_map(|db| db.collections.values())
            .sum()
    }

    fn check_available(&self) -> Result<(), AdapterError> {
        if self.state.read().unavailable {
            return Err(AdapterError::Connection(format!(
                "{} is unreachable",
                self.description
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn list_database_names(&self) -> Result<Vec<String>, AdapterError> {
        self.check_available()?;
        Ok(self.state.read().databases.keys().cloned().collect())
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>, AdapterError> {
        self.check_available()?;
        Ok(self
            .state
            .read()
            .databases
            .get(database)
            .map(|db| db.collections.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_documents(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<u64, AdapterError> {
        self.check_available()?;
        Ok(self
            .state
            .read()
            .databases
            .get(database)
            .and_then(|db| db.collections.get(collection).copied())
            .unwrap_or(0))
    }

    async fn replica_set_members(&self) -> Result<Vec<ReplicaMember>, AdapterError> {
        self.check_available()?;
        let state = self.state.read();
        if state.topology_unavailable {
            return Err(AdapterError::Unsupported(
                "not running with --replSet".to_string(),
            ));
        }
        Ok(state.members.clone())
    }

    async fn storage_size_bytes(&self, database: &str) -> Result<f64, AdapterError> {
        self.check_available()?;
        let state = self.state.read();
        if state.stats_unavailable {
            return Err(AdapterError::Command("dbStats failed".to_string()));
        }
        Ok(state
            .databases
            .get(database)
            .map(|db| db.storage_size_bytes)
            .unwrap_or(0.0))
    }

    async fn connect_member(
        &self,
        member: &ReplicaMember,
    ) -> Result<Arc<dyn ClusterClient>, AdapterError> {
        self.check_available()?;
        match self.node(&member.name) {
            Some(node) => Ok(Arc::new(node)),
            None => Err(AdapterError::Connection(format!(
                "unknown member {}",
                member.name
            ))),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}
