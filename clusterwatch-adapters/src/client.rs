//! The capability surface the monitor needs from a cluster driver.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use clusterwatch_types::ReplicaMember;

use crate::AdapterError;

/// Read-only access to a replicated document-database cluster.
///
/// Every method is an I/O call and may suspend. Implementations must be safe
/// to share between concurrent tasks (`Arc<dyn ClusterClient>`).
#[async_trait]
pub trait ClusterClient: Send + Sync + Debug {
    /// Names of every logical database.
    async fn list_database_names(&self) -> Result<Vec<String>, AdapterError>;

    /// Names of every collection in `database`.
    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>, AdapterError>;

    /// Number of documents in a collection (no filter).
    async fn count_documents(&self, database: &str, collection: &str)
        -> Result<u64, AdapterError>;

    /// The member list from the replication status command.
    async fn replica_set_members(&self) -> Result<Vec<ReplicaMember>, AdapterError>;

    /// Storage size of `database` in bytes, from its statistics command.
    async fn storage_size_bytes(&self, database: &str) -> Result<f64, AdapterError>;

    /// Open a client that talks to a single member directly.
    async fn connect_member(
        &self,
        member: &ReplicaMember,
    ) -> Result<Arc<dyn ClusterClient>, AdapterError>;

    /// Returns a human-readable description of the cluster endpoint.
    fn description(&self) -> &str;
}
