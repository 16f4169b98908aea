//! Point-in-time document counts.

use clusterwatch_adapters::{AdapterError, ClusterClient};
use clusterwatch_types::{current_timestamp_ms, CollectionKey, MemberSlot, Snapshot, SnapshotBuilder};
use tracing::{debug, trace};

use super::CollectionFilter;
use crate::error::MonitorError;

/// Captures snapshots of every non-internal collection a client can see.
#[derive(Debug, Clone, Default)]
pub struct SnapshotEngine {
    filter: CollectionFilter,
}

impl SnapshotEngine {
    pub fn new(filter: CollectionFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &CollectionFilter {
        &self.filter
    }

    /// Count every user collection in every database.
    ///
    /// Collections with zero documents are recorded. The first adapter error
    /// aborts the whole capture; a partial snapshot is never returned.
    pub async fn capture(
        &self,
        client: &dyn ClusterClient,
        slot: MemberSlot,
    ) -> Result<Snapshot, MonitorError> {
        self.capture_counts(client)
            .await
            .map_err(|cause| MonitorError::SnapshotFailed { slot, cause })
            .inspect(|snapshot| {
                debug!(
                    slot = %slot,
                    collections = snapshot.len(),
                    documents = snapshot.total_documents(),
                    "Captured snapshot"
                )
            })
    }

    /// Count the user collections of a single database, in name order.
    pub async fn browse(
        &self,
        client: &dyn ClusterClient,
        database: &str,
    ) -> Result<Vec<(String, u64)>, AdapterError> {
        let mut counts = Vec::new();
        for collection in self.user_collections(client, database).await? {
            let count = client.count_documents(database, &collection).await?;
            counts.push((collection, count));
        }
        counts.sort();
        Ok(counts)
    }

    async fn capture_counts(&self, client: &dyn ClusterClient) -> Result<Snapshot, AdapterError> {
        let mut builder = SnapshotBuilder::new().timestamp_ms(current_timestamp_ms());

        for database in client.list_database_names().await? {
            for collection in self.user_collections(client, &database).await? {
                let count = client.count_documents(&database, &collection).await?;
                trace!(database = %database, collection = %collection, count, "Counted");
                builder.insert(CollectionKey::new(database.as_str(), collection), count);
            }
        }

        Ok(builder.build())
    }

    async fn user_collections(
        &self,
        client: &dyn ClusterClient,
        database: &str,
    ) -> Result<Vec<String>, AdapterError> {
        let names = client.list_collection_names(database).await?;
        Ok(self.filter.user_collections(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterwatch_adapters::memory::InMemoryCluster;

    fn cluster() -> InMemoryCluster {
        let cluster = InMemoryCluster::replica_set(&["a:27017"]);
        cluster.set_count("shop", "orders", 10);
        cluster.set_count("shop", "users", 0);
        cluster.set_count("shop", "system.views", 3);
        cluster.set_count("local", "oplog.rs", 900);
        cluster.set_count("local", "startup_log", 1);
        cluster
    }

    #[tokio::test]
    async fn test_capture_skips_internal_collections() {
        let engine = SnapshotEngine::default();
        let snapshot = engine.capture(&cluster(), MemberSlot(0)).await.unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.count(&CollectionKey::new("shop", "orders")), Some(10));
        assert_eq!(snapshot.count(&CollectionKey::new("shop", "users")), Some(0));
        assert_eq!(snapshot.count(&CollectionKey::new("local", "startup_log")), Some(1));
        assert!(!snapshot.contains(&CollectionKey::new("shop", "system.views")));
        assert!(!snapshot.contains(&CollectionKey::new("local", "oplog.rs")));
    }

    #[tokio::test]
    async fn test_capture_of_empty_cluster_is_empty() {
        let engine = SnapshotEngine::default();
        let snapshot = engine
            .capture(&InMemoryCluster::new(), MemberSlot(0))
            .await
            .unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_capture_failure_names_the_slot() {
        let cluster = cluster();
        cluster.set_unavailable(true);

        let err = SnapshotEngine::default()
            .capture(&cluster, MemberSlot(2))
            .await
            .unwrap_err();

        match err {
            MonitorError::SnapshotFailed { slot, cause } => {
                assert_eq!(slot, MemberSlot(2));
                assert!(matches!(cause, AdapterError::Connection(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_browse_lists_one_database() {
        let counts = SnapshotEngine::default()
            .browse(&cluster(), "shop")
            .await
            .unwrap();
        assert_eq!(
            counts,
            vec![("orders".to_string(), 10), ("users".to_string(), 0)]
        );
    }
}
