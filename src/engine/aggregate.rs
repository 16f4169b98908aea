//! Cluster-wide statistics.

use clusterwatch_adapters::{AdapterError, ClusterClient};
use clusterwatch_types::{current_timestamp_ms, ClusterStats};
use tracing::debug;

use super::CollectionFilter;
use crate::error::MonitorError;

/// Gathers the totals shown in the cluster information panel.
#[derive(Debug, Clone, Default)]
pub struct AggregateReporter {
    filter: CollectionFilter,
}

impl AggregateReporter {
    pub fn new(filter: CollectionFilter) -> Self {
        Self { filter }
    }

    /// Sum documents over every non-internal collection and read the storage
    /// size of the first database.
    ///
    /// A cluster with no databases has no storage to report and yields
    /// [`MonitorError::StatsUnavailable`]. Nothing is cached: every call
    /// queries the cluster afresh.
    pub async fn report(
        &self,
        client: &dyn ClusterClient,
        member_count: usize,
    ) -> Result<ClusterStats, MonitorError> {
        self.collect(client, member_count)
            .await
            .map_err(MonitorError::StatsUnavailable)
    }

    async fn collect(
        &self,
        client: &dyn ClusterClient,
        member_count: usize,
    ) -> Result<ClusterStats, AdapterError> {
        let databases = client.list_database_names().await?;
        let Some(first) = databases.first() else {
            return Err(AdapterError::Command(
                "no databases to report storage for".to_string(),
            ));
        };

        let mut total_documents = 0u64;
        for database in &databases {
            let names = client.list_collection_names(database).await?;
            for collection in self.filter.user_collections(names) {
                total_documents += client.count_documents(database, &collection).await?;
            }
        }

        let storage_size_mb = ClusterStats::bytes_to_mb(client.storage_size_bytes(first).await?);

        debug!(
            databases = databases.len(),
            documents = total_documents,
            storage_mb = storage_size_mb,
            "Collected cluster stats"
        );

        Ok(ClusterStats {
            total_documents,
            storage_size_mb,
            database_count: databases.len(),
            member_count,
            timestamp_ms: current_timestamp_ms(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterwatch_adapters::memory::InMemoryCluster;

    #[tokio::test]
    async fn test_report_totals() {
        let cluster = InMemoryCluster::replica_set(&["a:27017", "b:27017"]);
        cluster.set_count("app", "a", 100);
        cluster.set_count("app", "b", 20);
        cluster.set_count("app", "system.js", 7);
        cluster.set_storage_size("app", 2.0 * 1024.0 * 1024.0);

        let stats = AggregateReporter::default().report(&cluster, 2).await.unwrap();
        assert_eq!(stats.total_documents, 120);
        assert_eq!(stats.database_count, 1);
        assert_eq!(stats.member_count, 2);
        assert!((stats.storage_size_mb - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_report_with_no_databases_is_unavailable() {
        let err = AggregateReporter::default()
            .report(&InMemoryCluster::new(), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MonitorError::StatsUnavailable(AdapterError::Command(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_is_stats_unavailable() {
        let cluster = InMemoryCluster::new();
        cluster.set_count("app", "a", 1);
        cluster.set_stats_unavailable(true);

        let err = AggregateReporter::default()
            .report(&cluster, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MonitorError::StatsUnavailable(AdapterError::Command(_))
        ));
    }
}
