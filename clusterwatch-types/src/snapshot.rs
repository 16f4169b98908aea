//! Snapshot - a point-in-time view of document counts on one cluster member.

use std::collections::BTreeMap;

use crate::{current_timestamp_ms, CollectionKey};

/// Document counts per collection for one member at one sampling instant.
///
/// Snapshots are immutable once built: the only way to construct one is the
/// [`SnapshotBuilder`], and no mutable accessors are exposed.
///
/// # Example
///
/// ```rust
/// use clusterwatch_types::Snapshot;
///
/// let snapshot = Snapshot::builder()
///     .collection("shop", "orders", 10)
///     .collection("shop", "carts", 0)
///     .build();
///
/// assert_eq!(snapshot.total_documents(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Unix timestamp in milliseconds when this snapshot was taken.
    timestamp_ms: u64,

    /// Document count for each collection, keyed by qualified name.
    counts: BTreeMap<CollectionKey, u64>,
}

impl Snapshot {
    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// When this snapshot was taken (milliseconds since Unix epoch).
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Check if the snapshot is empty (no collections).
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of collections in the snapshot.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Document count for a collection, if it was present.
    pub fn count(&self, key: &CollectionKey) -> Option<u64> {
        self.counts.get(key).copied()
    }

    /// Whether the collection was present when the snapshot was taken.
    pub fn contains(&self, key: &CollectionKey) -> bool {
        self.counts.contains_key(key)
    }

    /// Iterate over all collections in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CollectionKey, u64)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }

    /// The underlying count mapping.
    pub fn counts(&self) -> &BTreeMap<CollectionKey, u64> {
        &self.counts
    }

    /// Total documents across all collections.
    pub fn total_documents(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct databases that contributed collections.
    pub fn database_count(&self) -> usize {
        let mut last: Option<&str> = None;
        let mut count = 0;
        for key in self.counts.keys() {
            if last != Some(key.database.as_str()) {
                count += 1;
                last = Some(key.database.as_str());
            }
        }
        count
    }
}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    timestamp_ms: Option<u64>,
    counts: BTreeMap<CollectionKey, u64>,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Record the document count for `database.collection`.
    pub fn collection(
        self,
        database: impl Into<String>,
        collection: impl Into<String>,
        count: u64,
    ) -> Self {
        self.key(CollectionKey::new(database, collection), count)
    }

    /// Record the document count for a qualified key.
    ///
    /// Recording the same key twice keeps the last count.
    pub fn key(mut self, key: CollectionKey, count: u64) -> Self {
        self.counts.insert(key, count);
        self
    }

    /// Record a count without consuming the builder.
    pub fn insert(&mut self, key: CollectionKey, count: u64) {
        self.counts.insert(key, count);
    }

    /// Build the snapshot, stamping it with the current time if no timestamp was set.
    pub fn build(self) -> Snapshot {
        Snapshot {
            timestamp_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            counts: self.counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let snapshot = Snapshot::builder()
            .timestamp_ms(1703160000000)
            .collection("shop", "orders", 10)
            .collection("shop", "users", 2)
            .collection("audit", "events", 0)
            .build();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.timestamp_ms(), 1703160000000);
        assert_eq!(snapshot.total_documents(), 12);
        assert_eq!(snapshot.database_count(), 2);
        assert_eq!(snapshot.count(&CollectionKey::new("audit", "events")), Some(0));
        assert!(snapshot.contains(&CollectionKey::new("audit", "events")));
    }

    #[test]
    fn test_missing_collection_has_no_count() {
        let snapshot = Snapshot::builder().collection("shop", "orders", 10).build();
        assert_eq!(snapshot.count(&CollectionKey::new("shop", "users")), None);
    }

    #[test]
    fn test_build_stamps_current_time() {
        let before = current_timestamp_ms();
        let snapshot = Snapshot::builder().build();
        assert!(snapshot.timestamp_ms() >= before);
        assert!(snapshot.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serializes_counts_as_namespace_object() {
        let snapshot = Snapshot::builder()
            .timestamp_ms(1)
            .collection("shop", "orders", 10)
            .build();

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["counts"]["shop.orders"], 10);
    }
}
