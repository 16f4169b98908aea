//! Cluster-wide aggregate statistics.

use core::fmt;

use crate::format_clock;

/// Bytes in one megabyte, as used for storage size reporting.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Aggregate figures for the whole cluster at one instant.
///
/// Recomputed from scratch on every tick; nothing is carried over between
/// reports.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterStats {
    /// Documents across every non-internal collection of every database.
    pub total_documents: u64,
    /// Storage size of the representative database, in megabytes.
    pub storage_size_mb: f64,
    /// Number of databases in the cluster.
    pub database_count: usize,
    /// Number of member slots being monitored.
    pub member_count: usize,
    /// Unix timestamp in milliseconds when these figures were gathered.
    pub timestamp_ms: u64,
}

impl ClusterStats {
    /// Convert a raw byte count to megabytes.
    pub fn bytes_to_mb(bytes: f64) -> f64 {
        bytes / BYTES_PER_MB
    }
}

impl fmt::Display for ClusterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cluster Information:")?;
        writeln!(f, "- Nodes: {}", self.member_count)?;
        writeln!(f, "- Total Documents: {}", self.total_documents)?;
        writeln!(f, "- Storage Size: {:.2} MB", self.storage_size_mb)?;
        writeln!(f, "- Databases: {}", self.database_count)?;
        write!(f, "- Last Updated: {} UTC", format_clock(self.timestamp_ms))
    }
}
