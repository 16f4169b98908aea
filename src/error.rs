//! Error types for the monitor.
//!
//! Every kind except [`MonitorError::TopologyUnavailable`] is recoverable: the
//! monitor reports it and carries on with the next tick.

use clusterwatch_adapters::AdapterError;
use clusterwatch_types::MemberSlot;
use thiserror::Error;

/// Errors produced by the monitor engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// The replication status could not be read, so no member slots exist.
    ///
    /// Fatal to startup: the monitor must not run without a topology.
    #[error("Cluster topology unavailable: {0}")]
    TopologyUnavailable(#[source] AdapterError),

    /// A snapshot for one slot failed during a tick. History is left as it was.
    #[error("Snapshot failed for {slot}: {cause}")]
    SnapshotFailed {
        slot: MemberSlot,
        #[source]
        cause: AdapterError,
    },

    /// Aggregate statistics could not be gathered this tick.
    #[error("Cluster stats unavailable: {0}")]
    StatsUnavailable(#[source] AdapterError),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MonitorError {
    /// The underlying adapter error, if this error came from the cluster.
    pub fn cause(&self) -> Option<&AdapterError> {
        match self {
            MonitorError::TopologyUnavailable(cause)
            | MonitorError::SnapshotFailed { cause, .. }
            | MonitorError::StatsUnavailable(cause) => Some(cause),
            MonitorError::Config(_) => None,
        }
    }
}

impl From<config::ConfigError> for MonitorError {
    fn from(err: config::ConfigError) -> Self {
        MonitorError::Config(err.to_string())
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, MonitorError>;
