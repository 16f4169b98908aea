//! Monitor engine: discovery, snapshots, diffing and the polling loop.
//!
//! Everything here is independent of how events are presented.

mod aggregate;
mod diff;
mod filter;
mod history;
mod monitor;
mod snapshot;
mod topology;

pub use aggregate::AggregateReporter;
pub use diff::diff;
pub use filter::{CollectionFilter, DEFAULT_INTERNAL_PREFIX, DEFAULT_OPLOG_NAME};
pub use history::SnapshotHistory;
pub use monitor::{Monitor, MonitorBuilder, MonitorHandle, TickReport, DEFAULT_POLL_INTERVAL};
pub use snapshot::SnapshotEngine;
pub use topology::{discover, Topology};
