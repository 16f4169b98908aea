//! Events emitted by the monitor.
//!
//! The monitor never renders anything itself. Everything it observes leaves
//! through an [`EventSink`], and consumers (the terminal UI, the headless
//! logger, tests) decide what to do with it.

use clusterwatch_adapters::AdapterError;
use clusterwatch_types::{ChangeEvent, ClusterStats, MemberSlot, ReplicaMember};
use tokio::sync::mpsc;

/// Something the monitor observed during a tick or a topology discovery.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// A slot's document counts moved since its previous snapshot.
    Change { slot: MemberSlot, event: ChangeEvent },

    /// Fresh aggregate statistics.
    StatsUpdated(ClusterStats),

    /// A slot could not be snapshotted; its history is unchanged.
    SnapshotFailed { slot: MemberSlot, cause: AdapterError },

    /// Aggregate statistics could not be gathered. Consumers should drop any
    /// stats they are showing rather than keep stale ones.
    StatsFailed(AdapterError),

    /// Topology discovery failed.
    TopologyFailed(AdapterError),

    /// Topology discovery succeeded. Slots are numbered in member order.
    TopologyDiscovered { members: Vec<ReplicaMember> },
}

impl MonitorEvent {
    /// The slot this event concerns, if it is slot-specific.
    pub fn slot(&self) -> Option<MemberSlot> {
        match self {
            MonitorEvent::Change { slot, .. } | MonitorEvent::SnapshotFailed { slot, .. } => {
                Some(*slot)
            }
            _ => None,
        }
    }

    /// Short name of the event kind, used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorEvent::Change { .. } => "change",
            MonitorEvent::StatsUpdated(_) => "stats_updated",
            MonitorEvent::SnapshotFailed { .. } => "snapshot_failed",
            MonitorEvent::StatsFailed(_) => "stats_failed",
            MonitorEvent::TopologyFailed(_) => "topology_failed",
            MonitorEvent::TopologyDiscovered { .. } => "topology_discovered",
        }
    }
}

/// Destination for monitor events.
///
/// `emit` is called from the monitor task and must not block it.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: MonitorEvent);
}

impl EventSink for mpsc::UnboundedSender<MonitorEvent> {
    fn emit(&self, event: MonitorEvent) {
        // A dropped receiver means nobody is listening any more
        let _ = self.send(event);
    }
}

impl<F> EventSink for F
where
    F: Fn(MonitorEvent) + Send + Sync,
{
    fn emit(&self, event: MonitorEvent) {
        self(event)
    }
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: MonitorEvent) {}
}
