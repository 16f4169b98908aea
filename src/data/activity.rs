//! Bounded log of what the monitor reported.

use std::collections::VecDeque;

use clusterwatch_types::MemberSlot;

pub use clusterwatch_types::format_clock;

use crate::events::MonitorEvent;

/// Maximum number of entries kept.
pub const MAX_ACTIVITY_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Info,
    Growth,
    Shrink,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub timestamp_ms: u64,
    pub slot: Option<MemberSlot>,
    pub level: ActivityLevel,
    pub message: String,
}

/// Newest-last activity log.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// Append the lines describing `event`. Routine stats updates are not
    /// logged.
    pub fn record(&mut self, event: &MonitorEvent, timestamp_ms: u64) {
        let slot = event.slot();
        let mut push = |level, message: String| {
            self.entries.push_back(ActivityEntry {
                timestamp_ms,
                slot,
                level,
                message,
            });
        };

        match event {
            MonitorEvent::Change { slot, event } => {
                push(
                    ActivityLevel::Info,
                    format!("Changes detected on {}", slot.label()),
                );
                for (key, delta) in &event.grown {
                    push(
                        ActivityLevel::Growth,
                        format!(
                            "{}: added {} documents ({}, {})",
                            key,
                            delta.magnitude(),
                            delta.previous,
                            delta.current
                        ),
                    );
                }
                for (key, delta) in &event.shrunk_or_removed {
                    let verb = if delta.is_removal() { "removed" } else { "shrunk by" };
                    push(
                        ActivityLevel::Shrink,
                        format!(
                            "{}: {} {} documents ({}, {})",
                            key,
                            verb,
                            delta.magnitude(),
                            delta.previous,
                            delta.current
                        ),
                    );
                }
            }
            MonitorEvent::SnapshotFailed { slot, cause } => push(
                ActivityLevel::Error,
                format!("{}: snapshot failed: {}", slot.label(), cause),
            ),
            MonitorEvent::StatsFailed(cause) => push(
                ActivityLevel::Error,
                format!("Cluster stats unavailable: {cause}"),
            ),
            MonitorEvent::TopologyFailed(cause) => push(
                ActivityLevel::Error,
                format!("Topology discovery failed: {cause}"),
            ),
            MonitorEvent::TopologyDiscovered { members } => push(
                ActivityLevel::Info,
                format!("Discovered {} replica set members", members.len()),
            ),
            MonitorEvent::StatsUpdated(_) => {}
        }

        while self.entries.len() > MAX_ACTIVITY_ENTRIES {
            self.entries.pop_front();
        }
    }
}
