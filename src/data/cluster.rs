//! Display state built from monitor events.

use std::time::{Duration, Instant};

use clusterwatch_types::{ChangeEvent, ClusterStats, MemberSlot, ReplicaMember};

use super::Trend;
use crate::events::MonitorEvent;

/// How long a slot stays highlighted after a change.
pub const FLASH_DURATION: Duration = Duration::from_secs(3);

/// What a slot row should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlotStatus {
    /// No change observed recently.
    Quiet,
    /// Changed within the flash window.
    Changed,
    /// The last snapshot attempt failed.
    Failed,
}

impl SlotStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            SlotStatus::Quiet => "○ QUIET",
            SlotStatus::Changed => "● CHANGED",
            SlotStatus::Failed => "✗ FAILED",
        }
    }
}

/// Per-slot display state.
#[derive(Debug, Clone)]
pub struct SlotState {
    pub slot: MemberSlot,
    pub member: Option<ReplicaMember>,
    pub last_change: Option<ChangeEvent>,
    pub changed_at: Option<Instant>,
    pub last_failure: Option<String>,
    /// Documents added minus documents removed since discovery.
    pub net_change: i64,
    pub changes_seen: u64,
    /// `net_change` sampled at every tick.
    pub trend: Trend,
    failed_this_tick: bool,
}

impl SlotState {
    fn new(slot: MemberSlot, member: Option<ReplicaMember>) -> Self {
        Self {
            slot,
            member,
            last_change: None,
            changed_at: None,
            last_failure: None,
            net_change: 0,
            changes_seen: 0,
            trend: Trend::new(),
            failed_this_tick: false,
        }
    }

    pub fn is_flashing(&self, now: Instant) -> bool {
        self.changed_at
            .is_some_and(|at| now.saturating_duration_since(at) < FLASH_DURATION)
    }

    pub fn status(&self, now: Instant) -> SlotStatus {
        if self.last_failure.is_some() {
            SlotStatus::Failed
        } else if self.is_flashing(now) {
            SlotStatus::Changed
        } else {
            SlotStatus::Quiet
        }
    }
}

/// Latest aggregate statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StatsState {
    #[default]
    Pending,
    Available(ClusterStats),
    /// The last attempt failed; stale numbers are not kept.
    Unavailable(String),
}

/// Everything the members view needs, kept up to date from events.
#[derive(Debug, Clone, Default)]
pub struct ClusterView {
    pub slots: Vec<SlotState>,
    pub stats: StatsState,
    /// Cluster-wide document total, sampled on every stats update.
    pub totals: Trend,
    pub last_tick: Option<Instant>,
    pub topology_error: Option<String>,
}

impl ClusterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &MonitorEvent, now: Instant) {
        match event {
            MonitorEvent::TopologyDiscovered { members } => {
                self.slots = MemberSlot::range(members.len())
                    .zip(members)
                    .map(|(slot, member)| SlotState::new(slot, Some(member.clone())))
                    .collect();
                self.topology_error = None;
            }
            MonitorEvent::TopologyFailed(cause) => {
                self.topology_error = Some(cause.to_string());
            }
            MonitorEvent::Change { slot, event } => {
                let state = self.slot_mut(*slot);
                let added = i64::try_from(event.documents_added()).unwrap_or(i64::MAX);
                let removed = i64::try_from(event.documents_removed()).unwrap_or(i64::MAX);
                state.net_change = state.net_change.saturating_add(added).saturating_sub(removed);
                state.changes_seen += 1;
                state.last_change = Some(event.clone());
                state.changed_at = Some(now);
                state.last_failure = None;
            }
            MonitorEvent::SnapshotFailed { slot, cause } => {
                let state = self.slot_mut(*slot);
                state.last_failure = Some(cause.to_string());
                state.failed_this_tick = true;
            }
            MonitorEvent::StatsUpdated(stats) => {
                let total = i64::try_from(stats.total_documents).unwrap_or(i64::MAX);
                self.totals.record(total, now);
                self.stats = StatsState::Available(stats.clone());
                self.end_tick(now);
            }
            MonitorEvent::StatsFailed(cause) => {
                self.stats = StatsState::Unavailable(cause.to_string());
                self.end_tick(now);
            }
        }
    }

    /// Stats events close every tick, so slots that did not fail in it
    /// have recovered.
    fn end_tick(&mut self, now: Instant) {
        for state in &mut self.slots {
            if !state.failed_this_tick {
                state.last_failure = None;
            }
            state.failed_this_tick = false;
            state.trend.record(state.net_change, now);
        }
        self.last_tick = Some(now);
    }

    fn slot_mut(&mut self, slot: MemberSlot) -> &mut SlotState {
        while self.slots.len() <= slot.index() {
            let next = MemberSlot(self.slots.len());
            self.slots.push(SlotState::new(next, None));
        }
        &mut self.slots[slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterwatch_adapters::AdapterError;
    use clusterwatch_types::Delta;

    fn discovered(n: usize) -> MonitorEvent {
        MonitorEvent::TopologyDiscovered {
            members: (0..n)
                .map(|i| ReplicaMember::new(format!("db{i}:27017"), "SECONDARY"))
                .collect(),
        }
    }

    fn change(slot: usize, previous: u64, current: u64) -> MonitorEvent {
        let mut event = ChangeEvent::empty();
        let key = clusterwatch_types::CollectionKey::new("shop", "orders");
        if current > previous {
            event.grown.insert(key, Delta::new(previous, current));
        } else {
            event.shrunk_or_removed.insert(key, Delta::new(previous, current));
        }
        MonitorEvent::Change {
            slot: MemberSlot(slot),
            event,
        }
    }

    fn stats(total: u64) -> MonitorEvent {
        MonitorEvent::StatsUpdated(ClusterStats {
            total_documents: total,
            storage_size_mb: 1.0,
            database_count: 1,
            member_count: 2,
            timestamp_ms: 0,
        })
    }

    #[test]
    fn test_discovery_builds_slots() {
        let mut view = ClusterView::new();
        view.apply(&discovered(3), Instant::now());
        assert_eq!(view.slots.len(), 3);
        assert_eq!(view.slots[2].slot, MemberSlot(2));
        assert_eq!(view.stats, StatsState::Pending);
    }

    #[test]
    fn test_change_flashes_then_fades() {
        let now = Instant::now();
        let mut view = ClusterView::new();
        view.apply(&discovered(2), now);
        view.apply(&change(1, 5, 8), now);

        let slot = &view.slots[1];
        assert_eq!(slot.net_change, 3);
        assert_eq!(slot.status(now), SlotStatus::Changed);
        assert_eq!(slot.status(now + FLASH_DURATION), SlotStatus::Quiet);
        assert_eq!(view.slots[0].status(now), SlotStatus::Quiet);
    }

    #[test]
    fn test_failure_clears_after_a_clean_tick() {
        let now = Instant::now();
        let mut view = ClusterView::new();
        view.apply(&discovered(2), now);

        view.apply(
            &MonitorEvent::SnapshotFailed {
                slot: MemberSlot(1),
                cause: AdapterError::Timeout,
            },
            now,
        );
        view.apply(&stats(10), now);
        assert_eq!(view.slots[1].status(now), SlotStatus::Failed);

        view.apply(&stats(10), now);
        assert_eq!(view.slots[1].status(now), SlotStatus::Quiet);
    }

    #[test]
    fn test_stats_failure_drops_stale_numbers() {
        let now = Instant::now();
        let mut view = ClusterView::new();
        view.apply(&stats(120), now);
        assert!(matches!(view.stats, StatsState::Available(ref s) if s.total_documents == 120));

        view.apply(&MonitorEvent::StatsFailed(AdapterError::Timeout), now);
        assert!(matches!(view.stats, StatsState::Unavailable(_)));
    }

    #[test]
    fn test_shrink_reduces_net_change() {
        let now = Instant::now();
        let mut view = ClusterView::new();
        view.apply(&change(0, 10, 4), now);
        assert_eq!(view.slots.len(), 1);
        assert_eq!(view.slots[0].net_change, -6);
    }
}
