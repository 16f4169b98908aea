//! The periodic monitor loop.
//!
//! A [`Monitor`] owns the topology and the snapshot history. Each tick it
//! snapshots every member slot concurrently, diffs each result against the
//! slot's previous snapshot, and emits what changed through its
//! [`EventSink`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use clusterwatch::engine::Monitor;
//! use clusterwatch_adapters::memory::InMemoryCluster;
//! use tokio::sync::mpsc;
//!
//! # tokio_test::block_on(async {
//! let cluster = InMemoryCluster::replica_set(&["db1:27017"]);
//! cluster.set_count("shop", "orders", 1);
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let mut monitor = Monitor::builder()
//!     .client(Arc::new(cluster.clone()))
//!     .interval(Duration::from_secs(5))
//!     .sink(tx)
//!     .connect()
//!     .await
//!     .unwrap();
//!
//! monitor.tick().await; // baseline
//! cluster.set_count("shop", "orders", 3);
//! let report = monitor.tick().await;
//! assert_eq!(report.changed.len(), 1);
//! # });
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use clusterwatch_adapters::{AdapterError, ClusterClient};
use clusterwatch_types::{ChangeEvent, MemberSlot, Snapshot};
use futures_util::future::join_all;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{diff, discover, AggregateReporter, CollectionFilter, SnapshotEngine, SnapshotHistory, Topology};
use crate::error::MonitorError;
use crate::events::{EventSink, MonitorEvent, NullSink};

/// Default time between ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Slots that emitted a non-empty change event.
    pub changed: Vec<MemberSlot>,
    /// Slots whose snapshot failed.
    pub failed: Vec<MemberSlot>,
    /// Whether aggregate statistics were gathered.
    pub stats_available: bool,
}

/// Builder for [`Monitor`].
pub struct MonitorBuilder {
    client: Option<Arc<dyn ClusterClient>>,
    interval: Duration,
    filter: CollectionFilter,
    per_member_targeting: bool,
    sink: Arc<dyn EventSink>,
}

impl Default for MonitorBuilder {
    fn default() -> Self {
        Self {
            client: None,
            interval: DEFAULT_POLL_INTERVAL,
            filter: CollectionFilter::default(),
            per_member_targeting: false,
            sink: Arc::new(NullSink),
        }
    }
}

impl MonitorBuilder {
    /// Set the cluster client used for discovery, statistics and (without
    /// per-member targeting) every slot's snapshot.
    pub fn client(mut self, client: Arc<dyn ClusterClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the time between ticks when started with [`Monitor::start`].
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn filter(mut self, filter: CollectionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Snapshot each slot through a direct connection to its own member.
    pub fn per_member_targeting(mut self, enabled: bool) -> Self {
        self.per_member_targeting = enabled;
        self
    }

    /// Set where events are delivered.
    pub fn sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Discover the topology and build the monitor.
    ///
    /// On discovery failure a `TopologyFailed` event is emitted and no
    /// monitor is created.
    pub async fn connect(self) -> Result<Monitor, MonitorError> {
        let client = self
            .client
            .ok_or_else(|| MonitorError::Config("no cluster client configured".to_string()))?;
        if self.interval.is_zero() {
            return Err(MonitorError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let topology = match discover(client.as_ref()).await {
            Ok(topology) => topology,
            Err(err) => {
                if let MonitorError::TopologyUnavailable(cause) = &err {
                    self.sink.emit(MonitorEvent::TopologyFailed(cause.clone()));
                }
                return Err(err);
            }
        };

        self.sink.emit(MonitorEvent::TopologyDiscovered {
            members: topology.members().to_vec(),
        });
        info!(
            endpoint = client.description(),
            members = topology.len(),
            "Monitor connected"
        );

        Ok(Monitor {
            history: SnapshotHistory::new(topology.len()),
            targets: vec![None; topology.len()],
            topology,
            client,
            interval: self.interval,
            engine: SnapshotEngine::new(self.filter.clone()),
            reporter: AggregateReporter::new(self.filter),
            per_member_targeting: self.per_member_targeting,
            sink: self.sink,
        })
    }
}

/// Polls a replica set and reports document-count changes per member slot.
pub struct Monitor {
    client: Arc<dyn ClusterClient>,
    interval: Duration,
    engine: SnapshotEngine,
    reporter: AggregateReporter,
    per_member_targeting: bool,
    sink: Arc<dyn EventSink>,
    topology: Topology,
    /// Direct member connections, opened lazily when targeting is enabled.
    targets: Vec<Option<Arc<dyn ClusterClient>>>,
    history: SnapshotHistory,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("endpoint", &self.client.description())
            .field("interval", &self.interval)
            .field("per_member_targeting", &self.per_member_targeting)
            .field("topology", &self.topology)
            .finish_non_exhaustive()
    }
}

impl Monitor {
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::default()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one polling cycle.
    ///
    /// All slot snapshots and the aggregate report run concurrently. Results
    /// are applied in slot order once every capture has finished, and stats
    /// events follow the slot events.
    pub async fn tick(&mut self) -> TickReport {
        let started = Instant::now();
        let targets = self.resolve_targets().await;

        let engine = &self.engine;
        let captures = join_all(self.topology.slots().zip(targets).map(|(slot, target)| async move {
            let client = target.map_err(|cause| MonitorError::SnapshotFailed { slot, cause })?;
            engine.capture(client.as_ref(), slot).await
        }));
        let stats = self.reporter.report(self.client.as_ref(), self.topology.len());

        let (results, stats) = tokio::join!(captures, stats);

        let mut report = TickReport::default();
        let slots: Vec<MemberSlot> = self.topology.slots().collect();
        for (slot, result) in slots.into_iter().zip(results) {
            match result {
                Ok(snapshot) => {
                    if self.apply_snapshot(slot, snapshot) {
                        report.changed.push(slot);
                    }
                }
                Err(err) => {
                    warn!(slot = %slot, error = %err, "Snapshot failed, keeping previous baseline");
                    report.failed.push(slot);
                    self.sink.emit(MonitorEvent::SnapshotFailed {
                        slot,
                        cause: into_cause(err),
                    });
                }
            }
        }

        match stats {
            Ok(stats) => {
                report.stats_available = true;
                self.sink.emit(MonitorEvent::StatsUpdated(stats));
            }
            Err(err) => {
                warn!(error = %err, "Cluster stats unavailable");
                self.sink.emit(MonitorEvent::StatsFailed(into_cause(err)));
            }
        }

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            changed = report.changed.len(),
            failed = report.failed.len(),
            "Tick complete"
        );
        report
    }

    /// Discover the topology again.
    ///
    /// On success every slot loses its baseline, so the next tick emits no
    /// changes. On failure the previous topology and history are kept.
    pub async fn rediscover(&mut self) -> Result<(), MonitorError> {
        match discover(self.client.as_ref()).await {
            Ok(topology) => {
                info!(members = topology.len(), "Topology rediscovered, history reset");
                self.history.reset(topology.len());
                self.targets = vec![None; topology.len()];
                self.sink.emit(MonitorEvent::TopologyDiscovered {
                    members: topology.members().to_vec(),
                });
                self.topology = topology;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Topology rediscovery failed, keeping previous topology");
                if let MonitorError::TopologyUnavailable(cause) = &err {
                    self.sink.emit(MonitorEvent::TopologyFailed(cause.clone()));
                }
                Err(err)
            }
        }
    }

    /// Run the monitor on the tokio runtime until stopped.
    ///
    /// The first tick fires immediately. Missed ticks are delayed rather than
    /// bunched up.
    pub fn start(mut self) -> MonitorHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    Some(command) = command_rx.recv() => match command {
                        Command::Rediscover => {
                            let _ = self.rediscover().await;
                        }
                    },
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                }
            }

            debug!("Monitor stopped");
            self
        });

        MonitorHandle {
            stop_tx,
            command_tx,
            task,
        }
    }

    /// Diff a fresh snapshot against the slot's baseline and store it.
    /// Returns whether a change event was emitted.
    fn apply_snapshot(&mut self, slot: MemberSlot, snapshot: Snapshot) -> bool {
        let event = diff(self.history.get(slot), &snapshot);
        self.history.replace(slot, snapshot);

        if event.is_empty() {
            return false;
        }
        log_change(slot, &event);
        self.sink.emit(MonitorEvent::Change { slot, event });
        true
    }

    /// The client each slot is snapshotted through.
    async fn resolve_targets(&mut self) -> Vec<Result<Arc<dyn ClusterClient>, AdapterError>> {
        if !self.per_member_targeting {
            return self.topology.slots().map(|_| Ok(Arc::clone(&self.client))).collect();
        }

        let mut resolved = Vec::with_capacity(self.topology.len());
        for (index, member) in self.topology.members().iter().enumerate() {
            if let Some(Some(target)) = self.targets.get(index) {
                resolved.push(Ok(Arc::clone(target)));
                continue;
            }
            match self.client.connect_member(member).await {
                Ok(target) => {
                    debug!(member = %member.name, "Opened direct member connection");
                    self.targets[index] = Some(Arc::clone(&target));
                    resolved.push(Ok(target));
                }
                Err(err) => resolved.push(Err(err)),
            }
        }
        resolved
    }
}

/// Handle to a monitor running on the tokio runtime.
///
/// Dropping the handle also stops the monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    stop_tx: watch::Sender<bool>,
    command_tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<Monitor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Rediscover,
}

impl MonitorHandle {
    /// Stop after the tick in progress, if any, completes.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Queue a topology rediscovery.
    pub fn rediscover(&self) {
        let _ = self.command_tx.send(Command::Rediscover);
    }

    /// Whether the monitor task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the monitor task to exit, returning the monitor.
    pub async fn join(self) -> Result<Monitor, tokio::task::JoinError> {
        self.task.await
    }
}

fn into_cause(err: MonitorError) -> AdapterError {
    match err {
        MonitorError::TopologyUnavailable(cause)
        | MonitorError::SnapshotFailed { cause, .. }
        | MonitorError::StatsUnavailable(cause) => cause,
        MonitorError::Config(message) => AdapterError::Command(message),
    }
}

fn log_change(slot: MemberSlot, event: &ChangeEvent) {
    info!(slot = %slot, "Changes detected on {}", slot.label());
    for (key, delta) in &event.grown {
        info!(
            slot = %slot,
            "{}: added {} documents ({}, {})",
            key,
            delta.magnitude(),
            delta.previous,
            delta.current
        );
    }
    for (key, delta) in &event.shrunk_or_removed {
        info!(
            slot = %slot,
            "{}: removed {} documents ({}, {})",
            key,
            delta.magnitude(),
            delta.previous,
            delta.current
        );
    }
}
