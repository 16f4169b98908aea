//! Monitor behaviour against an in-memory replica set.

use std::sync::Arc;
use std::time::Duration;

use clusterwatch::engine::AggregateReporter;
use clusterwatch::{CollectionFilter, Monitor, MonitorError, MonitorEvent, SnapshotEngine};
use clusterwatch_adapters::memory::InMemoryCluster;
use clusterwatch_adapters::AdapterError;
use clusterwatch_types::{ChangeEvent, CollectionKey, Delta, MemberSlot, ReplicaMember};
use tokio::sync::mpsc;

const MEMBERS: [&str; 3] = ["db1:27017", "db2:27017", "db3:27017"];

async fn connect(
    cluster: &InMemoryCluster,
    per_member: bool,
) -> (Monitor, mpsc::UnboundedReceiver<MonitorEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let monitor = Monitor::builder()
        .client(Arc::new(cluster.clone()))
        .interval(Duration::from_millis(100))
        .per_member_targeting(per_member)
        .sink(tx)
        .connect()
        .await
        .expect("topology should be discoverable");
    (monitor, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn changes_for(events: &[MonitorEvent], slot: MemberSlot) -> Vec<&ChangeEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            MonitorEvent::Change { slot: s, event } if *s == slot => Some(event),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_orders_and_users_scenario() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS);
    cluster.set_count("db", "orders", 10);
    let (mut monitor, mut rx) = connect(&cluster, false).await;
    drain(&mut rx);

    // Tick 1: baseline only
    let report = monitor.tick().await;
    assert!(report.changed.is_empty());
    assert!(changes_for(&drain(&mut rx), MemberSlot(0)).is_empty());
    assert_eq!(
        monitor
            .history()
            .get(MemberSlot(0))
            .and_then(|s| s.count(&CollectionKey::new("db", "orders"))),
        Some(10)
    );

    // Tick 2
    cluster.set_count("db", "orders", 15);
    cluster.set_count("db", "users", 2);
    monitor.tick().await;

    let events = drain(&mut rx);
    let changes = changes_for(&events, MemberSlot(0));
    assert_eq!(changes.len(), 1);
    let change = changes[0];
    assert_eq!(change.grown.len(), 2);
    assert_eq!(change.grown[&CollectionKey::new("db", "orders")], Delta::new(10, 15));
    assert_eq!(change.grown[&CollectionKey::new("db", "users")], Delta::new(0, 2));
    assert!(change.shrunk_or_removed.is_empty());
}

#[tokio::test]
async fn test_failed_snapshot_leaves_history_untouched() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS);
    for name in MEMBERS {
        let node = cluster.node(name).unwrap();
        node.set_count("db", "orders", 10);
    }
    let (mut monitor, mut rx) = connect(&cluster, true).await;

    monitor.tick().await; // tick 1
    cluster.node(MEMBERS[1]).unwrap().set_count("db", "orders", 12);
    monitor.tick().await; // tick 2
    let after_tick_two = monitor.history().get(MemberSlot(1)).cloned();
    assert!(after_tick_two.is_some());
    drain(&mut rx);

    let node = cluster.node(MEMBERS[1]).unwrap();
    node.set_count("db", "orders", 99);
    node.set_unavailable(true);
    let report = monitor.tick().await; // tick 3

    assert_eq!(report.failed, vec![MemberSlot(1)]);
    assert_eq!(monitor.history().get(MemberSlot(1)).cloned(), after_tick_two);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        MonitorEvent::SnapshotFailed { slot: MemberSlot(1), cause: AdapterError::Connection(_) }
    )));
    assert!(changes_for(&events, MemberSlot(1)).is_empty());

    // Recovery diffs against the tick 2 baseline
    node.set_unavailable(false);
    monitor.tick().await;
    let events = drain(&mut rx);
    let changes = changes_for(&events, MemberSlot(1));
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0].grown[&CollectionKey::new("db", "orders")],
        Delta::new(12, 99)
    );
}

#[tokio::test]
async fn test_per_member_targeting_routes_each_slot() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS);
    let (mut monitor, mut rx) = connect(&cluster, true).await;
    monitor.tick().await;
    drain(&mut rx);

    cluster.node(MEMBERS[2]).unwrap().set_count("db", "orders", 4);
    let report = monitor.tick().await;

    assert_eq!(report.changed, vec![MemberSlot(2)]);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn test_unknown_member_fails_only_its_slot() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS[..1]);
    cluster.set_members(vec![
        ReplicaMember::new(MEMBERS[0], "PRIMARY"),
        ReplicaMember::new("ghost:27017", "SECONDARY"),
    ]);

    let (mut monitor, _rx) = connect(&cluster, true).await;
    let report = monitor.tick().await;
    assert_eq!(report.failed, vec![MemberSlot(1)]);
    assert_eq!(monitor.history().observed(), 1);
}

#[tokio::test]
async fn test_internal_collections_never_appear() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS[..1]);
    cluster.set_count("db", "system.views", 1_000);
    cluster.set_count("local", "oplog.rs", 50_000);
    cluster.set_count("db", "orders", 1);
    let (mut monitor, mut rx) = connect(&cluster, false).await;
    monitor.tick().await;

    cluster.set_count("db", "system.views", 2_000);
    cluster.set_count("local", "oplog.rs", 60_000);
    let report = monitor.tick().await;
    assert!(report.changed.is_empty());

    let snapshot = monitor.history().get(MemberSlot(0)).unwrap();
    assert!(snapshot
        .iter()
        .all(|(key, _)| !key.collection.starts_with("system.") && key.collection != "oplog.rs"));

    // And the aggregate ignores them too
    let stats = drain(&mut rx)
        .into_iter()
        .find_map(|e| match e {
            MonitorEvent::StatsUpdated(stats) => Some(stats),
            _ => None,
        })
        .unwrap();
    assert_eq!(stats.total_documents, 1);
}

#[tokio::test]
async fn test_custom_filter() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS[..1]);
    cluster.set_count("db", "tmp_import", 5);
    cluster.set_count("db", "orders", 1);

    let filter = CollectionFilter::new(vec!["tmp_".to_string()], vec![]);
    let snapshot = SnapshotEngine::new(filter)
        .capture(&cluster, MemberSlot(0))
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn test_aggregate_totals_across_databases() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS);
    cluster.set_count("inventory", "items", 70);
    cluster.set_count("inventory", "suppliers", 30);
    cluster.set_count("shop", "orders", 20);
    cluster.set_storage_size("inventory", 5.0 * 1024.0 * 1024.0);

    let stats = AggregateReporter::default()
        .report(&cluster, MEMBERS.len())
        .await
        .unwrap();
    assert_eq!(stats.total_documents, 120);
    assert_eq!(stats.database_count, 2);
    assert_eq!(stats.member_count, 3);
    assert!((stats.storage_size_mb - 5.0).abs() < 1e-9);
    assert!(stats.to_string().contains("- Total Documents: 120"));
}

#[tokio::test]
async fn test_stats_failure_emits_stats_failed() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS[..1]);
    cluster.set_count("db", "orders", 1);
    let (mut monitor, mut rx) = connect(&cluster, false).await;
    drain(&mut rx);

    cluster.set_stats_unavailable(true);
    let report = monitor.tick().await;
    assert!(!report.stats_available);
    assert!(report.failed.is_empty());

    let events = drain(&mut rx);
    assert!(matches!(events.last(), Some(MonitorEvent::StatsFailed(_))));
    assert!(!events.iter().any(|e| matches!(e, MonitorEvent::StatsUpdated(_))));
}

#[tokio::test]
async fn test_topology_failure_creates_no_monitor() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS);
    cluster.set_topology_unavailable(true);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let result = Monitor::builder()
        .client(Arc::new(cluster))
        .sink(tx)
        .connect()
        .await;

    assert!(matches!(result, Err(MonitorError::TopologyUnavailable(_))));
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], MonitorEvent::TopologyFailed(_)));
}

#[tokio::test]
async fn test_rediscover_resets_history() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS[..2]);
    cluster.set_count("db", "orders", 1);
    let (mut monitor, mut rx) = connect(&cluster, false).await;
    monitor.tick().await;
    assert_eq!(monitor.history().observed(), 2);

    cluster.set_members(
        MEMBERS
            .iter()
            .map(|m| ReplicaMember::new(*m, "SECONDARY"))
            .collect(),
    );
    monitor.rediscover().await.unwrap();
    assert_eq!(monitor.topology().len(), 3);
    assert_eq!(monitor.history().observed(), 0);

    // No baseline, so changes made meanwhile are not reported
    cluster.set_count("db", "orders", 50);
    drain(&mut rx);
    let report = monitor.tick().await;
    assert!(report.changed.is_empty());
    assert_eq!(monitor.history().observed(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_running_monitor_rediscovers_on_request() {
    let cluster = InMemoryCluster::replica_set(&MEMBERS[..1]);
    let (monitor, mut rx) = connect(&cluster, false).await;
    drain(&mut rx);

    let handle = monitor.start();
    handle.rediscover();

    let mut rediscovered = false;
    while let Some(event) = rx.recv().await {
        if matches!(event, MonitorEvent::TopologyDiscovered { .. }) {
            rediscovered = true;
            break;
        }
    }
    assert!(rediscovered);

    handle.stop();
    let monitor = handle.join().await.unwrap();
    assert_eq!(monitor.topology().len(), 1);
}
