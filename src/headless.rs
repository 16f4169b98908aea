//! Headless output: one JSON object per event on stdout.

use clusterwatch_types::current_timestamp_ms;
use serde_json::{json, Value};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::events::{EventSink, MonitorEvent};

/// Convert an event to its NDJSON record.
pub fn event_record(event: &MonitorEvent, timestamp_ms: u64) -> Value {
    let mut record = json!({
        "kind": event.kind(),
        "timestamp_ms": timestamp_ms,
    });

    let details = match event {
        MonitorEvent::Change { slot, event } => json!({
            "slot": slot,
            "node": slot.label(),
            "grown": event.grown,
            "shrunk_or_removed": event.shrunk_or_removed,
        }),
        MonitorEvent::StatsUpdated(stats) => json!({ "stats": stats }),
        MonitorEvent::SnapshotFailed { slot, cause } => json!({
            "slot": slot,
            "node": slot.label(),
            "error": cause.to_string(),
        }),
        MonitorEvent::StatsFailed(cause) | MonitorEvent::TopologyFailed(cause) => {
            json!({ "error": cause.to_string() })
        }
        MonitorEvent::TopologyDiscovered { members } => json!({ "members": members }),
    };

    if let (Some(record), Value::Object(details)) = (record.as_object_mut(), details) {
        record.extend(details);
    }
    record
}

/// Queues every event as an NDJSON record for a writer task and mirrors
/// failures to the log.
///
/// The monitor never waits on the output: a stalled stdout only backs up the
/// queue.
#[derive(Debug, Clone)]
pub struct NdjsonSink {
    records: mpsc::UnboundedSender<Value>,
}

impl NdjsonSink {
    /// Create a sink that writes to stdout from a task on the current runtime.
    ///
    /// The task ends once every clone of the sink is dropped and the queue is
    /// flushed.
    pub fn spawn() -> (Self, JoinHandle<()>) {
        Self::spawn_with(tokio::io::stdout())
    }

    /// Like [`spawn`](Self::spawn), writing to any async writer.
    pub fn spawn_with<W>(writer: W) -> (Self, JoinHandle<()>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (records, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(write_records(rx, writer));
        (Self { records }, task)
    }
}

async fn write_records<W>(mut rx: mpsc::UnboundedReceiver<Value>, mut writer: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(record) = rx.recv().await {
        let line = format!("{record}\n");
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!(error = %e, "Failed to write event");
            continue;
        }
        if let Err(e) = writer.flush().await {
            warn!(error = %e, "Failed to flush events");
        }
    }
}

impl EventSink for NdjsonSink {
    fn emit(&self, event: MonitorEvent) {
        match &event {
            MonitorEvent::SnapshotFailed { slot, cause } => {
                warn!(slot = %slot, error = %cause, "Snapshot failed")
            }
            MonitorEvent::StatsFailed(cause) => warn!(error = %cause, "Cluster stats unavailable"),
            MonitorEvent::StatsUpdated(stats) => info!("{stats}"),
            _ => {}
        }

        // Fails only if the writer task has died
        let _ = self.records.send(event_record(&event, current_timestamp_ms()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterwatch_adapters::AdapterError;
    use clusterwatch_types::{ChangeEvent, CollectionKey, Delta, MemberSlot};
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_change_record() {
        let mut change = ChangeEvent::empty();
        change
            .grown
            .insert(CollectionKey::new("shop", "orders"), Delta::new(1, 4));

        let record = event_record(
            &MonitorEvent::Change {
                slot: MemberSlot(1),
                event: change,
            },
            42,
        );

        assert_eq!(record["kind"], "change");
        assert_eq!(record["timestamp_ms"], 42);
        assert_eq!(record["slot"], 1);
        assert_eq!(record["node"], "Node 2");
        assert_eq!(record["grown"]["shop.orders"]["previous"], 1);
        assert_eq!(record["grown"]["shop.orders"]["current"], 4);
        assert!(record["shrunk_or_removed"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_failure_record() {
        let record = event_record(&MonitorEvent::StatsFailed(AdapterError::Timeout), 0);
        assert_eq!(record["kind"], "stats_failed");
        assert_eq!(record["error"], "Request timed out");
    }

    #[tokio::test]
    async fn test_sink_writes_one_line_per_event() {
        let (writer, mut reader) = tokio::io::duplex(4096);
        let (sink, task) = NdjsonSink::spawn_with(writer);

        sink.emit(MonitorEvent::StatsFailed(AdapterError::Timeout));
        sink.emit(MonitorEvent::TopologyDiscovered { members: vec![] });
        drop(sink);
        task.await.unwrap();

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();

        let kinds: Vec<String> = output
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap()["kind"].to_string())
            .collect();
        assert_eq!(kinds, vec!["\"stats_failed\"", "\"topology_discovered\""]);
    }

    #[tokio::test]
    async fn test_emit_does_not_wait_for_the_writer() {
        // A one-byte pipe that nobody reads stalls the writer after the first byte
        let (writer, _reader) = tokio::io::duplex(1);
        let (sink, _task) = NdjsonSink::spawn_with(writer);

        for _ in 0..100 {
            sink.emit(MonitorEvent::StatsFailed(AdapterError::Timeout));
        }
    }
}
