//! Channel-based event source.
//!
//! Receives monitor events through an unbounded tokio channel whose sender
//! is handed to the monitor as its sink.

use tokio::sync::mpsc::{self, error::TryRecvError};

use super::EventSource;
use crate::events::MonitorEvent;

/// An event source fed by the monitor task.
///
/// # Example
///
/// ```
/// use clusterwatch::ChannelSource;
///
/// // The sender goes to the monitor, the source to the UI
/// let (tx, source) = ChannelSource::create("mongodb://db1,db2/?replicaSet=rs0");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::UnboundedReceiver<MonitorEvent>,
    description: String,
    disconnected: bool,
}

impl ChannelSource {
    /// Wrap an existing receiver.
    ///
    /// `source_description` names where events come from and is shown in
    /// the status bar.
    pub fn new(receiver: mpsc::UnboundedReceiver<MonitorEvent>, source_description: &str) -> Self {
        Self {
            receiver,
            description: source_description.to_string(),
            disconnected: false,
        }
    }

    /// Create a channel pair. Returns (sender, source).
    pub fn create(source_description: &str) -> (mpsc::UnboundedSender<MonitorEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, source_description))
    }
}

impl EventSource for ChannelSource {
    fn poll(&mut self) -> Option<MonitorEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.disconnected.then_some("monitor stopped")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterwatch_adapters::AdapterError;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");
        assert!(source.poll().is_none());
        assert!(source.error().is_none());

        tx.send(MonitorEvent::StatsFailed(AdapterError::Timeout)).unwrap();
        tx.send(MonitorEvent::TopologyDiscovered { members: vec![] }).unwrap();

        assert_eq!(source.poll().map(|e| e.kind()), Some("stats_failed"));
        assert_eq!(source.poll().map(|e| e.kind()), Some("topology_discovered"));
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_reports_disconnect_after_draining() {
        let (tx, mut source) = ChannelSource::create("test");
        tx.send(MonitorEvent::StatsFailed(AdapterError::Timeout)).unwrap();
        drop(tx);

        assert!(source.poll().is_some());
        assert!(source.error().is_none());
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("monitor stopped"));
    }
}
