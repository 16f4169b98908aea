//! Event source abstraction for the terminal UI.
//!
//! The UI thread never awaits anything. It polls an [`EventSource`] between
//! frames and renders whatever has arrived.

mod channel;

pub use channel::ChannelSource;

use std::fmt::Debug;

use crate::events::MonitorEvent;

/// Non-blocking supply of monitor events.
///
/// # Example
///
/// ```
/// use clusterwatch::{ChannelSource, EventSource};
///
/// let (_tx, mut source) = ChannelSource::create("mongodb://localhost");
/// assert!(source.poll().is_none());
/// ```
pub trait EventSource: Send + Debug {
    /// Take the next pending event, if any. Never blocks.
    fn poll(&mut self) -> Option<MonitorEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns a message once the source can no longer produce events.
    fn error(&self) -> Option<&str>;
}
