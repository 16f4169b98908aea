//! # clusterwatch-types
//!
//! Core types for replica set change monitoring. This crate defines the data
//! shared between the cluster adapters, the monitor engine and anything that
//! renders the monitor's output.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature as needed
//! - **Immutable snapshots**: A [`Snapshot`] cannot be changed once built
//! - **Ergonomic builders**: Fluent API for constructing snapshots
//!
//! ## Features
//!
//! - `serde`: JSON/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use clusterwatch_types::{CollectionKey, Snapshot};
//!
//! let snapshot = Snapshot::builder()
//!     .timestamp_ms(1703160000000)
//!     .collection("shop", "orders", 1500)
//!     .collection("shop", "users", 42)
//!     .build();
//!
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot.count(&CollectionKey::new("shop", "orders")), Some(1500));
//! ```

mod delta;
mod key;
mod member;
mod slot;
mod snapshot;
mod stats;

pub use delta::*;
pub use key::*;
pub use member::*;
pub use slot::*;
pub use snapshot::*;
pub use stats::*;

/// Current time in milliseconds since the Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Format a Unix millisecond timestamp as a UTC wall-clock time (`HH:MM:SS`).
pub fn format_clock(timestamp_ms: u64) -> String {
    let secs = timestamp_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}
