// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # clusterwatch
//!
//! A terminal monitor that watches a MongoDB replica set and reports, per
//! member, which collections gained or lost documents between polls.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        tokio runtime                          │
//! │  ┌──────────────┐   ┌─────────┐   ┌──────┐   ┌──────────────┐ │
//! │  │ClusterClient │──▶│ Monitor │──▶│ diff │──▶│  EventSink   │ │
//! │  │ (adapters)   │   │ (tick)  │   │      │   │ (mpsc / fn)  │ │
//! │  └──────────────┘   └─────────┘   └──────┘   └──────┬───────┘ │
//! └─────────────────────────────────────────────────────┼─────────┘
//!                                                       ▼
//!                    ┌──────────────┐   ┌──────┐   ┌──────────┐
//!                    │ ChannelSource│──▶│ App  │──▶│   ui     │
//!                    └──────────────┘   └──────┘   └──────────┘
//! ```
//!
//! - **[`engine`]**: Topology discovery, snapshots, diffing, aggregate
//!   statistics and the polling loop
//! - **[`events`]**: [`MonitorEvent`] and the [`EventSink`] seam
//! - **[`source`]** / **[`app`]** / **[`data`]** / **[`ui`]**: the terminal UI,
//!   which only consumes events
//! - **[`config`]**: layered [`Settings`]
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Interactive monitor
//! clusterwatch --connect "mongodb://db1,db2,db3/?replicaSet=rs0"
//!
//! # Events as NDJSON on stdout
//! clusterwatch --connect "mongodb://localhost/?replicaSet=rs0" --headless
//!
//! # Collections and counts of one database
//! clusterwatch --connect "mongodb://localhost" --browse shop
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//!
//! use clusterwatch::{Monitor, MonitorEvent};
//! use clusterwatch_adapters::memory::InMemoryCluster;
//!
//! # tokio_test::block_on(async {
//! let cluster = InMemoryCluster::replica_set(&["db1:27017", "db2:27017"]);
//! cluster.set_count("shop", "orders", 10);
//!
//! let mut monitor = Monitor::builder()
//!     .client(Arc::new(cluster.clone()))
//!     .sink(|event: MonitorEvent| println!("{event:?}"))
//!     .connect()
//!     .await
//!     .unwrap();
//!
//! monitor.tick().await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod events;
pub mod headless;
pub mod input;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{Overrides, Settings};
pub use engine::{
    diff, CollectionFilter, Monitor, MonitorBuilder, MonitorHandle, SnapshotEngine, TickReport,
};
pub use error::MonitorError;
pub use events::{EventSink, MonitorEvent};
pub use source::{ChannelSource, EventSource};
