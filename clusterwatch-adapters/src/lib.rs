//! # clusterwatch-adapters
//!
//! Cluster client adapters for clusterwatch.
//!
//! The monitor only needs a small, read-only capability surface from a
//! database driver: list databases, list collections, count documents, and
//! run the replication-status and storage-statistics commands. That surface
//! is the [`ClusterClient`] trait; this crate provides implementations.
//!
//! ## Supported Backends
//!
//! - **MongoDB** (`mongodb` feature) - Uses the official async driver against a
//!   replica set (or a single member with a direct connection)
//! - **In-memory** ([`memory::InMemoryCluster`]) - Scriptable cluster for tests
//!
//! ## Quick Start (MongoDB)
//!
//! ```rust,no_run
//! use clusterwatch_adapters::mongo::MongoAdapter;
//! use clusterwatch_adapters::ClusterClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = MongoAdapter::builder()
//!         .endpoint("mongodb://127.0.0.1:27017/?replicaSet=rs0")
//!         .connect()
//!         .await?;
//!
//!     let databases = adapter.list_database_names().await?;
//!     println!("Found {} databases", databases.len());
//!     Ok(())
//! }
//! ```

mod client;
pub mod error;
pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongo;

pub use client::ClusterClient;
pub use error::AdapterError;

// Re-export types for convenience
pub use clusterwatch_types::ReplicaMember;
