//! Display models derived from monitor events.
//!
//! ## Submodules
//!
//! - [`activity`]: Bounded log of changes and failures
//! - [`cluster`]: Per-slot state and the latest cluster statistics
//! - [`trend`]: Value history for sparklines and rate calculations
//!
//! ## Data Flow
//!
//! ```text
//! MonitorEvent (from the monitor task)
//!        │
//!        ├──▶ ClusterView::apply() ──▶ SlotState (flash, failures, Trend)
//!        │
//!        └──▶ ActivityLog::record()
//! ```

pub mod activity;
pub mod cluster;
pub mod trend;

pub use activity::{ActivityEntry, ActivityLevel, ActivityLog};
pub use cluster::{ClusterView, SlotState, SlotStatus, StatsState, FLASH_DURATION};
pub use trend::Trend;
