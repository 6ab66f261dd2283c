//! Change detection for polled flight schedules.
//!
//! Turns loosely typed schedule records into canonical [`Flight`]s, groups
//! them into trips, compares each poll against the previous snapshot and
//! renders notifications for new trips, crew changes and expired sessions.
//!
//! # Quick Start
//!
//! ```no_run
//! use crewline_core::ports::{MemorySnapshotStore, RecordingSink, StaticSource};
//! use crewline_core::{PollCycle, WatchConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cycle = PollCycle::new(&WatchConfig::default())?;
//! let source = StaticSource::records(vec![]);
//! let store = MemorySnapshotStore::new();
//! let sink = RecordingSink::new();
//!
//! let report = cycle.run(&source, &store, &sink, chrono::Utc::now()).await?;
//! println!("{} notifications", report.sent());
//! # Ok(())
//! # }
//! ```
//!
//! All I/O lives behind the traits in [`ports`]; everything else is pure.

pub mod config;
pub mod cycle;
pub mod diff;
pub mod format;
pub mod group;
pub mod normalize;
pub mod ports;
pub mod route;
pub mod scope;
pub mod types;

// Re-export main types
pub use config::{ConfigError, WatchConfig};
pub use cycle::{CycleError, CycleReport, Delivery, PollCycle};
pub use diff::{diff_snapshots, CrewChange, NewTripPolicy, SnapshotDiff};
pub use format::{NotificationFormatter, NotificationKind};
pub use group::{group_by_trip, TripMap};
pub use normalize::{FieldMap, FieldPath, NormalizeError, NormalizedBatch, Normalizer, RawRecord};
pub use route::{build_route, first_leg, sort_legs};
pub use scope::{AircraftCoverage, EventFilter, Scope};
pub use types::{crew_names, CrewMember, Flight, Snapshot};
