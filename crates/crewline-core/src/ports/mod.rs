//! Collaborator seams: where records come from, where snapshots live, and
//! where notifications go.
//!
//! The engine never performs I/O itself. A poll cycle awaits these traits one
//! call at a time; each implementation owns its retries, timeouts and
//! storage format.

pub mod error;
pub mod memory;

use async_trait::async_trait;

pub use error::{SinkError, SourceError, StoreError};
pub use memory::{MemorySnapshotStore, RecordingSink, StaticSource};

use crate::normalize::RawRecord;
use crate::types::Snapshot;

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// All raw records for the watched window.
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError>;
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// The previously saved snapshot, or `None` when there is none yet.
    async fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Replace the stored snapshot entirely.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), SinkError>;
}
