//! In-memory collaborators for tests and dry runs.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{NotificationSink, RecordSource, SinkError, SnapshotStore, SourceError, StoreError};
use crate::normalize::RawRecord;
use crate::types::Snapshot;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Answers every fetch with the same response.
#[derive(Debug, Clone)]
pub struct StaticSource {
    response: Result<Vec<RawRecord>, SourceError>,
}

impl StaticSource {
    pub fn records(records: Vec<RawRecord>) -> Self {
        Self {
            response: Ok(records),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        self.response.clone()
    }
}

/// Snapshot store backed by a mutex; counts saves.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<Snapshot>>,
    saves: Mutex<usize>,
    load_error: Option<StoreError>,
    save_error: Option<StoreError>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Every load fails with `error`.
    pub fn failing_load(mut self, error: StoreError) -> Self {
        self.load_error = Some(error);
        self
    }

    /// Every save fails with `error`.
    pub fn failing_save(mut self, error: StoreError) -> Self {
        self.save_error = Some(error);
        self
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        lock(&self.snapshot).clone()
    }

    pub fn save_count(&self) -> usize {
        *lock(&self.saves)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        if let Some(error) = &self.load_error {
            return Err(error.clone());
        }
        Ok(lock(&self.snapshot).clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *lock(&self.saves) += 1;
        if let Some(error) = &self.save_error {
            return Err(error.clone());
        }
        *lock(&self.snapshot) = Some(snapshot.clone());
        Ok(())
    }
}

/// Records every message; optionally rejects those containing a marker.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<String>>,
    reject_containing: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(marker: impl Into<String>) -> Self {
        Self {
            sent: Mutex::default(),
            reject_containing: Some(marker.into()),
        }
    }

    /// Messages accepted so far, in send order.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, message: &str) -> Result<(), SinkError> {
        if let Some(marker) = &self.reject_containing {
            if message.contains(marker.as_str()) {
                return Err(SinkError::Rejected {
                    status: 500,
                    message: format!("rejected message containing {marker:?}"),
                });
            }
        }
        lock(&self.sent).push(message.to_string());
        Ok(())
    }
}
