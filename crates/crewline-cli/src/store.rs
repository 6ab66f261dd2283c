//! Snapshot persisted as a single JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crewline_core::ports::{SnapshotStore, StoreError};
use crewline_core::Snapshot;
use tokio::fs;
use tracing::debug;

/// JSON array of flights at `path`, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of `path` unique to this process: `<file name>.<pid>.tmp`.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn io_error(&self, what: &str, e: std::io::Error) -> StoreError {
        StoreError::Io {
            location: self.location(),
            message: format!("{}: {}", what, e),
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error("failed to read snapshot", e)),
        };

        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                location: self.location(),
                message: e.to_string(),
            })?;
        debug!(path = %self.path.display(), flights = snapshot.len(), "snapshot loaded");
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Io {
            location: self.location(),
            message: format!("failed to encode snapshot: {}", e),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error("failed to create snapshot directory", e))?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, content)
            .await
            .map_err(|e| self.io_error("failed to write temp file", e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error("failed to rename temp file", e))?;

        debug!(path = %self.path.display(), flights = snapshot.len(), "snapshot saved");
        Ok(())
    }
}
