//! Failures reported by the collaborators around the engine.

use thiserror::Error;

/// Record source failures.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Network or HTTP failure, after the source's own retries.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The session is no longer valid. Never retried.
    #[error("session expired: {message}")]
    AuthExpired { message: String },

    /// The response was not a list of records.
    #[error("unparsable response: {message}")]
    Parse { message: String },
}

impl SourceError {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Parse { .. })
    }
}

/// Snapshot store failures. A missing snapshot is not an error.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The stored snapshot exists but cannot be decoded.
    #[error("corrupt snapshot at {location}: {message}")]
    Corrupt { location: String, message: String },

    #[error("snapshot I/O error at {location}: {message}")]
    Io { location: String, message: String },
}

/// Notification delivery failures.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    #[error("notification transport error: {message}")]
    Transport { message: String },

    /// The endpoint answered but refused the message.
    #[error("notification rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}
