//! Adapters that connect `crewline-core` to the outside world: an HTTP
//! schedule feed, a JSON snapshot file and an ntfy-style webhook.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `CREWLINE_CONFIG` | YAML config path (default: `crewline.yaml`, optional) |
//! | `SESSION_COOKIE` | Session cookie value (name configurable via `source.cookie_env`) |
//! | `RUST_LOG` | Log filter (default: `info`) |

pub mod config;
pub mod exit_codes;
pub mod sink;
pub mod source;
pub mod store;

pub use config::{AppConfig, AppConfigError, NotifyConfig, SnapshotConfig, SourceConfig};
pub use sink::NtfySink;
pub use source::HttpRecordSource;
pub use store::JsonFileStore;
