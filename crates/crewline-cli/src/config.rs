//! Application configuration file.
//!
//! ```yaml
//! source:
//!   url: https://portal.example.com/schedule/aircraft.json
//!   aircraft_uuids: [857bca59-d347-4d2f-9aa1-d780a42858f0]
//! notify:
//!   topic: CrewLineup
//! snapshot:
//!   path: /var/lib/crewline/flights-data.json
//! watch:
//!   tracked_aircraft: [N84UP]
//! ```

use std::path::{Path, PathBuf};

use crewline_core::{ConfigError, WatchConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted `source.window_days`.
pub const WINDOW_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=366;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CREWLINE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "crewline.yaml";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("configuration error: {message}")]
    Invalid { message: String },

    #[error(transparent)]
    Watch(#[from] ConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub notify: NotifyConfig,
    pub snapshot: SnapshotConfig,
    pub watch: WatchConfig,
}

/// Schedule feed endpoint and transport policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Feed URL without query string.
    pub url: String,
    /// Aircraft resource ids sent as `uuid[]` query parameters.
    pub aircraft_uuids: Vec<String>,
    /// Days ahead of now requested from the feed.
    pub window_days: u32,
    /// Calendar view name sent as `view`.
    pub view: String,
    /// Cookie carrying the session.
    pub cookie_name: String,
    /// Environment variable holding the cookie value.
    pub cookie_env: String,
    pub timeout_secs: u64,
    /// Total attempts for transport/parse failures, including the first.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub retry_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            aircraft_uuids: Vec::new(),
            window_days: 7,
            view: "rollingMonth".to_string(),
            cookie_name: "_app_session".to_string(),
            cookie_env: "SESSION_COOKIE".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            retry_delay_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyConfig {
    pub base_url: String,
    pub topic: String,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ntfy.sh".to_string(),
            topic: "CrewLineup".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("flights-data.json"),
        }
    }
}

impl AppConfig {
    /// Config path from `CREWLINE_CONFIG`, and whether the file must exist.
    ///
    /// An explicitly configured path must exist; the default path may be
    /// absent, in which case defaults apply.
    pub fn resolve_path() -> (PathBuf, bool) {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => (PathBuf::from(path), true),
            _ => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        }
    }

    pub fn load(path: &Path, required: bool) -> Result<Self, AppConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(source) => {
                return Err(AppConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_yaml::from_str(&text).map_err(|source| AppConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.source.url.trim().is_empty() {
            return Err(AppConfigError::Invalid {
                message: "source.url is required".into(),
            });
        }
        url::Url::parse(&self.source.url).map_err(|e| AppConfigError::Invalid {
            message: format!("source.url: {}", e),
        })?;
        if !WINDOW_DAYS_RANGE.contains(&self.source.window_days) {
            return Err(AppConfigError::Invalid {
                message: format!(
                    "source.window_days must be within {}..={}, got {}",
                    WINDOW_DAYS_RANGE.start(),
                    WINDOW_DAYS_RANGE.end(),
                    self.source.window_days
                ),
            });
        }
        if self.source.max_attempts == 0 {
            return Err(AppConfigError::Invalid {
                message: "source.max_attempts must be at least 1".into(),
            });
        }
        if self.notify.topic.trim().is_empty() {
            return Err(AppConfigError::Invalid {
                message: "notify.topic is required".into(),
            });
        }
        self.watch.validate()?;
        Ok(())
    }
}
