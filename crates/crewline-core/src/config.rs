//! Watcher configuration, passed explicitly into each component.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::diff::NewTripPolicy;
use crate::normalize::{FieldMap, Normalizer};
use crate::scope::{EventFilter, Scope};

pub const DEFAULT_TIMEZONE: &str = "America/New_York";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown timezone '{name}'")]
    InvalidTimezone { name: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// What to watch and how to report it.
///
/// ```yaml
/// home_base: TEB
/// tracked_aircraft: [N84UP, N717KV]
/// events:
///   exclude_types: [maintenance]
/// new_trip_policy: key_absent
/// timezone: America/New_York
/// fields:
///   aircraft: [extendedProps.tail_number]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Keep only trips with a leg departing from or arriving at this station.
    pub home_base: Option<String>,
    /// Keep only flights on these tails. `None` keeps every aircraft.
    pub tracked_aircraft: Option<BTreeSet<String>>,
    pub events: EventFilter,
    pub new_trip_policy: NewTripPolicy,
    /// IANA zone used for "today" and displayed times.
    pub timezone: String,
    pub fields: FieldMap,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            home_base: None,
            tracked_aircraft: None,
            events: EventFilter::default(),
            new_trip_policy: NewTripPolicy::default(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            fields: FieldMap::default(),
        }
    }
}

impl WatchConfig {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone {
                name: self.timezone.clone(),
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;
        if matches!(&self.tracked_aircraft, Some(tails) if tails.is_empty()) {
            return Err(ConfigError::Invalid {
                message: "tracked_aircraft is empty; omit it to track every aircraft".into(),
            });
        }
        if self.fields.id.is_empty() {
            return Err(ConfigError::Invalid {
                message: "fields.id needs at least one path".into(),
            });
        }
        Ok(())
    }

    pub fn scope(&self) -> Scope {
        Scope {
            tracked_aircraft: self.tracked_aircraft.clone(),
            home_base: self.home_base.clone(),
            events: self.events.clone(),
        }
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.fields.clone())
    }
}
