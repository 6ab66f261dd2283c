pub mod engine;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::group::TripMap;
use crate::types::Flight;

pub use engine::diff_snapshots;

/// How structurally new flights on an already known trip are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewTripPolicy {
    /// Only trip keys absent from the previous snapshot are new trips.
    /// Changes on known keys become updates and go through crew detection.
    #[default]
    KeyAbsent,
    /// Every trip with at least one structurally new leg is a new trip.
    Structural,
}

/// A trip whose crew roster differs from the previous poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewChange {
    pub trip_key: String,
    /// Current legs, in leg order.
    pub legs: Vec<Flight>,
    pub previous_crew: BTreeSet<String>,
    pub current_crew: BTreeSet<String>,
}

impl CrewChange {
    pub fn added(&self) -> impl Iterator<Item = &String> {
        self.current_crew.difference(&self.previous_crew)
    }

    pub fn removed(&self) -> impl Iterator<Item = &String> {
        self.previous_crew.difference(&self.current_crew)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    pub new_trips: TripMap,
    pub crew_changes: Vec<CrewChange>,
    /// Known trip keys with structurally changed legs (`KeyAbsent` only).
    pub updated_trips: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.new_trips.is_empty() && self.crew_changes.is_empty() && self.updated_trips.is_empty()
    }

    /// Number of notifications this diff produces.
    pub fn notification_count(&self) -> usize {
        self.new_trips.len() + self.crew_changes.len()
    }
}
