//! Canonical schedule model.
//!
//! `Flight` is a plain value: it is rebuilt from raw records on every poll and
//! never mutated afterwards. Equality and hashing cover every field, so a set
//! difference between two snapshots treats any field change as a new element.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A crew assignment on one leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CrewMember {
    /// Display name, with inline markup removed and whitespace trimmed.
    pub name: String,
    /// Free-text role (e.g. "PIC", "SIC", "FA").
    pub role: String,
}

impl CrewMember {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }

    /// Text before the first whitespace of the name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// One scheduled event (a flight leg or a calendar entry) as of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flight {
    /// Source UUID when available, otherwise a synthesized random id.
    pub id: String,

    /// Start time, kept verbatim as reported (RFC 3339 expected).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Tail number / registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew: Option<Vec<CrewMember>>,

    /// Reservation / locator code joining legs into one trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_actual_flight: Option<bool>,
}

impl Flight {
    /// A flight with only an id; every other field absent.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: None,
            origin: None,
            destination: None,
            aircraft: None,
            crew: None,
            trip_key: None,
            event_type_name: None,
            event_group: None,
            is_actual_flight: None,
        }
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_route(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self.destination = Some(destination.into());
        self
    }

    pub fn with_aircraft(mut self, aircraft: impl Into<String>) -> Self {
        self.aircraft = Some(aircraft.into());
        self
    }

    pub fn with_crew(mut self, crew: Vec<CrewMember>) -> Self {
        self.crew = Some(crew);
        self
    }

    pub fn with_trip_key(mut self, key: impl Into<String>) -> Self {
        self.trip_key = Some(key.into());
        self
    }

    pub fn with_event_type(mut self, name: impl Into<String>) -> Self {
        self.event_type_name = Some(name.into());
        self
    }

    /// Grouping key: the locator code, or the id when there is none.
    pub fn trip_key(&self) -> &str {
        self.trip_key.as_deref().unwrap_or(&self.id)
    }

    /// Parsed start instant; `None` when missing or unparsable.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.start.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Strictly before `now`. Unknown start times are never past.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.start_time().is_some_and(|start| start < now)
    }

    pub fn crew_members(&self) -> &[CrewMember] {
        self.crew.as_deref().unwrap_or(&[])
    }
}

/// Set of crew names across all legs.
pub fn crew_names(legs: &[Flight]) -> BTreeSet<String> {
    legs.iter()
        .flat_map(Flight::crew_members)
        .map(|member| member.name.clone())
        .collect()
}

/// Upcoming flights as of one poll, in source order.
///
/// Serializes as a bare JSON array of flights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    flights: Vec<Flight>,
}

impl Snapshot {
    pub fn new(flights: Vec<Flight>) -> Self {
        Self { flights }
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Flight> {
        self.flights.iter()
    }

    /// Copy of this snapshot without past flights.
    pub fn upcoming(&self, now: DateTime<Utc>) -> Snapshot {
        Snapshot::new(
            self.flights
                .iter()
                .filter(|flight| !flight.is_past(now))
                .cloned()
                .collect(),
        )
    }

    /// Trip keys present in this snapshot.
    pub fn trip_keys(&self) -> BTreeSet<&str> {
        self.flights.iter().map(Flight::trip_key).collect()
    }
}

impl From<Vec<Flight>> for Snapshot {
    fn from(flights: Vec<Flight>) -> Self {
        Self::new(flights)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Flight;
    type IntoIter = std::slice::Iter<'a, Flight>;

    fn into_iter(self) -> Self::IntoIter {
        self.flights.iter()
    }
}
