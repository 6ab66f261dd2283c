//! Deployment-level selection of the flights worth watching.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::group::group_by_trip;
use crate::types::Flight;

/// Which calendar entries are operationally relevant.
///
/// The default accepts everything. Matching is case-insensitive; type
/// exclusions are substring matches ("maintenance" drops "Scheduled
/// Maintenance").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventFilter {
    /// Keep only entries whose `is_actual_flight` flag is set.
    pub require_actual_flight: bool,
    /// When non-empty, keep only entries whose `event_group` is listed.
    pub include_groups: Vec<String>,
    /// Drop entries whose `event_type_name` contains any of these.
    pub exclude_types: Vec<String>,
}

impl EventFilter {
    pub fn matches(&self, flight: &Flight) -> bool {
        if self.require_actual_flight && flight.is_actual_flight != Some(true) {
            return false;
        }

        if !self.include_groups.is_empty() {
            let Some(group) = flight.event_group.as_deref() else {
                return false;
            };
            if !self
                .include_groups
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(group))
            {
                return false;
            }
        }

        match flight.event_type_name.as_deref() {
            Some(kind) => {
                let kind = kind.to_lowercase();
                !self
                    .exclude_types
                    .iter()
                    .any(|excluded| kind.contains(&excluded.to_lowercase()))
            }
            None => true,
        }
    }
}

/// Tracked aircraft, home base and event predicate, applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub tracked_aircraft: Option<BTreeSet<String>>,
    pub home_base: Option<String>,
    pub events: EventFilter,
}

impl Scope {
    /// Flights in scope, in input order.
    ///
    /// Aircraft and event rules apply per flight. The home base rule applies
    /// per trip: every leg of a trip touching the base is kept, so routes
    /// stay complete.
    pub fn apply(&self, flights: Vec<Flight>) -> Vec<Flight> {
        let flights: Vec<Flight> = flights
            .into_iter()
            .filter(|flight| self.is_tracked(flight) && self.events.matches(flight))
            .collect();

        let Some(base) = self.home_base.as_deref() else {
            return flights;
        };

        let touching: BTreeSet<String> = group_by_trip(&flights)
            .into_iter()
            .filter(|(_, legs)| legs.iter().any(|leg| touches(leg, base)))
            .map(|(key, _)| key)
            .collect();

        flights
            .into_iter()
            .filter(|flight| touching.contains(flight.trip_key()))
            .collect()
    }

    pub fn is_tracked(&self, flight: &Flight) -> bool {
        match (&self.tracked_aircraft, flight.aircraft.as_deref()) {
            (None, _) => true,
            (Some(tracked), Some(tail)) => tracked.contains(tail),
            (Some(_), None) => false,
        }
    }

    /// Tracked tails seen / not seen among `flights`. Empty when nothing is tracked.
    pub fn coverage(&self, flights: &[Flight]) -> AircraftCoverage {
        let Some(tracked) = &self.tracked_aircraft else {
            return AircraftCoverage::default();
        };
        let seen: BTreeSet<&str> = flights.iter().filter_map(|f| f.aircraft.as_deref()).collect();
        let (found, missing): (BTreeSet<String>, BTreeSet<String>) = tracked
            .iter()
            .cloned()
            .partition(|tail| seen.contains(tail.as_str()));
        AircraftCoverage { found, missing }
    }
}

fn touches(leg: &Flight, base: &str) -> bool {
    [leg.origin.as_deref(), leg.destination.as_deref()]
        .into_iter()
        .flatten()
        .any(|station| station.eq_ignore_ascii_case(base))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AircraftCoverage {
    pub found: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}
