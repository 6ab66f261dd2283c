use super::{CrewChange, NewTripPolicy, SnapshotDiff};
use crate::group::{group_by_trip, TripMap};
use crate::types::{crew_names, Flight, Snapshot};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Compare two snapshots as of `now`.
///
/// Past flights are ignored on both sides. New flights are the structural set
/// difference `current − previous`; `policy` decides whether those on an
/// already known trip key count as new trips. Crew changes fire for keys
/// present on both sides whose crew-name sets differ, unless the current set
/// is empty (crew not published yet).
pub fn diff_snapshots(
    previous: &Snapshot,
    current: &Snapshot,
    now: DateTime<Utc>,
    policy: NewTripPolicy,
) -> SnapshotDiff {
    let previous = previous.upcoming(now);
    let current = current.upcoming(now);

    let previous_set: HashSet<&Flight> = previous.iter().collect();
    let mut seen = HashSet::new();
    let new_flights: Vec<&Flight> = current
        .iter()
        .filter(|flight| !previous_set.contains(flight) && seen.insert(*flight))
        .collect();

    let previous_keys = previous.trip_keys();
    let mut new_trips = TripMap::new();
    let mut updated_trips = Vec::new();
    for (key, legs) in group_by_trip(new_flights) {
        match policy {
            NewTripPolicy::KeyAbsent if previous_keys.contains(key.as_str()) => {
                debug!(trip = %key, legs = legs.len(), "known trip changed");
                updated_trips.push(key);
            }
            _ => {
                new_trips.insert(key, legs);
            }
        }
    }

    let previous_trips = group_by_trip(&previous);
    let crew_changes: Vec<CrewChange> = group_by_trip(&current)
        .into_iter()
        .filter_map(|(key, legs)| {
            let previous_legs = previous_trips.get(&key)?;
            let previous_crew = crew_names(previous_legs);
            let current_crew = crew_names(&legs);
            (previous_crew != current_crew && !current_crew.is_empty()).then(|| CrewChange {
                trip_key: key,
                legs,
                previous_crew,
                current_crew,
            })
        })
        .collect();

    SnapshotDiff {
        new_trips,
        crew_changes,
        updated_trips,
    }
}
