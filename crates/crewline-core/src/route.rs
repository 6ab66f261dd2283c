//! Leg ordering and human-readable routes.

use std::cmp::Ordering;

use crate::types::Flight;

/// Separator between stations in a route string.
pub const ROUTE_SEPARATOR: &str = " - ";

/// Null-safe leg order: unknown start times sort first, then by instant,
/// then by id so equal starts are still deterministic.
pub fn leg_order(a: &Flight, b: &Flight) -> Ordering {
    a.start_time()
        .cmp(&b.start_time())
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_legs(legs: &mut [Flight]) {
    legs.sort_by(leg_order);
}

/// Earliest leg under [`leg_order`]; `None` for an empty trip.
pub fn first_leg(legs: &[Flight]) -> Option<&Flight> {
    legs.iter().min_by(|a, b| leg_order(a, b))
}

/// `"TEB - PBI - ASE"` for TEB→PBI, PBI→ASE.
///
/// An origin equal to the last appended station is written once. An empty
/// string means no station is known.
pub fn build_route(legs: &[Flight]) -> String {
    let mut sorted: Vec<&Flight> = legs.iter().collect();
    sorted.sort_by(|a, b| leg_order(a, b));

    let mut stations: Vec<&str> = Vec::new();
    for leg in sorted {
        if let Some(origin) = leg.origin.as_deref() {
            if stations.last() != Some(&origin) {
                stations.push(origin);
            }
        }
        if let Some(destination) = leg.destination.as_deref() {
            stations.push(destination);
        }
    }

    stations.join(ROUTE_SEPARATOR)
}
