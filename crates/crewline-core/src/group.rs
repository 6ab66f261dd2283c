//! Partition flights into trips.

use std::collections::BTreeMap;

use crate::route::sort_legs;
use crate::types::Flight;

/// Trip key → legs in leg order. Keys iterate sorted.
pub type TripMap = BTreeMap<String, Vec<Flight>>;

/// Group by `trip_key`, falling back to the flight id.
///
/// The result does not depend on input order: keys are sorted and each
/// group is sorted with [`crate::route::leg_order`].
pub fn group_by_trip<'a, I>(flights: I) -> TripMap
where
    I: IntoIterator<Item = &'a Flight>,
{
    let mut trips = TripMap::new();
    for flight in flights {
        trips
            .entry(flight.trip_key().to_string())
            .or_default()
            .push(flight.clone());
    }
    for legs in trips.values_mut() {
        sort_legs(legs);
    }
    trips
}
