//! Notification text.
//!
//! Messages are short enough for a phone push notification:
//!
//! ```text
//! 🛫 Flight: today at 09:30 on N84UP TEB - PBI - ASE
//! 👨‍✈️ Crew: PIC: Alice, SIC: Bob - Mar 6 at 14:00 TEB - PBI
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::route::{build_route, first_leg};
use crate::types::{CrewMember, Flight};

pub const SESSION_EXPIRED_MESSAGE: &str = "⚠️ Session expired! Update the session cookie";
pub const UNKNOWN_TIME: &str = "Unknown time";
pub const UNKNOWN_AIRCRAFT: &str = "Unknown";

const ICON_MAINTENANCE: &str = "🔧";
const ICON_FLIGHT: &str = "🛫";
const ICON_CALENDAR: &str = "📅";
const ICON_CREW: &str = "👨‍✈️";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NewTrip,
    CrewChange,
    SessionExpired,
}

/// Renders notifications relative to one poll instant in one timezone.
#[derive(Debug, Clone, Copy)]
pub struct NotificationFormatter {
    timezone: Tz,
    now: DateTime<Utc>,
}

impl NotificationFormatter {
    pub fn new(timezone: Tz, now: DateTime<Utc>) -> Self {
        Self { timezone, now }
    }

    /// `None` when a trip notification is requested for an empty trip.
    pub fn format(&self, kind: NotificationKind, trip: &[Flight]) -> Option<String> {
        match kind {
            NotificationKind::NewTrip => self.new_trip(trip),
            NotificationKind::CrewChange => self.crew_change(trip),
            NotificationKind::SessionExpired => Some(SESSION_EXPIRED_MESSAGE.to_string()),
        }
    }

    pub fn new_trip(&self, trip: &[Flight]) -> Option<String> {
        let first = first_leg(trip)?;
        let kind = first.event_type_name.as_deref();
        let aircraft = first.aircraft.as_deref().unwrap_or(UNKNOWN_AIRCRAFT);

        let mut message = format!(
            "{} {}: {} on {}",
            event_icon(kind),
            event_label(kind),
            self.time(first),
            aircraft
        );
        append_route(&mut message, &build_route(trip));
        Some(message)
    }

    pub fn crew_change(&self, trip: &[Flight]) -> Option<String> {
        let first = first_leg(trip)?;
        let mut message = format!(
            "{} Crew: {} - {}",
            ICON_CREW,
            crew_text(representative_crew(trip)),
            self.time(first)
        );
        append_route(&mut message, &build_route(trip));
        Some(message)
    }

    /// `"today at HH:MM"`, `"Mar 5 at HH:MM"`, or `"Unknown time"`.
    pub fn time(&self, flight: &Flight) -> String {
        let Some(start) = flight.start_time() else {
            return UNKNOWN_TIME.to_string();
        };
        let local = start.with_timezone(&self.timezone);
        let today = self.now.with_timezone(&self.timezone).date_naive();
        if local.date_naive() == today {
            local.format("today at %H:%M").to_string()
        } else {
            local.format("%b %-d at %H:%M").to_string()
        }
    }
}

fn append_route(message: &mut String, route: &str) {
    if !route.is_empty() {
        message.push(' ');
        message.push_str(route);
    }
}

fn is_flight_type(lower: &str) -> bool {
    lower.contains("flight") || lower.contains("customer")
}

pub fn event_icon(event_type: Option<&str>) -> &'static str {
    let Some(kind) = event_type.map(str::to_lowercase) else {
        return ICON_CALENDAR;
    };
    if kind.contains("maintenance") {
        ICON_MAINTENANCE
    } else if is_flight_type(&kind) {
        ICON_FLIGHT
    } else {
        ICON_CALENDAR
    }
}

pub fn event_label(event_type: Option<&str>) -> &str {
    match event_type {
        None => "Event",
        Some(kind) if is_flight_type(&kind.to_lowercase()) => "Flight",
        Some(kind) => kind,
    }
}

/// Crew of the earliest leg that has one.
fn representative_crew(trip: &[Flight]) -> &[CrewMember] {
    let mut legs: Vec<&Flight> = trip.iter().collect();
    legs.sort_by(|a, b| crate::route::leg_order(a, b));
    legs.into_iter()
        .map(Flight::crew_members)
        .find(|crew| !crew.is_empty())
        .unwrap_or(&[])
}

/// `"PIC: Alice, SIC: Bob"`, or the first names of everyone when no role
/// mentions PIC or SIC.
pub fn crew_text(crew: &[CrewMember]) -> String {
    let has_role = |member: &&CrewMember, tag: &str| member.role.to_lowercase().contains(tag);
    let pic = crew.iter().find(|m| has_role(m, "pic"));
    let sic = crew.iter().find(|m| has_role(m, "sic"));

    let tagged: Vec<String> = [("PIC", pic), ("SIC", sic)]
        .into_iter()
        .filter_map(|(label, member)| member.map(|m| format!("{}: {}", label, m.first_name())))
        .collect();

    if tagged.is_empty() {
        crew.iter()
            .map(CrewMember::first_name)
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        tagged.join(", ")
    }
}

/// One-line description for logs: `"N84UP: TEB - PBI [Customer Flight]"`.
pub fn summarize_trip(trip: &[Flight]) -> Option<String> {
    let first = first_leg(trip)?;
    let aircraft = first.aircraft.as_deref().unwrap_or("?");
    let kind = first.event_type_name.as_deref().unwrap_or("Unknown");
    let route = build_route(trip);
    let shown = if route.is_empty() { kind } else { route.as_str() };
    Some(format!("{}: {} [{}]", aircraft, shown, kind))
}
