//! Named field access with fallbacks.
//!
//! Each canonical field maps to an ordered list of dotted paths into the raw
//! record (`extendedProps.uuid`, `uuid`, ...). The first path yielding a value
//! of the expected type wins, so a deployment absorbs renamed or relocated
//! fields by editing configuration rather than code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A dotted path into a JSON object, e.g. `extendedProps.origin_short`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Walk the path; `None` when any segment is missing or not an object.
    pub fn lookup<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.0
            .split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(record, |value, segment| value.as_object()?.get(segment))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

fn paths(list: &[&str]) -> Vec<FieldPath> {
    list.iter().copied().map(FieldPath::from).collect()
}

/// Where each canonical `Flight` field lives in a raw record.
///
/// Every entry is optional in configuration; omitted entries keep the
/// defaults below, which match the `extendedProps`-nested calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldMap {
    pub id: Vec<FieldPath>,
    pub start: Vec<FieldPath>,
    pub origin: Vec<FieldPath>,
    pub destination: Vec<FieldPath>,
    pub aircraft: Vec<FieldPath>,
    pub crew: Vec<FieldPath>,
    pub trip_key: Vec<FieldPath>,
    pub event_type_name: Vec<FieldPath>,
    pub event_group: Vec<FieldPath>,
    pub is_actual_flight: Vec<FieldPath>,
    /// Paths inside one crew entry.
    pub crew_name: Vec<FieldPath>,
    pub crew_role: Vec<FieldPath>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            id: paths(&["extendedProps.uuid", "uuid"]),
            start: paths(&["start", "extendedProps.start"]),
            origin: paths(&["extendedProps.origin_short", "origin_short", "origin"]),
            destination: paths(&[
                "extendedProps.destination_short",
                "destination_short",
                "destination",
            ]),
            aircraft: paths(&[
                "extendedProps.aircraft",
                "extendedProps.tail_number",
                "aircraft",
                "tail_number",
            ]),
            crew: paths(&["extendedProps.crew", "crew"]),
            trip_key: paths(&["extendedProps.pnr", "pnr"]),
            event_type_name: paths(&["extendedProps.event_type_name", "event_type_name"]),
            event_group: paths(&["extendedProps.event_group", "event_group"]),
            is_actual_flight: paths(&["extendedProps.is_actual_flight", "is_actual_flight"]),
            crew_name: paths(&["name"]),
            crew_role: paths(&["role"]),
        }
    }
}

/// First non-empty string among `candidates`, trimmed.
pub(crate) fn first_string(record: &Value, candidates: &[FieldPath]) -> Option<String> {
    candidates.iter().find_map(|path| {
        let text = path.lookup(record)?.as_str()?.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// First value among `candidates` that reads as a boolean.
pub(crate) fn first_bool(record: &Value, candidates: &[FieldPath]) -> Option<bool> {
    candidates.iter().find_map(|path| match path.lookup(record)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    })
}

/// First array among `candidates`.
pub(crate) fn first_array<'a>(record: &'a Value, candidates: &[FieldPath]) -> Option<&'a [Value]> {
    candidates
        .iter()
        .find_map(|path| path.lookup(record)?.as_array().map(Vec::as_slice))
}
