//! Raw record → canonical `Flight`.
//!
//! Records arrive as loosely typed JSON whose layout drifts between data
//! source revisions. The normalizer resolves every field through a
//! [`FieldMap`] and only rejects records that are not objects at all.

pub mod field_map;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub use field_map::{FieldMap, FieldPath};

use crate::types::{CrewMember, Flight};
use field_map::{first_array, first_bool, first_string};

/// One record as delivered by the source.
pub type RawRecord = Value;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static regex"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The record cannot be read as a mapping.
    #[error("malformed record: expected a JSON object, got {found}")]
    MalformedRecord { found: &'static str },
}

/// A record the batch skipped, with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    pub index: usize,
    pub error: NormalizeError,
}

/// Output of [`Normalizer::normalize_batch`].
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub flights: Vec<Flight>,
    pub dropped: Vec<DroppedRecord>,
    /// Flights whose id was generated because the source had none. These
    /// cannot be matched across polls and show up as new every time.
    pub synthesized_ids: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    fields: FieldMap,
}

impl Normalizer {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    pub fn normalize(&self, raw: &RawRecord) -> Result<Flight, NormalizeError> {
        self.normalize_inner(raw).map(|(flight, _)| flight)
    }

    /// Normalize every record, dropping malformed ones instead of failing.
    pub fn normalize_batch(&self, records: &[RawRecord]) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();

        for (index, raw) in records.iter().enumerate() {
            match self.normalize_inner(raw) {
                Ok((flight, synthesized)) => {
                    if synthesized {
                        batch.synthesized_ids += 1;
                        debug!(index, id = %flight.id, "record has no source id; synthesized one");
                    }
                    batch.flights.push(flight);
                }
                Err(error) => {
                    warn!(index, error = %error, "dropping record");
                    batch.dropped.push(DroppedRecord { index, error });
                }
            }
        }

        batch
    }

    fn normalize_inner(&self, raw: &RawRecord) -> Result<(Flight, bool), NormalizeError> {
        if !raw.is_object() {
            return Err(NormalizeError::MalformedRecord {
                found: json_kind(raw),
            });
        }

        let fields = &self.fields;
        let (id, synthesized) = match first_string(raw, &fields.id) {
            Some(id) => (id, false),
            None => (Uuid::new_v4().to_string(), true),
        };

        let flight = Flight {
            id,
            start: first_string(raw, &fields.start),
            origin: first_string(raw, &fields.origin),
            destination: first_string(raw, &fields.destination),
            aircraft: first_string(raw, &fields.aircraft),
            crew: first_array(raw, &fields.crew).map(|entries| self.crew(entries)),
            trip_key: first_string(raw, &fields.trip_key),
            event_type_name: first_string(raw, &fields.event_type_name),
            event_group: first_string(raw, &fields.event_group),
            is_actual_flight: first_bool(raw, &fields.is_actual_flight),
        };

        Ok((flight, synthesized))
    }

    fn crew(&self, entries: &[Value]) -> Vec<CrewMember> {
        entries
            .iter()
            .filter_map(|entry| {
                let name = first_string(entry, &self.fields.crew_name)?;
                let role = first_string(entry, &self.fields.crew_role)?;
                let name = strip_markup(&name);
                (!name.is_empty()).then(|| CrewMember::new(name, role))
            })
            .collect()
    }
}

/// Remove every `<...>` tag, then trim.
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").trim().to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
