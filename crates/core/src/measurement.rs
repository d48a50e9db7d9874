//! Measurement model - a single observation logged by a subject.

use serde::{Deserialize, Serialize};
use crate::id::{MeasurementId, SubjectId};
use crate::units::normalize_unit;
use crate::Time;

/// A single observation, stored in the canonical unit of its type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Unique identifier
    pub id: MeasurementId,

    /// Owning subject (immutable after creation)
    pub subject_id: SubjectId,

    /// Measurement type tag, e.g. `weight` or `sleep_score`
    #[serde(rename = "type")]
    pub kind: String,

    /// Value in the canonical unit
    pub value: f64,

    /// Canonical unit; empty for custom types
    #[serde(default)]
    pub unit: String,

    /// When the observation applies
    pub timestamp: Time,

    /// Opaque structured payload (questionnaire answers etc.)
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,

    /// Free text
    #[serde(default)]
    pub notes: String,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

fn empty_metadata() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl Measurement {
    /// Create a measurement timestamped now, normalizing `value`/`unit`.
    pub fn new(
        subject_id: SubjectId,
        kind: impl Into<String>,
        value: f64,
        unit: Option<&str>,
    ) -> Self {
        let kind = kind.into();
        let normalized = normalize_unit(&kind, value, unit);
        let now = chrono::Utc::now();
        Self {
            id: MeasurementId::new(),
            subject_id,
            kind,
            value: normalized.value,
            unit: normalized.unit,
            timestamp: now,
            metadata: empty_metadata(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the observation time.
    pub fn with_timestamp(mut self, timestamp: Time) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Attach an opaque metadata payload.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Replace value and unit, normalizing under the current type.
    pub fn set_value(&mut self, value: f64, unit: Option<&str>) {
        let normalized = normalize_unit(&self.kind, value, unit);
        self.value = normalized.value;
        self.unit = normalized.unit;
    }

    /// Case-insensitive type check.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }
}

/// Filter for listing measurements.
#[derive(Debug, Clone, Default)]
pub struct MeasurementFilter {
    /// Only measurements of these types (any type when `None`)
    pub kinds: Option<Vec<String>>,

    /// Inclusive lower bound on `timestamp`
    pub from: Option<Time>,

    /// Inclusive upper bound on `timestamp`
    pub to: Option<Time>,

    /// Sort newest first instead of oldest first
    pub newest_first: bool,

    /// Maximum number of results after sorting
    pub limit: Option<usize>,
}

impl MeasurementFilter {
    /// Whether `m` passes the type and time-window constraints.
    pub fn matches(&self, m: &Measurement) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.iter().any(|k| k == &m.kind) {
                return false;
            }
        }
        if self.from.is_some_and(|from| m.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| m.timestamp > to) {
            return false;
        }
        true
    }

    /// Sort and truncate an already-filtered set.
    ///
    /// Equal timestamps are ordered by id so the result does not depend on
    /// backend iteration order.
    pub fn arrange(&self, mut items: Vec<Measurement>) -> Vec<Measurement> {
        items.sort_by(chronological);
        if self.newest_first {
            items.reverse();
        }
        if let Some(limit) = self.limit {
            items.truncate(limit);
        }
        items
    }
}

/// Oldest first, ties broken by id.
pub fn chronological(a: &Measurement, b: &Measurement) -> std::cmp::Ordering {
    a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id))
}
