//! Unit normalization.
//!
//! Every measurement type has one canonical storage unit. Values arriving in
//! an alternate unit are converted on write so that all stored measurements
//! of a type are directly comparable. Unknown types and unknown units are
//! passed through untouched: an exotic unit must never block a write.

use serde::{Deserialize, Serialize};

/// Kilograms per pound.
pub const KG_PER_LB: f64 = 0.45359237;
/// Centimeters per meter.
pub const CM_PER_M: f64 = 100.0;
/// Centimeters per inch.
pub const CM_PER_IN: f64 = 2.54;
/// Centimeters per foot.
pub const CM_PER_FT: f64 = 30.48;
/// Millimeters of mercury per kilopascal.
pub const MMHG_PER_KPA: f64 = 7.50062;
/// mg/dL per mmol/L of glucose.
pub const MGDL_PER_MMOLL: f64 = 18.0;

/// A value expressed in its canonical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    /// Converted value
    pub value: f64,
    /// Canonical (or passed-through) unit
    pub unit: String,
}

impl Normalized {
    fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// Canonical unit for a measurement type, if the type is known.
pub fn canonical_unit(kind: &str) -> Option<&'static str> {
    match kind.to_lowercase().as_str() {
        "weight" => Some("kg"),
        "height" => Some("cm"),
        "blood_pressure" | "blood-pressure" | "bp" => Some("mmHg"),
        "glucose" => Some("mg/dL"),
        _ => None,
    }
}

/// Convert `(kind, value, unit)` into the canonical unit for `kind`.
///
/// A missing or empty unit on a known type is taken to already be canonical.
pub fn normalize_unit(kind: &str, value: f64, unit: Option<&str>) -> Normalized {
    let raw = unit.unwrap_or("");
    let u = raw.to_lowercase();

    let Some(canonical) = canonical_unit(kind) else {
        return Normalized::new(value, raw);
    };

    let factor = match (canonical, u.as_str()) {
        (_, "") => Some(1.0),
        ("kg", "kg" | "kilogram" | "kilograms") => Some(1.0),
        ("kg", "lb" | "lbs" | "pound" | "pounds") => Some(KG_PER_LB),
        ("cm", "cm" | "centimeter" | "centimeters") => Some(1.0),
        ("cm", "m" | "meter" | "meters") => Some(CM_PER_M),
        ("cm", "in" | "inch" | "inches") => Some(CM_PER_IN),
        ("cm", "ft" | "feet") => Some(CM_PER_FT),
        ("mmHg", "mmhg") => Some(1.0),
        ("mmHg", "kpa") => Some(MMHG_PER_KPA),
        ("mg/dL", "mg/dl") => Some(1.0),
        ("mg/dL", "mmol/l" | "mmol") => Some(MGDL_PER_MMOLL),
        _ => None,
    };

    match factor {
        Some(f) if f == 1.0 => Normalized::new(value, canonical),
        Some(f) => Normalized::new(value * f, canonical),
        None => Normalized::new(value, raw),
    }
}
