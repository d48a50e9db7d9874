//! Vitals core data models.
//!
//! Measurements, goals and the unit normalization applied to every
//! measurement before it is stored.

#![warn(missing_docs)]

// Core identities
mod id;

// Records
mod measurement;
mod goal;
mod history;

pub mod units;

// Re-exports
pub use id::*;

pub use measurement::{chronological, Measurement, MeasurementFilter};
pub use goal::{Goal, GoalType, GoalStatus, GoalUpdate, ParseStatusError};
pub use history::{
    BodyProfile, GoalHistory, ParseSexError, ProfileUpdate, Sex, PROFILE_HEIGHT_CM,
    PROFILE_WEIGHT_KG,
};
pub use units::{normalize_unit, canonical_unit, Normalized};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
