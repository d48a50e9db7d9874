//! Record management.
//!
//! Measurement and goal lifecycle on top of a storage backend: unit
//! normalization on write, body profile sync, goal archive and restore.

#![warn(missing_docs)]

pub mod error;
pub mod manager;

pub use error::{RecordError, Result};
pub use manager::{
    BasicRecordManager, MeasurementUpdate, NewGoal, NewMeasurement, RecordManager,
    DEFAULT_LIST_LIMIT, RESTORED_GOAL_DAYS,
};
