//! Goal progress.
//!
//! Goal-to-measurement mapping, direction-aware progress math, and the
//! tracker that derives progress views from stored measurements.

#![warn(missing_docs)]

pub mod mapping;
pub mod calculator;
pub mod tracker;
pub mod summary;
pub mod messages;

pub use mapping::{
    measure_types, measure_types_for_goal_type, primary_measure_type,
    primary_measure_type_for_goal,
};
pub use calculator::{compute_progress, direction_for, progress_for, Direction};
pub use tracker::{
    evaluate_goal, BasicProgressTracker, GoalProgress, ProgressSnapshot, ProgressTracker,
    TrackedGoal,
};
pub use summary::{daily_averages, DailySummary};
pub use messages::{motivation_hints, motivation_messages, pick_message};
