//! Direction-aware goal progress.

use serde::{Deserialize, Serialize};
use vitals_core::GoalType;

/// Which way a tracked value has to move for a goal to improve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Progress is the decrease relative to the current value.
    LowerIsBetter,
    /// Progress is the current value as a share of the target.
    HigherIsBetter,
    /// The target is a ceiling; progress is the headroom below it.
    Ceiling,
}

/// Direction semantics of a goal type.
///
/// MAINTENANCE and unknown types use [`Direction::HigherIsBetter`].
pub fn direction_for(goal_type: &GoalType) -> Direction {
    match goal_type {
        GoalType::WeightLoss | GoalType::StressReduction => Direction::LowerIsBetter,
        GoalType::HeartHealth | GoalType::DiabetesControl => Direction::Ceiling,
        GoalType::MuscleGain
        | GoalType::SleepImprovement
        | GoalType::Maintenance
        | GoalType::Other(_) => Direction::HigherIsBetter,
    }
}

/// Progress percentage in `[0, 100]` for a goal of `goal_type`.
///
/// A zero target yields 0, as does a zero current value on lower-is-better
/// goals. Non-finite inputs yield 0.
pub fn progress_for(current: f64, target: f64, goal_type: &GoalType) -> f64 {
    if !current.is_finite() || !target.is_finite() || target == 0.0 {
        return 0.0;
    }

    let ratio = match direction_for(goal_type) {
        Direction::LowerIsBetter => {
            if current == 0.0 {
                return 0.0;
            }
            (current - target) / current
        }
        Direction::HigherIsBetter => current / target,
        Direction::Ceiling => (target - current) / target,
    };

    clamp_percent(ratio * 100.0)
}

/// [`progress_for`] keyed by the raw goal tag.
pub fn compute_progress(current: f64, target: f64, goal_type: &str) -> f64 {
    progress_for(current, target, &GoalType::from(goal_type))
}

fn clamp_percent(pct: f64) -> f64 {
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAGS: [&str; 8] = [
        "WEIGHT_LOSS",
        "MUSCLE_GAIN",
        "MAINTENANCE",
        "HEART_HEALTH",
        "SLEEP_IMPROVEMENT",
        "STRESS_REDUCTION",
        "DIABETES_CONTROL",
        "SOMETHING_ELSE",
    ];

    #[test]
    fn test_always_within_bounds() {
        let values = [
            -1e12, -250.0, -1.0, -1e-9, 0.0, 1e-9, 0.5, 1.0, 50.0, 65.0, 100.0, 120.0, 1e12,
            f64::MAX, f64::MIN, f64::INFINITY, f64::NAN,
        ];
        for tag in TAGS {
            for current in values {
                for target in values {
                    let p = compute_progress(current, target, tag);
                    assert!(
                        (0.0..=100.0).contains(&p),
                        "{tag}: current={current} target={target} -> {p}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_zero_target_is_zero() {
        for tag in TAGS {
            for x in [0.0, 1.0, 80.0, -5.0] {
                assert_eq!(compute_progress(x, 0.0, tag), 0.0, "{tag}");
            }
        }
    }

    #[test]
    fn test_zero_current_on_lower_is_better() {
        for x in [0.1, 1.0, 65.0, 500.0] {
            assert_eq!(compute_progress(0.0, x, "WEIGHT_LOSS"), 0.0);
            assert_eq!(compute_progress(0.0, x, "STRESS_REDUCTION"), 0.0);
        }
    }

    #[test]
    fn test_reaching_target_on_higher_is_better() {
        assert_eq!(compute_progress(50.0, 50.0, "MUSCLE_GAIN"), 100.0);
        assert_eq!(compute_progress(40.0, 80.0, "SLEEP_IMPROVEMENT"), 50.0);
        assert_eq!(compute_progress(200.0, 80.0, "SLEEP_IMPROVEMENT"), 100.0);
    }

    #[test]
    fn test_ceiling_goals() {
        assert_eq!(compute_progress(120.0, 100.0, "HEART_HEALTH"), 0.0);
        assert!((compute_progress(80.0, 100.0, "HEART_HEALTH") - 20.0).abs() < 1e-9);
        assert!((compute_progress(90.0, 120.0, "DIABETES_CONTROL") - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_lower_is_better_is_self_relative() {
        // Sitting exactly on target reads as no progress.
        assert_eq!(compute_progress(65.0, 65.0, "WEIGHT_LOSS"), 0.0);
        assert_eq!(compute_progress(60.0, 65.0, "WEIGHT_LOSS"), 0.0);
        assert!((compute_progress(80.0, 60.0, "STRESS_REDUCTION") - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_maintenance_and_unknown_use_higher_is_better() {
        assert_eq!(direction_for(&GoalType::Maintenance), Direction::HigherIsBetter);
        assert_eq!(compute_progress(70.0, 70.0, "MAINTENANCE"), 100.0);
        assert_eq!(compute_progress(35.0, 70.0, "NOT_A_GOAL"), 50.0);
    }

    #[test]
    fn test_weight_loss_scenario() {
        let current = vitals_core::normalize_unit("weight", 150.0, Some("lb")).value;
        assert!((current - 68.04).abs() < 0.01);
        let p = compute_progress(current, 65.0, "WEIGHT_LOSS");
        assert!((p - 4.47).abs() < 0.01, "{p}");
    }
}
