//! Goal type to measurement type mapping.

use vitals_core::GoalType;

const WEIGHT: &[&str] = &["weight"];
const BODY: &[&str] = &["weight", "height"];
const BLOOD_PRESSURE: &[&str] = &["blood_pressure"];
const SLEEP: &[&str] = &["sleep_score", "sleep_duration", "sleep_quality", "sleep_efficiency"];
const STRESS: &[&str] = &["stress_score", "stress_health", "stress_level"];
const GLUCOSE: &[&str] = &["glucose"];

/// Measurement types that count as evidence for `goal_type`.
///
/// The first entry is the primary type. Unknown goal types map to nothing.
pub fn measure_types(goal_type: &GoalType) -> &'static [&'static str] {
    match goal_type {
        GoalType::WeightLoss | GoalType::MuscleGain => WEIGHT,
        GoalType::Maintenance => BODY,
        GoalType::HeartHealth => BLOOD_PRESSURE,
        GoalType::SleepImprovement => SLEEP,
        GoalType::StressReduction => STRESS,
        GoalType::DiabetesControl => GLUCOSE,
        GoalType::Other(_) => &[],
    }
}

/// Measurement type driving the progress math for `goal_type`, or `""`.
pub fn primary_measure_type(goal_type: &GoalType) -> &'static str {
    measure_types(goal_type).first().copied().unwrap_or("")
}

/// [`measure_types`] keyed by the raw goal tag.
pub fn measure_types_for_goal_type(goal_type: &str) -> &'static [&'static str] {
    measure_types(&GoalType::from(goal_type))
}

/// [`primary_measure_type`] keyed by the raw goal tag.
pub fn primary_measure_type_for_goal(goal_type: &str) -> &'static str {
    primary_measure_type(&GoalType::from(goal_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_improvement_types_in_order() {
        assert_eq!(
            measure_types_for_goal_type("SLEEP_IMPROVEMENT"),
            ["sleep_score", "sleep_duration", "sleep_quality", "sleep_efficiency"]
        );
        assert_eq!(primary_measure_type_for_goal("SLEEP_IMPROVEMENT"), "sleep_score");
    }

    #[test]
    fn test_unknown_goal_type_maps_to_nothing() {
        assert!(measure_types_for_goal_type("UNKNOWN").is_empty());
        assert_eq!(primary_measure_type_for_goal("UNKNOWN"), "");
    }

    #[test]
    fn test_primary_types() {
        let expected = [
            (GoalType::WeightLoss, "weight"),
            (GoalType::MuscleGain, "weight"),
            (GoalType::Maintenance, "weight"),
            (GoalType::HeartHealth, "blood_pressure"),
            (GoalType::SleepImprovement, "sleep_score"),
            (GoalType::StressReduction, "stress_score"),
            (GoalType::DiabetesControl, "glucose"),
        ];
        for (goal_type, primary) in expected {
            assert_eq!(primary_measure_type(&goal_type), primary, "{goal_type}");
        }
        assert_eq!(measure_types(&GoalType::Maintenance), ["weight", "height"]);
        assert_eq!(
            measure_types(&GoalType::StressReduction),
            ["stress_score", "stress_health", "stress_level"]
        );
    }
}
