//! Archived goal snapshots and body profile.

use std::ops::RangeInclusive;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::goal::{Goal, GoalStatus, GoalType};
use crate::id::{GoalId, HistoryId, SubjectId};
use crate::Time;

/// A goal as it stood when it was archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalHistory {
    /// Unique identifier
    pub id: HistoryId,

    /// Owning subject
    pub subject_id: SubjectId,

    /// Type of the archived goal
    pub goal_type: GoalType,

    /// Description of the archived goal
    pub description: String,

    /// Target of the archived goal
    pub target_value: f64,

    /// Progress at archive time
    pub progress: f64,

    /// Status at archive time
    pub status: GoalStatus,

    /// Goal this snapshot was taken from
    pub source_goal_id: Option<GoalId>,

    /// When archived
    pub created_at: Time,
}

impl GoalHistory {
    /// Snapshot `goal` with the given progress.
    pub fn from_goal(goal: &Goal, progress: f64) -> Self {
        Self {
            id: HistoryId::new(),
            subject_id: goal.subject_id.clone(),
            goal_type: goal.goal_type.clone(),
            description: goal.description.clone(),
            target_value: goal.target_value,
            progress,
            status: goal.status,
            source_goal_id: Some(goal.id),
            created_at: chrono::Utc::now(),
        }
    }
}

/// Accepted weight for a directly edited profile, in kg.
pub const PROFILE_WEIGHT_KG: RangeInclusive<f64> = 20.0..=500.0;

/// Accepted height for a directly edited profile, in cm.
pub const PROFILE_HEIGHT_CM: RangeInclusive<f64> = 50.0..=300.0;

/// Biological sex recorded on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male (default)
    #[default]
    Male,
    /// Female
    Female,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

/// Error returned when parsing an unknown sex.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sex '{0}', expected male or female")]
pub struct ParseSexError(pub String);

impl std::str::FromStr for Sex {
    type Err = ParseSexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => Err(ParseSexError(s.to_string())),
        }
    }
}

/// Body profile of a subject, weight and height in canonical units.
///
/// Weight and height mirror the latest logged measurement of that type and
/// can also be edited directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyProfile {
    /// Owning subject
    pub subject_id: SubjectId,

    /// Date of birth
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,

    /// Sex
    #[serde(default)]
    pub sex: Sex,

    /// Latest weight in kg
    pub weight_kg: Option<f64>,

    /// Latest height in cm
    pub height_cm: Option<f64>,

    /// Last updated
    pub updated_at: Time,
}

impl BodyProfile {
    /// Empty profile for `subject_id`.
    pub fn new(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            birth_date: None,
            sex: Sex::default(),
            weight_kg: None,
            height_cm: None,
            updated_at: chrono::Utc::now(),
        }
    }

    /// Apply the fields set in `update`.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(birth_date) = update.birth_date {
            self.birth_date = Some(birth_date);
        }
        if let Some(sex) = update.sex {
            self.sex = sex;
        }
        if let Some(weight) = update.weight_kg {
            self.weight_kg = Some(weight);
        }
        if let Some(height) = update.height_cm {
            self.height_cm = Some(height);
        }
        self.updated_at = chrono::Utc::now();
    }
}

/// Partial edit of a body profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New date of birth
    pub birth_date: Option<NaiveDate>,
    /// New sex
    pub sex: Option<Sex>,
    /// New weight in kg
    pub weight_kg: Option<f64>,
    /// New height in cm
    pub height_cm: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_unset_fields() {
        let mut profile = BodyProfile::new(SubjectId::new("s"));
        profile.weight_kg = Some(70.0);

        profile.apply(ProfileUpdate {
            sex: Some(Sex::Female),
            height_cm: Some(165.0),
            ..Default::default()
        });

        assert_eq!(profile.sex, Sex::Female);
        assert_eq!(profile.weight_kg, Some(70.0));
        assert_eq!(profile.height_cm, Some(165.0));
        assert_eq!(profile.birth_date, None);
    }

    #[test]
    fn test_parse_sex() {
        assert_eq!("Female".parse::<Sex>().unwrap(), Sex::Female);
        assert!("other".parse::<Sex>().is_err());
    }

    #[test]
    fn test_legacy_profile_defaults_sex() {
        let json = r#"{"subject_id":"s","weight_kg":70.0,"height_cm":null,"updated_at":"2026-01-01T00:00:00Z"}"#;
        let profile: BodyProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.sex, Sex::Male);
        assert_eq!(profile.birth_date, None);
    }
}
