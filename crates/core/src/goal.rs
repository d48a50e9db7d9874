//! Goal model - a target a subject wants to reach.

use serde::{Deserialize, Serialize};
use crate::id::{GoalId, SubjectId};
use crate::Time;

/// Goal type. Drives which measurements count as evidence and which progress
/// formula applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalType {
    /// Lose weight
    WeightLoss,
    /// Gain muscle mass
    MuscleGain,
    /// Keep weight stable
    Maintenance,
    /// Lower blood pressure
    HeartHealth,
    /// Sleep better
    SleepImprovement,
    /// Reduce stress
    StressReduction,
    /// Keep glucose under control
    DiabetesControl,
    /// Any tag outside the fixed set
    Other(String),
}

impl GoalType {
    /// All known goal types.
    pub const ALL: [GoalType; 7] = [
        GoalType::WeightLoss,
        GoalType::MuscleGain,
        GoalType::Maintenance,
        GoalType::HeartHealth,
        GoalType::SleepImprovement,
        GoalType::StressReduction,
        GoalType::DiabetesControl,
    ];

    /// Wire tag, e.g. `WEIGHT_LOSS`.
    pub fn as_str(&self) -> &str {
        match self {
            GoalType::WeightLoss => "WEIGHT_LOSS",
            GoalType::MuscleGain => "MUSCLE_GAIN",
            GoalType::Maintenance => "MAINTENANCE",
            GoalType::HeartHealth => "HEART_HEALTH",
            GoalType::SleepImprovement => "SLEEP_IMPROVEMENT",
            GoalType::StressReduction => "STRESS_REDUCTION",
            GoalType::DiabetesControl => "DIABETES_CONTROL",
            GoalType::Other(tag) => tag,
        }
    }

    /// Whether this is one of the fixed goal types.
    pub fn is_known(&self) -> bool {
        !matches!(self, GoalType::Other(_))
    }
}

impl From<&str> for GoalType {
    fn from(tag: &str) -> Self {
        match tag {
            "WEIGHT_LOSS" => GoalType::WeightLoss,
            "MUSCLE_GAIN" => GoalType::MuscleGain,
            "MAINTENANCE" => GoalType::Maintenance,
            "HEART_HEALTH" => GoalType::HeartHealth,
            "SLEEP_IMPROVEMENT" => GoalType::SleepImprovement,
            "STRESS_REDUCTION" => GoalType::StressReduction,
            "DIABETES_CONTROL" => GoalType::DiabetesControl,
            other => GoalType::Other(other.to_string()),
        }
    }
}

impl From<String> for GoalType {
    fn from(tag: String) -> Self {
        GoalType::from(tag.as_str())
    }
}

impl From<GoalType> for String {
    fn from(t: GoalType) -> Self {
        match t {
            GoalType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Goal lifecycle status. Set by callers, never derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Not started
    #[default]
    Pending,
    /// Being worked on
    InProgress,
    /// Reached
    Completed,
    /// Abandoned or missed
    Failed,
}

impl GoalStatus {
    /// Wire tag, e.g. `in_progress`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Pending => "pending",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
            GoalStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown goal status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for GoalStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(GoalStatus::Pending),
            "in_progress" => Ok(GoalStatus::InProgress),
            "completed" => Ok(GoalStatus::Completed),
            "failed" => Ok(GoalStatus::Failed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A goal. `current_value` and `progress` are derived views, refreshed on
/// every read from the measurement set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: GoalId,

    /// Owning subject
    pub subject_id: SubjectId,

    /// Goal type
    #[serde(rename = "type")]
    pub goal_type: GoalType,

    /// Free text
    pub description: String,

    /// Start of the measurement window
    pub start_date: Time,

    /// End of the measurement window
    pub end_date: Time,

    /// Target, in the canonical unit of the primary measurement type
    pub target_value: f64,

    /// Last computed current value
    #[serde(default)]
    pub current_value: f64,

    /// Last computed progress (0-100)
    #[serde(default)]
    pub progress: f64,

    /// Goal status
    #[serde(default)]
    pub status: GoalStatus,

    /// Hidden from active listings once archived
    #[serde(default)]
    pub archived: bool,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

impl Goal {
    /// Create a pending goal.
    pub fn new(
        subject_id: SubjectId,
        goal_type: GoalType,
        description: impl Into<String>,
        start_date: Time,
        end_date: Time,
        target_value: f64,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: GoalId::new(),
            subject_id,
            goal_type,
            description: description.into(),
            start_date,
            end_date,
            target_value,
            current_value: 0.0,
            progress: 0.0,
            status: GoalStatus::Pending,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `t` lies in `[start_date, end_date]`.
    pub fn in_window(&self, t: Time) -> bool {
        t >= self.start_date && t <= self.end_date
    }

    /// Apply a partial update. Touches `updated_at` only when something changed.
    pub fn apply(&mut self, update: GoalUpdate) {
        let GoalUpdate {
            goal_type,
            description,
            start_date,
            end_date,
            target_value,
            status,
            archived,
        } = update;

        let mut changed = false;
        if let Some(v) = goal_type {
            self.goal_type = v;
            changed = true;
        }
        if let Some(v) = description {
            self.description = v;
            changed = true;
        }
        if let Some(v) = start_date {
            self.start_date = v;
            changed = true;
        }
        if let Some(v) = end_date {
            self.end_date = v;
            changed = true;
        }
        if let Some(v) = target_value {
            self.target_value = v;
            changed = true;
        }
        if let Some(v) = status {
            self.status = v;
            changed = true;
        }
        if let Some(v) = archived {
            self.archived = v;
            changed = true;
        }
        if changed {
            self.updated_at = chrono::Utc::now();
        }
    }
}

/// Partial replacement of goal fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalUpdate {
    /// New type
    #[serde(rename = "type")]
    pub goal_type: Option<GoalType>,
    /// New description
    pub description: Option<String>,
    /// New window start
    pub start_date: Option<Time>,
    /// New window end
    pub end_date: Option<Time>,
    /// New target
    pub target_value: Option<f64>,
    /// New status
    pub status: Option<GoalStatus>,
    /// Archive flag
    pub archived: Option<bool>,
}
