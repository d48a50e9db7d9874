//! Goal progress tracking.

use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use vitals_core::{chronological, Goal, GoalId, Measurement, MeasurementFilter, SubjectId};
use vitals_storage::{Result, Storage};

use crate::calculator::progress_for;
use crate::mapping::{measure_types, primary_measure_type};

/// Progress view of a goal, derived from its in-window measurements.
#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    /// Goal this view belongs to
    pub goal_id: GoalId,

    /// Primary measurement type for the goal (empty for unknown types)
    pub primary_type: &'static str,

    /// Latest in-window value, 0 when there is none
    pub current_value: f64,

    /// Percentage in [0, 100]
    pub progress: f64,

    /// The measurement `current_value` was taken from
    pub latest: Option<Measurement>,

    /// All relevant in-window measurements, oldest first
    pub measurements: Vec<Measurement>,
}

/// Evaluate `goal` against a set of measurements.
///
/// Only measurements owned by the goal's subject, of a type relevant to the
/// goal and timestamped inside `[start_date, end_date]` are considered. The
/// most recent of those supplies the current value.
pub fn evaluate_goal(goal: &Goal, measurements: &[Measurement]) -> GoalProgress {
    let kinds = measure_types(&goal.goal_type);

    let mut relevant: Vec<Measurement> = measurements
        .iter()
        .filter(|m| m.subject_id == goal.subject_id)
        .filter(|m| kinds.iter().any(|k| *k == m.kind))
        .filter(|m| goal.in_window(m.timestamp))
        .cloned()
        .collect();
    relevant.sort_by(chronological);

    let latest = relevant.last().cloned();
    let current_value = latest.as_ref().map_or(0.0, |m| m.value);
    let progress = progress_for(current_value, goal.target_value, &goal.goal_type);

    debug!(
        "Goal {} ({}): {} relevant measurements, current={}, progress={:.2}",
        goal.id,
        goal.goal_type,
        relevant.len(),
        current_value,
        progress
    );

    GoalProgress {
        goal_id: goal.id,
        primary_type: primary_measure_type(&goal.goal_type),
        current_value,
        progress,
        latest,
        measurements: relevant,
    }
}

/// A goal with its derived fields refreshed.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedGoal {
    /// Goal with `current_value` and `progress` filled in
    pub goal: Goal,

    /// Full progress view
    pub progress: GoalProgress,
}

impl TrackedGoal {
    fn new(mut goal: Goal, progress: GoalProgress) -> Self {
        goal.current_value = progress.current_value;
        goal.progress = progress.progress;
        Self { goal, progress }
    }
}

/// A snapshot of a subject's progress at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Progress by goal ID, newest goal first
    pub goal_progress: Vec<(GoalId, f64)>,
}

/// Progress tracking service.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Progress of one goal, `None` if the subject has no such goal.
    async fn goal_progress(&self, subject: &SubjectId, goal_id: GoalId) -> Result<Option<TrackedGoal>>;

    /// Progress of every non-archived goal of a subject, newest first.
    async fn subject_progress(&self, subject: &SubjectId) -> Result<Vec<TrackedGoal>>;

    /// Take a progress snapshot.
    async fn snapshot(&self, subject: &SubjectId) -> Result<ProgressSnapshot>;
}

/// Progress tracker reading goals and measurements from storage.
pub struct BasicProgressTracker<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> BasicProgressTracker<S> {
    /// Create a new progress tracker.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Load the goal's relevant in-window measurements and evaluate it.
    pub async fn track(&self, goal: Goal) -> Result<TrackedGoal> {
        let filter = MeasurementFilter {
            kinds: Some(measure_types(&goal.goal_type).iter().map(|k| k.to_string()).collect()),
            from: Some(goal.start_date),
            to: Some(goal.end_date),
            ..Default::default()
        };
        let measurements = self.storage.list_measurements(&goal.subject_id, &filter).await?;
        let progress = evaluate_goal(&goal, &measurements);
        Ok(TrackedGoal::new(goal, progress))
    }
}

#[async_trait]
impl<S: Storage + 'static> ProgressTracker for BasicProgressTracker<S> {
    async fn goal_progress(&self, subject: &SubjectId, goal_id: GoalId) -> Result<Option<TrackedGoal>> {
        match self.storage.load_goal(subject, goal_id).await? {
            Some(goal) => Ok(Some(self.track(goal).await?)),
            None => Ok(None),
        }
    }

    async fn subject_progress(&self, subject: &SubjectId) -> Result<Vec<TrackedGoal>> {
        let goals = self.storage.list_goals(subject).await?;
        let mut tracked = Vec::with_capacity(goals.len());
        for goal in goals.into_iter().filter(|g| !g.archived) {
            tracked.push(self.track(goal).await?);
        }
        Ok(tracked)
    }

    async fn snapshot(&self, subject: &SubjectId) -> Result<ProgressSnapshot> {
        let goal_progress = self
            .subject_progress(subject)
            .await?
            .into_iter()
            .map(|t| (t.goal.id, t.progress.progress))
            .collect();

        Ok(ProgressSnapshot {
            timestamp: Utc::now(),
            goal_progress,
        })
    }
}
