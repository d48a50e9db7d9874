//! Storage trait abstraction.

use async_trait::async_trait;
use vitals_core::{
    BodyProfile, Goal, GoalHistory, GoalId, HistoryId, Measurement, MeasurementFilter,
    MeasurementId, SubjectId,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage abstraction for Vitals data.
///
/// Every read is scoped to a subject: a record owned by another subject is
/// indistinguishable from a missing one.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Measurement operations ===

    /// Save a measurement (create or update).
    async fn save_measurement(&self, measurement: &Measurement) -> Result<()>;

    /// Load a measurement by ID.
    async fn load_measurement(
        &self,
        subject: &SubjectId,
        id: MeasurementId,
    ) -> Result<Option<Measurement>>;

    /// List a subject's measurements matching the filter.
    ///
    /// Results are sorted by timestamp, oldest first unless
    /// `filter.newest_first` is set.
    async fn list_measurements(
        &self,
        subject: &SubjectId,
        filter: &MeasurementFilter,
    ) -> Result<Vec<Measurement>>;

    /// Delete a measurement, returning it if it existed.
    async fn delete_measurement(
        &self,
        subject: &SubjectId,
        id: MeasurementId,
    ) -> Result<Option<Measurement>>;

    // === Goal operations ===

    /// Save a goal (create or update).
    async fn save_goal(&self, goal: &Goal) -> Result<()>;

    /// Load a goal by ID.
    async fn load_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Option<Goal>>;

    /// List a subject's goals, newest first.
    async fn list_goals(&self, subject: &SubjectId) -> Result<Vec<Goal>>;

    /// Delete a goal, returning it if it existed.
    async fn delete_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Option<Goal>>;

    // === Goal history operations ===

    /// Save an archived goal snapshot.
    async fn save_history(&self, entry: &GoalHistory) -> Result<()>;

    /// Load a snapshot by ID.
    async fn load_history(&self, subject: &SubjectId, id: HistoryId) -> Result<Option<GoalHistory>>;

    /// List a subject's snapshots, newest first.
    async fn list_history(&self, subject: &SubjectId) -> Result<Vec<GoalHistory>>;

    /// Delete a snapshot, returning it if it existed.
    async fn delete_history(&self, subject: &SubjectId, id: HistoryId) -> Result<Option<GoalHistory>>;

    /// Delete every snapshot of a subject, returning how many were removed.
    async fn clear_history(&self, subject: &SubjectId) -> Result<usize>;

    // === Profile operations ===

    /// Save a body profile.
    async fn save_profile(&self, profile: &BodyProfile) -> Result<()>;

    /// Load a subject's body profile.
    async fn load_profile(&self, subject: &SubjectId) -> Result<Option<BodyProfile>>;
}

/// Sort goals newest first.
pub(crate) fn sort_goals(goals: &mut [Goal]) {
    goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Sort snapshots newest first.
pub(crate) fn sort_history(entries: &mut [GoalHistory]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
