//! Record management service.

use std::ops::RangeInclusive;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vitals_core::{
    canonical_unit, normalize_unit, BodyProfile, Goal, GoalHistory, GoalId, GoalType, GoalUpdate,
    HistoryId, Measurement, MeasurementFilter, MeasurementId, ProfileUpdate, SubjectId, Time,
    PROFILE_HEIGHT_CM, PROFILE_WEIGHT_KG,
};
use vitals_progress::BasicProgressTracker;
use vitals_storage::Storage;

use crate::error::{RecordError, Result};

/// Page size used when listing measurements without an explicit limit.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Length of the window given to a goal restored from history.
pub const RESTORED_GOAL_DAYS: i64 = 7;

/// Input for logging a measurement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMeasurement {
    /// Measurement type
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw value, in `unit`
    pub value: f64,
    /// Raw unit; canonical when absent
    pub unit: Option<String>,
    /// Observation time; now when absent
    pub timestamp: Option<Time>,
    /// Free text
    pub notes: Option<String>,
    /// Opaque payload
    pub metadata: Option<serde_json::Value>,
}

/// Partial replacement of measurement fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementUpdate {
    /// New type
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// New raw value
    pub value: Option<f64>,
    /// Unit of the new value, or of the stored value when no value is given
    pub unit: Option<String>,
    /// New observation time
    pub timestamp: Option<Time>,
    /// New notes
    pub notes: Option<String>,
    /// New payload
    pub metadata: Option<serde_json::Value>,
}

/// Input for creating a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    /// Goal type
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    /// Free text, required
    pub description: String,
    /// Window start
    pub start_date: Time,
    /// Window end
    pub end_date: Time,
    /// Target in the primary type's canonical unit
    pub target_value: f64,
}

/// Measurement and goal management.
#[async_trait]
pub trait RecordManager: Send + Sync {
    /// Normalize and store a new measurement.
    async fn record_measurement(&self, subject: &SubjectId, input: NewMeasurement) -> Result<Measurement>;

    /// Apply a partial update to a measurement.
    async fn update_measurement(
        &self,
        subject: &SubjectId,
        id: MeasurementId,
        update: MeasurementUpdate,
    ) -> Result<Measurement>;

    /// Delete a measurement.
    async fn delete_measurement(&self, subject: &SubjectId, id: MeasurementId) -> Result<Measurement>;

    /// Most recent measurements, optionally of one type.
    async fn list_measurements(
        &self,
        subject: &SubjectId,
        kind: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Measurement>>;

    /// Create a pending goal.
    async fn create_goal(&self, subject: &SubjectId, input: NewGoal) -> Result<Goal>;

    /// Apply a partial update to a goal.
    async fn update_goal(&self, subject: &SubjectId, id: GoalId, update: GoalUpdate) -> Result<Goal>;

    /// Delete a goal.
    async fn delete_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Goal>;

    /// Snapshot a goal into history and hide it from active listings.
    async fn archive_goal(&self, subject: &SubjectId, id: GoalId) -> Result<GoalHistory>;

    /// Recreate a pending goal from a history entry and drop the entry.
    async fn restore_goal(&self, subject: &SubjectId, history_id: HistoryId) -> Result<Goal>;

    /// Archived goals, newest first.
    async fn list_history(&self, subject: &SubjectId) -> Result<Vec<GoalHistory>>;

    /// Drop every archived goal of the subject, returning how many were removed.
    async fn clear_history(&self, subject: &SubjectId) -> Result<usize>;

    /// The subject's body profile, if one was ever written.
    async fn profile(&self, subject: &SubjectId) -> Result<Option<BodyProfile>>;

    /// Edit profile fields directly, creating the profile if needed.
    async fn update_profile(&self, subject: &SubjectId, update: ProfileUpdate) -> Result<BodyProfile>;
}

/// Body profile field a measurement type feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileField {
    Weight,
    Height,
}

impl ProfileField {
    fn for_kind(kind: &str) -> Option<Self> {
        match kind.to_lowercase().as_str() {
            "weight" => Some(ProfileField::Weight),
            "height" => Some(ProfileField::Height),
            _ => None,
        }
    }

    fn set(self, profile: &mut BodyProfile, value: Option<f64>) {
        match self {
            ProfileField::Weight => profile.weight_kg = value,
            ProfileField::Height => profile.height_cm = value,
        }
    }
}

/// Record manager over a storage backend.
pub struct BasicRecordManager<S: Storage> {
    storage: Arc<S>,
    tracker: BasicProgressTracker<S>,
}

impl<S: Storage> BasicRecordManager<S> {
    /// Create a new record manager.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            tracker: BasicProgressTracker::new(Arc::clone(&storage)),
            storage,
        }
    }

    /// Progress tracker sharing this manager's storage.
    pub fn tracker(&self) -> &BasicProgressTracker<S> {
        &self.tracker
    }

    async fn load_measurement(&self, subject: &SubjectId, id: MeasurementId) -> Result<Measurement> {
        self.storage
            .load_measurement(subject, id)
            .await?
            .ok_or_else(|| RecordError::not_found("Measurement", id))
    }

    async fn load_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Goal> {
        self.storage
            .load_goal(subject, id)
            .await?
            .ok_or_else(|| RecordError::not_found("Goal", id))
    }

    /// Write `value` into one profile field, creating the profile if needed.
    async fn set_profile(&self, subject: &SubjectId, field: ProfileField, value: Option<f64>) -> Result<()> {
        let mut profile = match self.storage.load_profile(subject).await? {
            Some(p) => p,
            None if value.is_none() => return Ok(()),
            None => BodyProfile::new(subject.clone()),
        };
        field.set(&mut profile, value);
        profile.updated_at = chrono::Utc::now();
        self.storage.save_profile(&profile).await?;
        Ok(())
    }

    /// Mirror a freshly written weight/height into the profile.
    ///
    /// Failures are logged; they never fail the measurement write.
    async fn sync_profile_after_write(&self, m: &Measurement) {
        let Some(field) = ProfileField::for_kind(&m.kind) else {
            return;
        };
        if let Err(e) = self.set_profile(&m.subject_id, field, Some(m.value)).await {
            warn!("Failed updating profile for {} after {} write: {}", m.subject_id, m.kind, e);
        }
    }

    /// Fall back to the latest remaining measurement of `kind`, or clear the
    /// profile field. Used when a weight/height measurement goes away.
    async fn resync_profile(&self, subject: &SubjectId, kind: &str) {
        let Some(field) = ProfileField::for_kind(kind) else {
            return;
        };
        let filter = MeasurementFilter {
            kinds: Some(vec![kind.to_string()]),
            newest_first: true,
            limit: Some(1),
            ..Default::default()
        };
        let result: Result<()> = async {
            let previous = self.storage.list_measurements(subject, &filter).await?;
            let value = previous.first().map(|m| m.value);
            self.set_profile(subject, field, value).await
        }
        .await;
        if let Err(e) = result {
            warn!("Failed recalculating profile for {} after removing {}: {}", subject, kind, e);
        }
    }
}

fn validate_kind(kind: &str) -> Result<()> {
    if kind.trim().is_empty() {
        return Err(RecordError::Validation("measurement type is required".into()));
    }
    Ok(())
}

fn validate_value(what: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(RecordError::Validation(format!("{} must be a finite number", what)));
    }
    Ok(())
}

fn validate_range(what: &str, value: Option<f64>, range: &RangeInclusive<f64>) -> Result<()> {
    match value {
        Some(v) if !range.contains(&v) => Err(RecordError::Validation(format!(
            "{} must be between {} and {}",
            what,
            range.start(),
            range.end()
        ))),
        _ => Ok(()),
    }
}

/// Carry the stored value over to a new type, converting from its current unit.
///
/// A unit the new type cannot convert from is rejected rather than stored
/// under the wrong label.
fn retype(m: &mut Measurement) -> Result<()> {
    let normalized = normalize_unit(&m.kind, m.value, Some(&m.unit));
    if let Some(canonical) = canonical_unit(&m.kind) {
        if normalized.unit != canonical {
            return Err(RecordError::Validation(format!(
                "unit '{}' cannot be converted for type '{}'; give a new value or unit",
                m.unit, m.kind
            )));
        }
    }
    m.value = normalized.value;
    m.unit = normalized.unit;
    Ok(())
}

#[async_trait]
impl<S: Storage + 'static> RecordManager for BasicRecordManager<S> {
    async fn record_measurement(&self, subject: &SubjectId, input: NewMeasurement) -> Result<Measurement> {
        validate_kind(&input.kind)?;
        validate_value("value", input.value)?;

        let mut m = Measurement::new(subject.clone(), input.kind, input.value, input.unit.as_deref());
        if let Some(ts) = input.timestamp {
            m = m.with_timestamp(ts);
        }
        if let Some(notes) = input.notes {
            m = m.with_notes(notes);
        }
        if let Some(metadata) = input.metadata {
            m = m.with_metadata(metadata);
        }

        self.storage.save_measurement(&m).await?;
        debug!("Recorded {} {} {} for {}", m.kind, m.value, m.unit, subject);

        self.sync_profile_after_write(&m).await;
        Ok(m)
    }

    async fn update_measurement(
        &self,
        subject: &SubjectId,
        id: MeasurementId,
        update: MeasurementUpdate,
    ) -> Result<Measurement> {
        let mut m = self.load_measurement(subject, id).await?;
        let previous_kind = m.kind.clone();

        if let Some(kind) = update.kind {
            validate_kind(&kind)?;
            m.kind = kind;
        }
        let retyped = m.kind != previous_kind;

        match (update.value, update.unit.as_deref()) {
            (Some(value), unit) => {
                validate_value("value", value)?;
                m.set_value(value, unit);
            }
            (None, Some(unit)) => {
                let normalized = normalize_unit(&m.kind, m.value, Some(unit));
                m.value = normalized.value;
                m.unit = normalized.unit;
            }
            (None, None) if retyped => retype(&mut m)?,
            (None, None) => {}
        }

        if let Some(ts) = update.timestamp {
            m.timestamp = ts;
        }
        if let Some(notes) = update.notes {
            m.notes = notes;
        }
        if let Some(metadata) = update.metadata {
            m.metadata = metadata;
        }
        m.updated_at = chrono::Utc::now();

        self.storage.save_measurement(&m).await?;
        debug!("Updated measurement {} for {}", m.id, subject);

        let old_field = ProfileField::for_kind(&previous_kind);
        if old_field.is_some() && old_field != ProfileField::for_kind(&m.kind) {
            self.resync_profile(subject, &previous_kind).await;
        }
        self.sync_profile_after_write(&m).await;
        Ok(m)
    }

    async fn delete_measurement(&self, subject: &SubjectId, id: MeasurementId) -> Result<Measurement> {
        let deleted = self
            .storage
            .delete_measurement(subject, id)
            .await?
            .ok_or_else(|| RecordError::not_found("Measurement", id))?;
        debug!("Deleted measurement {} for {}", id, subject);

        self.resync_profile(subject, &deleted.kind).await;
        Ok(deleted)
    }

    async fn list_measurements(
        &self,
        subject: &SubjectId,
        kind: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Measurement>> {
        let filter = MeasurementFilter {
            kinds: kind.map(|k| vec![k.to_string()]),
            newest_first: true,
            limit: Some(limit.unwrap_or(DEFAULT_LIST_LIMIT)),
            ..Default::default()
        };
        Ok(self.storage.list_measurements(subject, &filter).await?)
    }

    async fn create_goal(&self, subject: &SubjectId, input: NewGoal) -> Result<Goal> {
        if input.description.trim().is_empty() {
            return Err(RecordError::Validation("goal description is required".into()));
        }
        validate_value("target value", input.target_value)?;
        if !input.goal_type.is_known() {
            warn!(
                "Goal type {} has no measurement types; progress stays at 0 until retyped",
                input.goal_type
            );
        }

        let goal = Goal::new(
            subject.clone(),
            input.goal_type,
            input.description,
            input.start_date,
            input.end_date,
            input.target_value,
        );
        self.storage.save_goal(&goal).await?;
        debug!("Created goal {} ({}) for {}", goal.id, goal.goal_type, subject);
        Ok(goal)
    }

    async fn update_goal(&self, subject: &SubjectId, id: GoalId, update: GoalUpdate) -> Result<Goal> {
        if let Some(target) = update.target_value {
            validate_value("target value", target)?;
        }
        let mut goal = self.load_goal(subject, id).await?;
        goal.apply(update);
        self.storage.save_goal(&goal).await?;
        debug!("Updated goal {} for {}", goal.id, subject);
        Ok(goal)
    }

    async fn delete_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Goal> {
        let deleted = self
            .storage
            .delete_goal(subject, id)
            .await?
            .ok_or_else(|| RecordError::not_found("Goal", id))?;
        debug!("Deleted goal {} for {}", id, subject);
        Ok(deleted)
    }

    async fn archive_goal(&self, subject: &SubjectId, id: GoalId) -> Result<GoalHistory> {
        let goal = self.load_goal(subject, id).await?;
        let tracked = self.tracker.track(goal).await?;

        let entry = GoalHistory::from_goal(&tracked.goal, tracked.progress.progress);
        self.storage.save_history(&entry).await?;

        let mut goal = tracked.goal;
        goal.apply(GoalUpdate {
            archived: Some(true),
            ..Default::default()
        });
        self.storage.save_goal(&goal).await?;

        debug!("Archived goal {} as {} ({:.1}%)", goal.id, entry.id, entry.progress);
        Ok(entry)
    }

    async fn restore_goal(&self, subject: &SubjectId, history_id: HistoryId) -> Result<Goal> {
        let entry = self
            .storage
            .load_history(subject, history_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Archived goal", history_id))?;

        let now = chrono::Utc::now();
        let goal = Goal::new(
            subject.clone(),
            entry.goal_type,
            entry.description,
            now,
            now + Duration::days(RESTORED_GOAL_DAYS),
            entry.target_value,
        );
        self.storage.save_goal(&goal).await?;
        self.storage.delete_history(subject, history_id).await?;

        debug!("Restored history {} as goal {}", history_id, goal.id);
        Ok(goal)
    }

    async fn list_history(&self, subject: &SubjectId) -> Result<Vec<GoalHistory>> {
        Ok(self.storage.list_history(subject).await?)
    }

    async fn clear_history(&self, subject: &SubjectId) -> Result<usize> {
        let removed = self.storage.clear_history(subject).await?;
        debug!("Cleared {} archived goals for {}", removed, subject);
        Ok(removed)
    }

    async fn profile(&self, subject: &SubjectId) -> Result<Option<BodyProfile>> {
        Ok(self.storage.load_profile(subject).await?)
    }

    async fn update_profile(&self, subject: &SubjectId, update: ProfileUpdate) -> Result<BodyProfile> {
        validate_range("weight (kg)", update.weight_kg, &PROFILE_WEIGHT_KG)?;
        validate_range("height (cm)", update.height_cm, &PROFILE_HEIGHT_CM)?;

        let mut profile = self
            .storage
            .load_profile(subject)
            .await?
            .unwrap_or_else(|| BodyProfile::new(subject.clone()));
        profile.apply(update);
        self.storage.save_profile(&profile).await?;
        debug!("Updated profile for {}", subject);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vitals_core::{GoalStatus, Sex};
    use vitals_progress::ProgressTracker;
    use vitals_storage::MemoryStorage;

    fn subject() -> SubjectId {
        SubjectId::new("subject-1")
    }

    fn manager() -> BasicRecordManager<MemoryStorage> {
        BasicRecordManager::new(Arc::new(MemoryStorage::new()))
    }

    fn weight(value: f64, unit: &str) -> NewMeasurement {
        NewMeasurement {
            kind: "weight".into(),
            value,
            unit: Some(unit.into()),
            ..Default::default()
        }
    }

    fn weight_loss_goal(target: f64) -> NewGoal {
        let now = Utc::now();
        NewGoal {
            goal_type: GoalType::WeightLoss,
            description: "get lighter".into(),
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(30),
            target_value: target,
        }
    }

    #[tokio::test]
    async fn test_record_normalizes_and_updates_profile() {
        let mgr = manager();
        let m = mgr.record_measurement(&subject(), weight(150.0, "lb")).await.unwrap();

        assert_eq!(m.unit, "kg");
        assert!((m.value - 68.04).abs() < 0.01);

        let profile = mgr.profile(&subject()).await.unwrap().unwrap();
        assert_eq!(profile.weight_kg, Some(m.value));
        assert_eq!(profile.height_cm, None);
    }

    #[tokio::test]
    async fn test_record_rejects_bad_input() {
        let mgr = manager();
        let missing_type = NewMeasurement {
            value: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            mgr.record_measurement(&subject(), missing_type).await,
            Err(RecordError::Validation(_))
        ));
        assert!(matches!(
            mgr.record_measurement(&subject(), weight(f64::NAN, "kg")).await,
            Err(RecordError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_type_keeps_unit() {
        let mgr = manager();
        let input = NewMeasurement {
            kind: "steps".into(),
            value: 9000.0,
            unit: Some("count".into()),
            ..Default::default()
        };
        let m = mgr.record_measurement(&subject(), input).await.unwrap();
        assert_eq!(m.unit, "count");
        assert!(mgr.profile(&subject()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unit_only_converts_stored_value() {
        let mgr = manager();
        let input = NewMeasurement {
            kind: "height".into(),
            value: 1.8,
            unit: Some("stone".into()),
            ..Default::default()
        };
        let m = mgr.record_measurement(&subject(), input).await.unwrap();
        assert_eq!(m.unit, "stone");

        let update = MeasurementUpdate {
            unit: Some("m".into()),
            ..Default::default()
        };
        let m = mgr.update_measurement(&subject(), m.id, update).await.unwrap();
        assert!((m.value - 180.0).abs() < 1e-9);
        assert_eq!(m.unit, "cm");

        let profile = mgr.profile(&subject()).await.unwrap().unwrap();
        assert_eq!(profile.height_cm, Some(m.value));
    }

    #[tokio::test]
    async fn test_update_value_uses_stored_type() {
        let mgr = manager();
        let m = mgr.record_measurement(&subject(), weight(70.0, "kg")).await.unwrap();

        let update = MeasurementUpdate {
            value: Some(10.0),
            unit: Some("lbs".into()),
            notes: Some("after breakfast".into()),
            ..Default::default()
        };
        let m = mgr.update_measurement(&subject(), m.id, update).await.unwrap();
        assert!((m.value - 4.5359237).abs() < 1e-9);
        assert_eq!(m.notes, "after breakfast");
    }

    #[tokio::test]
    async fn test_update_other_subject_is_not_found() {
        let mgr = manager();
        let m = mgr.record_measurement(&subject(), weight(70.0, "kg")).await.unwrap();
        let err = mgr
            .update_measurement(&SubjectId::new("other"), m.id, MeasurementUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::NotFound { kind: "Measurement", .. }));
    }

    #[tokio::test]
    async fn test_delete_falls_back_to_previous_weight() {
        let mgr = manager();
        let now = Utc::now();

        let mut older = weight(80.0, "kg");
        older.timestamp = Some(now - Duration::days(2));
        let older = mgr.record_measurement(&subject(), older).await.unwrap();

        let mut newer = weight(78.0, "kg");
        newer.timestamp = Some(now);
        let newer = mgr.record_measurement(&subject(), newer).await.unwrap();

        mgr.delete_measurement(&subject(), newer.id).await.unwrap();
        let profile = mgr.profile(&subject()).await.unwrap().unwrap();
        assert_eq!(profile.weight_kg, Some(80.0));

        mgr.delete_measurement(&subject(), older.id).await.unwrap();
        let profile = mgr.profile(&subject()).await.unwrap().unwrap();
        assert_eq!(profile.weight_kg, None);

        assert!(matches!(
            mgr.delete_measurement(&subject(), older.id).await,
            Err(RecordError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_measurements_newest_first_with_limit() {
        let mgr = manager();
        let now = Utc::now();
        for i in 0..5 {
            let mut input = weight(70.0 + i as f64, "kg");
            input.timestamp = Some(now - Duration::hours(i));
            mgr.record_measurement(&subject(), input).await.unwrap();
        }
        let listed = mgr.list_measurements(&subject(), Some("weight"), Some(3)).await.unwrap();
        let values: Vec<f64> = listed.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![70.0, 71.0, 72.0]);

        assert!(mgr.list_measurements(&subject(), Some("glucose"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_goal_progress_follows_measurements() {
        let mgr = manager();
        let goal = mgr.create_goal(&subject(), weight_loss_goal(65.0)).await.unwrap();
        assert_eq!(goal.status, GoalStatus::Pending);

        let m = mgr.record_measurement(&subject(), weight(150.0, "lb")).await.unwrap();
        let tracked = mgr.tracker().goal_progress(&subject(), goal.id).await.unwrap().unwrap();
        assert!((tracked.goal.progress - 4.47).abs() < 0.01);

        mgr.delete_measurement(&subject(), m.id).await.unwrap();
        let tracked = mgr.tracker().goal_progress(&subject(), goal.id).await.unwrap().unwrap();
        assert_eq!(tracked.goal.current_value, 0.0);
        assert_eq!(tracked.goal.progress, 0.0);
    }

    #[tokio::test]
    async fn test_create_goal_requires_description() {
        let mgr = manager();
        let mut input = weight_loss_goal(65.0);
        input.description = "  ".into();
        assert!(matches!(
            mgr.create_goal(&subject(), input).await,
            Err(RecordError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_goal() {
        let mgr = manager();
        let goal = mgr.create_goal(&subject(), weight_loss_goal(65.0)).await.unwrap();

        let update = GoalUpdate {
            status: Some(GoalStatus::InProgress),
            target_value: Some(64.0),
            ..Default::default()
        };
        let updated = mgr.update_goal(&subject(), goal.id, update).await.unwrap();
        assert_eq!(updated.status, GoalStatus::InProgress);
        assert_eq!(updated.target_value, 64.0);

        mgr.delete_goal(&subject(), goal.id).await.unwrap();
        assert!(matches!(
            mgr.delete_goal(&subject(), goal.id).await,
            Err(RecordError::NotFound { kind: "Goal", .. })
        ));
    }

    #[tokio::test]
    async fn test_archive_and_restore() {
        let mgr = manager();
        let goal = mgr.create_goal(&subject(), weight_loss_goal(65.0)).await.unwrap();
        mgr.record_measurement(&subject(), weight(150.0, "lb")).await.unwrap();

        let entry = mgr.archive_goal(&subject(), goal.id).await.unwrap();
        assert_eq!(entry.source_goal_id, Some(goal.id));
        assert!((entry.progress - 4.47).abs() < 0.01);
        assert!(mgr.tracker().subject_progress(&subject()).await.unwrap().is_empty());
        assert_eq!(mgr.list_history(&subject()).await.unwrap().len(), 1);

        let restored = mgr.restore_goal(&subject(), entry.id).await.unwrap();
        assert_ne!(restored.id, goal.id);
        assert_eq!(restored.goal_type, GoalType::WeightLoss);
        assert_eq!(restored.target_value, 65.0);
        assert_eq!(restored.status, GoalStatus::Pending);
        assert_eq!(restored.end_date - restored.start_date, Duration::days(RESTORED_GOAL_DAYS));
        assert!(mgr.list_history(&subject()).await.unwrap().is_empty());

        assert!(matches!(
            mgr.restore_goal(&subject(), entry.id).await,
            Err(RecordError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_retype_away_from_weight_resyncs_profile() {
        let mgr = manager();
        let m = mgr.record_measurement(&subject(), weight(80.0, "kg")).await.unwrap();

        let update = MeasurementUpdate {
            kind: Some("glucose".into()),
            value: Some(95.0),
            ..Default::default()
        };
        let m = mgr.update_measurement(&subject(), m.id, update).await.unwrap();
        assert_eq!(m.unit, "mg/dL");
        assert_eq!(m.value, 95.0);

        assert!(mgr.list_measurements(&subject(), Some("weight"), None).await.unwrap().is_empty());
        let profile = mgr.profile(&subject()).await.unwrap().unwrap();
        assert_eq!(profile.weight_kg, None);
    }

    #[tokio::test]
    async fn test_type_only_change_rejects_incompatible_unit() {
        let mgr = manager();
        let m = mgr.record_measurement(&subject(), weight(80.0, "kg")).await.unwrap();

        let update = MeasurementUpdate {
            kind: Some("glucose".into()),
            ..Default::default()
        };
        assert!(matches!(
            mgr.update_measurement(&subject(), m.id, update).await,
            Err(RecordError::Validation(_))
        ));

        let stored = mgr.list_measurements(&subject(), None, None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, "weight");
        assert_eq!(stored[0].unit, "kg");
        let profile = mgr.profile(&subject()).await.unwrap().unwrap();
        assert_eq!(profile.weight_kg, Some(80.0));
    }

    #[tokio::test]
    async fn test_type_only_change_converts_from_old_unit() {
        let mgr = manager();
        let input = NewMeasurement {
            kind: "body_mass".into(),
            value: 10.0,
            unit: Some("lb".into()),
            ..Default::default()
        };
        let m = mgr.record_measurement(&subject(), input).await.unwrap();
        assert_eq!(m.unit, "lb");

        let update = MeasurementUpdate {
            kind: Some("weight".into()),
            ..Default::default()
        };
        let m = mgr.update_measurement(&subject(), m.id, update).await.unwrap();
        assert_eq!(m.unit, "kg");
        assert!((m.value - 4.5359237).abs() < 1e-9);

        let profile = mgr.profile(&subject()).await.unwrap().unwrap();
        assert_eq!(profile.weight_kg, Some(m.value));
    }

    #[tokio::test]
    async fn test_clear_history_keeps_other_subjects() {
        let mgr = manager();
        let other = SubjectId::new("subject-2");

        for owner in [subject(), subject(), other.clone()] {
            let goal = mgr.create_goal(&owner, weight_loss_goal(65.0)).await.unwrap();
            mgr.archive_goal(&owner, goal.id).await.unwrap();
        }

        assert_eq!(mgr.clear_history(&subject()).await.unwrap(), 2);
        assert!(mgr.list_history(&subject()).await.unwrap().is_empty());
        assert_eq!(mgr.list_history(&other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let mgr = manager();
        mgr.record_measurement(&subject(), weight(72.0, "kg")).await.unwrap();

        let birth = chrono::NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
        let update = ProfileUpdate {
            birth_date: Some(birth),
            sex: Some(Sex::Female),
            height_cm: Some(168.0),
            ..Default::default()
        };
        let profile = mgr.update_profile(&subject(), update).await.unwrap();
        assert_eq!(profile.birth_date, Some(birth));
        assert_eq!(profile.sex, Sex::Female);
        assert_eq!(profile.height_cm, Some(168.0));
        assert_eq!(profile.weight_kg, Some(72.0));

        let stored = mgr.profile(&subject()).await.unwrap().unwrap();
        assert_eq!(stored.sex, Sex::Female);
        assert_eq!(stored.weight_kg, Some(72.0));
    }

    #[tokio::test]
    async fn test_update_profile_bounds() {
        let mgr = manager();
        for update in [
            ProfileUpdate { weight_kg: Some(19.9), ..Default::default() },
            ProfileUpdate { weight_kg: Some(500.1), ..Default::default() },
            ProfileUpdate { height_cm: Some(49.0), ..Default::default() },
            ProfileUpdate { height_cm: Some(301.0), ..Default::default() },
            ProfileUpdate { weight_kg: Some(f64::NAN), ..Default::default() },
        ] {
            assert!(matches!(
                mgr.update_profile(&subject(), update).await,
                Err(RecordError::Validation(_))
            ));
        }
        assert!(mgr.profile(&subject()).await.unwrap().is_none());

        let edge = ProfileUpdate {
            weight_kg: Some(20.0),
            height_cm: Some(300.0),
            ..Default::default()
        };
        let profile = mgr.update_profile(&subject(), edge).await.unwrap();
        assert_eq!(profile.weight_kg, Some(20.0));
        assert_eq!(profile.height_cm, Some(300.0));
    }
}
