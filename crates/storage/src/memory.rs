//! In-memory storage, used by tests and short-lived tools.

use std::collections::HashMap;
use tokio::sync::RwLock;
use vitals_core::{
    BodyProfile, Goal, GoalHistory, GoalId, HistoryId, Measurement, MeasurementFilter,
    MeasurementId, SubjectId,
};
use super::trait_::{sort_goals, sort_history};
use super::{Storage, Result};

/// Storage backed by in-process maps.
#[derive(Default)]
pub struct MemoryStorage {
    measurements: RwLock<HashMap<MeasurementId, Measurement>>,
    goals: RwLock<HashMap<GoalId, Goal>>,
    history: RwLock<HashMap<HistoryId, GoalHistory>>,
    profiles: RwLock<HashMap<SubjectId, BodyProfile>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn save_measurement(&self, measurement: &Measurement) -> Result<()> {
        self.measurements
            .write()
            .await
            .insert(measurement.id, measurement.clone());
        Ok(())
    }

    async fn load_measurement(
        &self,
        subject: &SubjectId,
        id: MeasurementId,
    ) -> Result<Option<Measurement>> {
        Ok(self
            .measurements
            .read()
            .await
            .get(&id)
            .filter(|m| &m.subject_id == subject)
            .cloned())
    }

    async fn list_measurements(
        &self,
        subject: &SubjectId,
        filter: &MeasurementFilter,
    ) -> Result<Vec<Measurement>> {
        let matching = self
            .measurements
            .read()
            .await
            .values()
            .filter(|m| &m.subject_id == subject && filter.matches(m))
            .cloned()
            .collect();
        Ok(filter.arrange(matching))
    }

    async fn delete_measurement(
        &self,
        subject: &SubjectId,
        id: MeasurementId,
    ) -> Result<Option<Measurement>> {
        let mut map = self.measurements.write().await;
        if map.get(&id).is_some_and(|m| &m.subject_id == subject) {
            Ok(map.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn save_goal(&self, goal: &Goal) -> Result<()> {
        self.goals.write().await.insert(goal.id, goal.clone());
        Ok(())
    }

    async fn load_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Option<Goal>> {
        Ok(self
            .goals
            .read()
            .await
            .get(&id)
            .filter(|g| &g.subject_id == subject)
            .cloned())
    }

    async fn list_goals(&self, subject: &SubjectId) -> Result<Vec<Goal>> {
        let mut goals: Vec<Goal> = self
            .goals
            .read()
            .await
            .values()
            .filter(|g| &g.subject_id == subject)
            .cloned()
            .collect();
        sort_goals(&mut goals);
        Ok(goals)
    }

    async fn delete_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Option<Goal>> {
        let mut map = self.goals.write().await;
        if map.get(&id).is_some_and(|g| &g.subject_id == subject) {
            Ok(map.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn save_history(&self, entry: &GoalHistory) -> Result<()> {
        self.history.write().await.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn load_history(&self, subject: &SubjectId, id: HistoryId) -> Result<Option<GoalHistory>> {
        Ok(self
            .history
            .read()
            .await
            .get(&id)
            .filter(|h| &h.subject_id == subject)
            .cloned())
    }

    async fn list_history(&self, subject: &SubjectId) -> Result<Vec<GoalHistory>> {
        let mut entries: Vec<GoalHistory> = self
            .history
            .read()
            .await
            .values()
            .filter(|h| &h.subject_id == subject)
            .cloned()
            .collect();
        sort_history(&mut entries);
        Ok(entries)
    }

    async fn delete_history(&self, subject: &SubjectId, id: HistoryId) -> Result<Option<GoalHistory>> {
        let mut map = self.history.write().await;
        if map.get(&id).is_some_and(|h| &h.subject_id == subject) {
            Ok(map.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn clear_history(&self, subject: &SubjectId) -> Result<usize> {
        let mut map = self.history.write().await;
        let before = map.len();
        map.retain(|_, h| &h.subject_id != subject);
        Ok(before - map.len())
    }

    async fn save_profile(&self, profile: &BodyProfile) -> Result<()> {
        self.profiles
            .write()
            .await
            .insert(profile.subject_id.clone(), profile.clone());
        Ok(())
    }

    async fn load_profile(&self, subject: &SubjectId) -> Result<Option<BodyProfile>> {
        Ok(self.profiles.read().await.get(subject).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use vitals_core::GoalType;

    #[tokio::test]
    async fn test_goals_listed_newest_first() {
        let storage = MemoryStorage::new();
        let subject = SubjectId::new("s");
        let now = Utc::now();

        let mut older = Goal::new(subject.clone(), GoalType::WeightLoss, "a", now, now, 1.0);
        older.created_at = now - Duration::days(1);
        let newer = Goal::new(subject.clone(), GoalType::MuscleGain, "b", now, now, 1.0);
        storage.save_goal(&older).await.unwrap();
        storage.save_goal(&newer).await.unwrap();

        let goals = storage.list_goals(&subject).await.unwrap();
        assert_eq!(goals[0].id, newer.id);
        assert_eq!(goals[1].id, older.id);
    }

    #[tokio::test]
    async fn test_delete_measurement_other_subject_is_noop() {
        let storage = MemoryStorage::new();
        let m = Measurement::new(SubjectId::new("owner"), "weight", 70.0, None);
        storage.save_measurement(&m).await.unwrap();

        let removed = storage.delete_measurement(&SubjectId::new("intruder"), m.id).await.unwrap();
        assert!(removed.is_none());
        assert!(storage.load_measurement(&m.subject_id, m.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_history_is_scoped_to_subject() {
        let storage = MemoryStorage::new();
        let now = Utc::now();
        let mine = SubjectId::new("mine");
        let theirs = SubjectId::new("theirs");

        for subject in [&mine, &mine, &theirs] {
            let goal = Goal::new(subject.clone(), GoalType::WeightLoss, "g", now, now, 60.0);
            storage.save_history(&GoalHistory::from_goal(&goal, 10.0)).await.unwrap();
        }

        assert_eq!(storage.clear_history(&mine).await.unwrap(), 2);
        assert!(storage.list_history(&mine).await.unwrap().is_empty());
        assert_eq!(storage.list_history(&theirs).await.unwrap().len(), 1);
        assert_eq!(storage.clear_history(&mine).await.unwrap(), 0);
    }
}
