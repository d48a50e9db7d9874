//! JSON file storage implementation.
//!
//! Stores one JSON file per record under a data directory and keeps a small
//! per-record meta marker (version + updated_at).

use std::path::{Path, PathBuf};
use vitals_core::{
    BodyProfile, Goal, GoalHistory, GoalId, HistoryId, Measurement, MeasurementFilter,
    MeasurementId, SubjectId,
};
use super::trait_::{sort_goals, sort_history};
use super::{Storage, Result};
use tokio::fs;
use tracing::debug;

const MEASUREMENTS: &str = "measurements";
const GOALS: &str = "goals";
const HISTORY: &str = "history";
const PROFILES: &str = "profiles";

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the data and meta
    /// directories as needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        for kind in [MEASUREMENTS, GOALS, HISTORY, PROFILES] {
            fs::create_dir_all(root.join(kind)).await?;
            fs::create_dir_all(root.join("meta").join(kind)).await?;
        }

        debug!("Opened JSON storage at {}", root.display());
        Ok(Self { root })
    }

    /// Root data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join(kind).join(format!("{}.json", id))
    }

    fn meta_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join("meta").join(kind).join(format!("{}.meta.json", id))
    }

    /// Read and increment per-record version, return new version.
    async fn bump_version(&self, kind: &str, id: &str) -> Result<u64> {
        let path = self.meta_path(kind, id);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }

    async fn write_record<T: serde::Serialize>(&self, kind: &str, id: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.record_path(kind, id), json.as_bytes()).await?;
        let version = self.bump_version(kind, id).await?;
        debug!("Saved {} {} (v{})", kind, id, version);
        Ok(())
    }

    async fn remove_record(&self, kind: &str, id: &str) -> Result<()> {
        remove_if_exists(&self.record_path(kind, id)).await?;
        remove_if_exists(&self.meta_path(kind, id)).await?;
        debug!("Deleted {} {}", kind, id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_measurement(&self, measurement: &Measurement) -> Result<()> {
        self.write_record(MEASUREMENTS, &measurement.id.to_string(), measurement).await
    }

    async fn load_measurement(
        &self,
        subject: &SubjectId,
        id: MeasurementId,
    ) -> Result<Option<Measurement>> {
        let found: Option<Measurement> =
            read_json(&self.record_path(MEASUREMENTS, &id.to_string())).await?;
        Ok(found.filter(|m| &m.subject_id == subject))
    }

    async fn list_measurements(
        &self,
        subject: &SubjectId,
        filter: &MeasurementFilter,
    ) -> Result<Vec<Measurement>> {
        let all: Vec<Measurement> = list_dir(&self.root.join(MEASUREMENTS)).await?;
        let matching = all
            .into_iter()
            .filter(|m| &m.subject_id == subject && filter.matches(m))
            .collect();
        Ok(filter.arrange(matching))
    }

    async fn delete_measurement(
        &self,
        subject: &SubjectId,
        id: MeasurementId,
    ) -> Result<Option<Measurement>> {
        let existing = self.load_measurement(subject, id).await?;
        if existing.is_some() {
            self.remove_record(MEASUREMENTS, &id.to_string()).await?;
        }
        Ok(existing)
    }

    async fn save_goal(&self, goal: &Goal) -> Result<()> {
        self.write_record(GOALS, &goal.id.to_string(), goal).await
    }

    async fn load_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Option<Goal>> {
        let found: Option<Goal> = read_json(&self.record_path(GOALS, &id.to_string())).await?;
        Ok(found.filter(|g| &g.subject_id == subject))
    }

    async fn list_goals(&self, subject: &SubjectId) -> Result<Vec<Goal>> {
        let all: Vec<Goal> = list_dir(&self.root.join(GOALS)).await?;
        let mut goals: Vec<Goal> = all.into_iter().filter(|g| &g.subject_id == subject).collect();
        sort_goals(&mut goals);
        Ok(goals)
    }

    async fn delete_goal(&self, subject: &SubjectId, id: GoalId) -> Result<Option<Goal>> {
        let existing = self.load_goal(subject, id).await?;
        if existing.is_some() {
            self.remove_record(GOALS, &id.to_string()).await?;
        }
        Ok(existing)
    }

    async fn save_history(&self, entry: &GoalHistory) -> Result<()> {
        self.write_record(HISTORY, &entry.id.to_string(), entry).await
    }

    async fn load_history(&self, subject: &SubjectId, id: HistoryId) -> Result<Option<GoalHistory>> {
        let found: Option<GoalHistory> =
            read_json(&self.record_path(HISTORY, &id.to_string())).await?;
        Ok(found.filter(|h| &h.subject_id == subject))
    }

    async fn list_history(&self, subject: &SubjectId) -> Result<Vec<GoalHistory>> {
        let all: Vec<GoalHistory> = list_dir(&self.root.join(HISTORY)).await?;
        let mut entries: Vec<GoalHistory> =
            all.into_iter().filter(|h| &h.subject_id == subject).collect();
        sort_history(&mut entries);
        Ok(entries)
    }

    async fn delete_history(&self, subject: &SubjectId, id: HistoryId) -> Result<Option<GoalHistory>> {
        let existing = self.load_history(subject, id).await?;
        if existing.is_some() {
            self.remove_record(HISTORY, &id.to_string()).await?;
        }
        Ok(existing)
    }

    async fn clear_history(&self, subject: &SubjectId) -> Result<usize> {
        let entries = self.list_history(subject).await?;
        for entry in &entries {
            self.remove_record(HISTORY, &entry.id.to_string()).await?;
        }
        debug!("Cleared {} history entries for {}", entries.len(), subject);
        Ok(entries.len())
    }

    async fn save_profile(&self, profile: &BodyProfile) -> Result<()> {
        self.write_record(PROFILES, &subject_key(&profile.subject_id), profile).await
    }

    async fn load_profile(&self, subject: &SubjectId) -> Result<Option<BodyProfile>> {
        read_json(&self.record_path(PROFILES, &subject_key(subject))).await
    }
}

/// File-name-safe key for an opaque subject identifier.
fn subject_key(subject: &SubjectId) -> String {
    subject.as_str().bytes().map(|b| format!("{:02x}", b)).collect()
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Ok(Some(item)) = read_json(&entry.path()).await {
            items.push(item);
        }
    }
    Ok(items)
}
