use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;

use crate::reminder::Reminder;

use super::model::ReminderRecord;

/// Loads and saves the whole reminder list at once.
///
/// Loading never fails: a missing or unreadable store yields an empty list.
#[async_trait]
pub trait ReminderStorage: Send + Sync {
    async fn load(&self) -> Vec<Reminder>;
    async fn save(&self, reminders: &[Reminder]) -> anyhow::Result<()>;
}

/// Pretty-printed JSON array on disk, replaced through a temporary sibling file.
pub struct JsonFileReminderStorage {
    path: PathBuf,
}

impl JsonFileReminderStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "reminders.json".into());
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }
}

#[async_trait]
impl ReminderStorage for JsonFileReminderStorage {
    async fn load(&self) -> Vec<Reminder> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                log::info!("No reminder store at {:?}, starting empty", self.path);
                return Vec::new();
            }
            Err(error) => {
                log::warn!("Could not read reminder store {:?}: {}", self.path, error);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Option<ReminderRecord>>>(&json) {
            Ok(records) => records.into_iter().flatten().map(Reminder::from).collect(),
            Err(error) => {
                log::warn!(
                    "Reminder store {:?} is corrupt, starting empty: {}",
                    self.path,
                    error
                );
                Vec::new()
            }
        }
    }

    async fn save(&self, reminders: &[Reminder]) -> anyhow::Result<()> {
        if let Some(directory) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(directory)
                .await
                .with_context(|| format!("Could not create directory {directory:?}"))?;
        }

        let records: Vec<ReminderRecord> = reminders.iter().map(ReminderRecord::from).collect();
        let json = serde_json::to_string_pretty(&records)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, json)
            .await
            .with_context(|| format!("Could not write {temp_path:?}"))?;
        fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Could not replace {:?}", self.path))?;

        log::debug!("Saved {} reminders to {:?}", records.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};

    use super::*;
    use crate::reminder::{Cadence, Recurrence, ReminderDraft, TriggerTime, Weekdays};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn sample_reminders() -> Vec<Reminder> {
        let now = at(2024, 1, 1, 8, 0, 0);
        let days: Weekdays = [Weekday::Tue, Weekday::Fri].into_iter().collect();
        vec![
            Reminder::new(ReminderDraft::new("Dentist", Cadence::Once(at(2024, 1, 3, 15, 0, 0))), now),
            Reminder::new(
                ReminderDraft::new(
                    "Standup",
                    Cadence::Recurring(Recurrence::weekly(
                        days,
                        TriggerTime::new(NaiveTime::from_hms_opt(9, 45, 0).unwrap()),
                    )),
                ),
                now,
            ),
        ]
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileReminderStorage::new(dir.path().join("reminders.json"));

        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        std::fs::write(&path, "{ this is not json").unwrap();
        let storage = JsonFileReminderStorage::new(&path);

        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn saved_list_loads_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileReminderStorage::new(dir.path().join("nested").join("reminders.json"));
        let reminders = sample_reminders();

        storage.save(&reminders).await.unwrap();
        let loaded = storage.load().await;

        assert_eq!(loaded, reminders);
        assert!(!storage.temp_path().exists());
    }

    #[tokio::test]
    async fn null_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        let storage = JsonFileReminderStorage::new(&path);
        storage.save(&sample_reminders()).await.unwrap();

        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        json.as_array_mut().unwrap().insert(0, serde_json::Value::Null);
        std::fs::write(&path, json.to_string()).unwrap();

        assert_eq!(storage.load().await.len(), 2);
    }

    #[tokio::test]
    async fn record_without_timestamps_does_not_drop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        let storage = JsonFileReminderStorage::new(&path);
        storage.save(&sample_reminders()).await.unwrap();

        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let first = json[0].as_object_mut().unwrap();
        first.remove("createdAt");
        first.remove("updatedAt");
        std::fs::write(&path, json.to_string()).unwrap();

        let loaded = storage.load().await;

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].description(), "Dentist");
        assert_eq!(loaded[1].description(), "Standup");
        assert_eq!(loaded[1].created_at(), at(2024, 1, 1, 8, 0, 0));
    }
}
