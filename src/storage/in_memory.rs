use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::reminder::Reminder;

use super::{ReminderStorage, model::ReminderRecord};

pub struct InMemoryReminderStorage {
    store: RwLock<Vec<ReminderRecord>>,
}

impl InMemoryReminderStorage {
    pub fn new() -> Self {
        InMemoryReminderStorage {
            store: RwLock::new(Vec::new()),
        }
    }

    pub async fn records(&self) -> Vec<ReminderRecord> {
        self.store.read().await.clone()
    }
}

impl Default for InMemoryReminderStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReminderStorage for InMemoryReminderStorage {
    async fn load(&self) -> Vec<Reminder> {
        let store = self.store.read().await;
        store.iter().cloned().map(Reminder::from).collect()
    }

    async fn save(&self, reminders: &[Reminder]) -> anyhow::Result<()> {
        let mut store = self.store.write().await;
        *store = reminders.iter().map(ReminderRecord::from).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::reminder::{Cadence, ReminderDraft};

    fn sample_reminders() -> Vec<Reminder> {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        ["Dentist", "Standup"]
            .into_iter()
            .map(|description| {
                Reminder::new(ReminderDraft::new(description, Cadence::Once(now)), now)
            })
            .collect()
    }

    #[tokio::test]
    async fn in_memory_storage_replaces_snapshot() {
        let storage = InMemoryReminderStorage::new();
        let reminders = sample_reminders();

        storage.save(&reminders).await.unwrap();
        storage.save(&reminders[..1]).await.unwrap();

        assert_eq!(storage.load().await, reminders[..1].to_vec());
        assert_eq!(storage.records().await.len(), 1);
    }
}
