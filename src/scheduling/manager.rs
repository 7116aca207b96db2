use std::{cmp::Ordering, sync::Arc};

use anyhow::Context;
use chrono::NaiveDateTime;

use crate::{
    reminder::{Reminder, ReminderDraft},
    storage::ReminderStorage,
};

use super::{
    normalizer,
    sweep::{self, FiredReminder},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerRequest {
    List,
    Add(ReminderDraft),
    Edit { key: String, draft: ReminderDraft },
    Remove { key: String },
    SetEnabled { key: String, enabled: bool },
}

/// Snapshots of the affected reminders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerResponse {
    Listing(Vec<Reminder>),
    Added(Reminder),
    Updated(Reminder),
    Removed(Reminder),
}

/// Owns the reminder list between load and save. All edits and sweeps go through here.
pub struct ReminderManager {
    reminders: Vec<Reminder>,
    storage: Arc<dyn ReminderStorage>,
}

impl ReminderManager {
    /// Loads the stored list, normalizes every reminder against `now` and writes the
    /// repaired list back.
    pub async fn load(storage: Arc<dyn ReminderStorage>, now: NaiveDateTime) -> anyhow::Result<Self> {
        let mut reminders = storage.load().await;
        for reminder in reminders.iter_mut() {
            normalizer::normalize(reminder, now);
        }
        log::info!("Loaded {} reminders", reminders.len());

        let manager = Self { reminders, storage };
        manager.persist().await?;
        Ok(manager)
    }

    #[cfg(test)]
    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    /// Pending first, then soonest next trigger, then description.
    pub fn listing(&self) -> Vec<Reminder> {
        let mut listing = self.reminders.clone();
        listing.sort_by(|a, b| {
            a.is_completed()
                .cmp(&b.is_completed())
                .then_with(|| compare_next_trigger(a, b))
                .then_with(|| a.description().cmp(b.description()))
        });
        listing
    }

    pub async fn handle(
        &mut self,
        request: ManagerRequest,
        now: NaiveDateTime,
    ) -> anyhow::Result<ManagerResponse> {
        match request {
            ManagerRequest::List => Ok(ManagerResponse::Listing(self.listing())),
            ManagerRequest::Add(draft) => self.add(draft, now).await.map(ManagerResponse::Added),
            ManagerRequest::Edit { key, draft } => self
                .update(&key, draft, now)
                .await
                .map(ManagerResponse::Updated),
            ManagerRequest::Remove { key } => self.remove(&key).await.map(ManagerResponse::Removed),
            ManagerRequest::SetEnabled { key, enabled } => self
                .set_enabled(&key, enabled, now)
                .await
                .map(ManagerResponse::Updated),
        }
    }

    pub async fn add(&mut self, draft: ReminderDraft, now: NaiveDateTime) -> anyhow::Result<Reminder> {
        let reminder = Reminder::new(draft, now);
        let mut next = self.reminders.clone();
        next.push(reminder.clone());
        self.commit(next).await?;
        log::info!("Added reminder {}", reminder.id());
        Ok(reminder)
    }

    pub async fn update(
        &mut self,
        key: &str,
        draft: ReminderDraft,
        now: NaiveDateTime,
    ) -> anyhow::Result<Reminder> {
        let index = self.position(key)?;
        let mut next = self.reminders.clone();
        next[index].apply(draft, now);
        let updated = next[index].clone();
        self.commit(next).await?;
        log::info!("Updated reminder {}", updated.id());
        Ok(updated)
    }

    pub async fn remove(&mut self, key: &str) -> anyhow::Result<Reminder> {
        let index = self.position(key)?;
        let mut next = self.reminders.clone();
        let removed = next.remove(index);
        self.commit(next).await?;
        log::info!("Removed reminder {}", removed.id());
        Ok(removed)
    }

    pub async fn set_enabled(
        &mut self,
        key: &str,
        enabled: bool,
        now: NaiveDateTime,
    ) -> anyhow::Result<Reminder> {
        let index = self.position(key)?;
        let mut next = self.reminders.clone();
        next[index].set_enabled(enabled, now);
        let updated = next[index].clone();
        self.commit(next).await?;
        log::info!(
            "Reminder {} {}",
            updated.id(),
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(updated)
    }

    /// Fires due reminders in memory. The caller persists once the notifications are out.
    pub fn sweep(&mut self, now: NaiveDateTime) -> Vec<FiredReminder> {
        sweep::sweep(&mut self.reminders, now)
    }

    /// Edits only take effect once the edited list is on disk.
    async fn commit(&mut self, reminders: Vec<Reminder>) -> anyhow::Result<()> {
        self.storage
            .save(&reminders)
            .await
            .context("Could not save reminders")?;
        self.reminders = reminders;
        Ok(())
    }

    pub async fn persist(&self) -> anyhow::Result<()> {
        self.storage
            .save(&self.reminders)
            .await
            .context("Could not save reminders")
    }

    /// Resolves a full id or a unique id prefix.
    fn position(&self, key: &str) -> anyhow::Result<usize> {
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            anyhow::bail!("No reminder id given");
        }

        let mut matches = self
            .reminders
            .iter()
            .enumerate()
            .filter(|(_, reminder)| reminder.id().to_string().starts_with(&key));

        match (matches.next(), matches.next()) {
            (Some((index, _)), None) => Ok(index),
            (None, _) => anyhow::bail!("No such reminder: {key}"),
            (Some(_), Some(_)) => anyhow::bail!("Reminder id '{key}' is ambiguous, use more characters"),
        }
    }
}

fn compare_next_trigger(a: &Reminder, b: &Reminder) -> Ordering {
    match (a.next_trigger_at(), b.next_trigger_at()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
