use chrono::NaiveDateTime;

use crate::reminder::{Reminder, ReminderId};

use super::normalizer;

/// Handed to the presentation side when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredReminder {
    pub id: ReminderId,
    pub message: String,
    /// The occurrence that fired, not the sweep instant.
    pub fired_at: NaiveDateTime,
}

/// Fires every due reminder once and advances it to its following occurrence.
///
/// A reminder that lapsed several occurrences ago (e.g. across a suspend) fires a single time
/// for the occurrence it was waiting on, then moves forward from `now`.
pub fn sweep(reminders: &mut [Reminder], now: NaiveDateTime) -> Vec<FiredReminder> {
    reminders
        .iter_mut()
        .filter(|reminder| reminder.is_due(now))
        .map(|reminder| {
            let fired = FiredReminder {
                id: reminder.id(),
                message: reminder.display_description().to_owned(),
                fired_at: reminder.next_trigger_at().unwrap_or(now),
            };
            normalizer::mark_triggered(reminder, now);
            log::debug!(
                "Reminder fired. [reminder_id = {}, fired_at = {}, next = {:?}]",
                fired.id,
                fired.fired_at,
                reminder.next_trigger_at()
            );
            fired
        })
        .collect()
}
