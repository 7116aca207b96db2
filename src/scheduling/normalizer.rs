use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};

use crate::reminder::{Reminder, Schedule};

use super::recurrence;

/// Smallest step the scheduler distinguishes. After firing, the next occurrence is searched
/// from `now + TRIGGER_RESOLUTION`, so sweeps must never run more often than this.
pub const TRIGGER_RESOLUTION: Duration = Duration::from_secs(1);

/// Recomputes `next_trigger_at` from the schedule and the enabled flag.
///
/// One-time reminders with no instant, or already completed, are forced into the terminal
/// state (disabled, no next trigger). Otherwise a one-time reminder triggers exactly at its
/// instant, even a past one. Recurring reminders get the next occurrence strictly after
/// `reference` while enabled.
pub fn normalize(reminder: &mut Reminder, reference: NaiveDateTime) {
    let next = match &mut reminder.schedule {
        Schedule::OneTime { at, completed } => match at {
            Some(at) if !*completed => Some(*at),
            _ => {
                *completed = true;
                reminder.enabled = false;
                None
            }
        },
        Schedule::Recurring(_) if !reminder.enabled => None,
        Schedule::Recurring(rule) => {
            let next = recurrence::next_occurrence(rule, reference);
            if next.is_none() {
                log::warn!(
                    "No upcoming occurrence found for reminder. [reminder_id = {}, reference = {}]",
                    reminder.id,
                    reference
                );
            }
            next
        }
    };

    reminder.next_trigger_at = next;
}

/// Records a firing at `now` and advances the reminder past it.
pub fn mark_triggered(reminder: &mut Reminder, now: NaiveDateTime) {
    reminder.last_triggered_at = Some(now);
    reminder.updated_at = now;

    match &mut reminder.schedule {
        Schedule::OneTime { completed, .. } => {
            *completed = true;
            reminder.enabled = false;
            reminder.next_trigger_at = None;
        }
        Schedule::Recurring(rule) => {
            reminder.next_trigger_at = now
                .checked_add_signed(resolution())
                .and_then(|from| recurrence::next_occurrence(rule, from));
        }
    }
}

fn resolution() -> TimeDelta {
    TimeDelta::from_std(TRIGGER_RESOLUTION).unwrap_or(TimeDelta::seconds(1))
}
