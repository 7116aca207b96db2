use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, Timelike, Weekday};
use uuid::Uuid;

use crate::scheduling::normalizer;

pub type ReminderId = Uuid;

/// Shown in place of a blank description.
pub const PLACEHOLDER_DESCRIPTION: &str = "Reminder";

/// Time of day a recurring reminder fires at, with sub-second precision stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerTime(NaiveTime);

impl TriggerTime {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time = inner.with_nanosecond(0).unwrap_or(inner);
        Self(normalized_time)
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }

    pub fn into_time(self) -> NaiveTime {
        self.0
    }
}

impl Default for TriggerTime {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

/// Set of weekdays. Inserting a day twice has no effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Weekdays(u8);

impl Weekdays {
    pub const EMPTY: Weekdays = Weekdays(0);

    pub fn single(day: Weekday) -> Self {
        let mut days = Self::EMPTY;
        days.insert(day);
        days
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Days in Monday-first order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_WEEKDAYS.into_iter().filter(|day| self.contains(*day))
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut days = Self::EMPTY;
        for day in iter {
            days.insert(day);
        }
        days
    }
}

impl fmt::Display for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "unspecified");
        }
        let names: Vec<String> = self.iter().map(|day| day.to_string()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Day of month in `1..=31`. Months shorter than the configured day fire on their last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay(u32);

impl MonthDay {
    pub const FIRST: u32 = 1;
    pub const LAST: u32 = 31;

    /// Out of range values are clamped rather than rejected.
    pub fn new(day: i64) -> Self {
        let clamped = day.clamp(Self::FIRST as i64, Self::LAST as i64);
        Self(clamped as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for MonthDay {
    fn default() -> Self {
        Self(Self::FIRST)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceKind {
    Daily,
    Weekly(Weekdays),
    Monthly(MonthDay),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub kind: RecurrenceKind,
    pub time: TriggerTime,
}

impl Recurrence {
    pub fn daily(time: TriggerTime) -> Self {
        Self {
            kind: RecurrenceKind::Daily,
            time,
        }
    }

    pub fn weekly(days: Weekdays, time: TriggerTime) -> Self {
        Self {
            kind: RecurrenceKind::Weekly(days),
            time,
        }
    }

    pub fn monthly(day: MonthDay, time: TriggerTime) -> Self {
        Self {
            kind: RecurrenceKind::Monthly(day),
            time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A missing instant is treated as already expired.
    OneTime {
        at: Option<NaiveDateTime>,
        completed: bool,
    },
    Recurring(Recurrence),
}

/// What the user asks for when creating or editing a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Once(NaiveDateTime),
    Recurring(Recurrence),
}

impl From<Cadence> for Schedule {
    fn from(value: Cadence) -> Self {
        match value {
            Cadence::Once(at) => Schedule::OneTime {
                at: Some(at),
                completed: false,
            },
            Cadence::Recurring(recurrence) => Schedule::Recurring(recurrence),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDraft {
    pub description: String,
    pub cadence: Cadence,
}

impl ReminderDraft {
    pub fn new(description: impl Into<String>, cadence: Cadence) -> Self {
        Self {
            description: description.into(),
            cadence,
        }
    }
}

/// A schedulable reminder.
///
/// `next_trigger_at` is derived state. Every mutator re-normalizes the reminder, so it is
/// never stale relative to the schedule and the enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub(crate) id: ReminderId,
    pub(crate) description: String,
    pub(crate) schedule: Schedule,
    pub(crate) enabled: bool,
    pub(crate) next_trigger_at: Option<NaiveDateTime>,
    pub(crate) last_triggered_at: Option<NaiveDateTime>,
    pub(crate) created_at: NaiveDateTime,
    pub(crate) updated_at: NaiveDateTime,
}

impl Reminder {
    pub fn new(draft: ReminderDraft, now: NaiveDateTime) -> Self {
        let mut reminder = Self {
            id: Uuid::new_v4(),
            description: draft.description,
            schedule: draft.cadence.into(),
            enabled: true,
            next_trigger_at: None,
            last_triggered_at: None,
            created_at: now,
            updated_at: now,
        };
        normalizer::normalize(&mut reminder, now);
        reminder
    }

    /// Replaces the configuration, keeping identity, enablement and history.
    pub fn apply(&mut self, draft: ReminderDraft, now: NaiveDateTime) {
        self.description = draft.description;
        self.schedule = draft.cadence.into();
        self.updated_at = now;
        normalizer::normalize(self, now);
    }

    /// Enabling a completed one-time reminder revives it.
    pub fn set_enabled(&mut self, enabled: bool, now: NaiveDateTime) {
        self.enabled = enabled;
        if enabled {
            if let Schedule::OneTime { completed, .. } = &mut self.schedule {
                *completed = false;
            }
        }
        self.updated_at = now;
        normalizer::normalize(self, now);
    }

    pub fn id(&self) -> ReminderId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn display_description(&self) -> &str {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            PLACEHOLDER_DESCRIPTION
        } else {
            trimmed
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.schedule, Schedule::OneTime { completed: true, .. })
    }

    pub fn next_trigger_at(&self) -> Option<NaiveDateTime> {
        self.next_trigger_at
    }

    pub fn last_triggered_at(&self) -> Option<NaiveDateTime> {
        self.last_triggered_at
    }

    #[cfg(test)]
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    #[cfg(test)]
    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.enabled
            && !self.is_completed()
            && self.next_trigger_at.is_some_and(|next| next <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekdays_collapse_duplicates() {
        let days: Weekdays = [Weekday::Wed, Weekday::Mon, Weekday::Wed].into_iter().collect();

        assert_eq!(days.iter().count(), 2);
        assert_eq!(days.iter().collect::<Vec<_>>(), vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(days.to_string(), "Mon,Wed");
    }

    #[test]
    fn month_day_is_clamped() {
        assert_eq!(MonthDay::new(0).get(), 1);
        assert_eq!(MonthDay::new(-40).get(), 1);
        assert_eq!(MonthDay::new(31).get(), 31);
        assert_eq!(MonthDay::new(400).get(), 31);
    }

    #[test]
    fn trigger_time_drops_fractional_seconds() {
        let time = NaiveTime::from_hms_milli_opt(9, 30, 15, 750).unwrap();

        assert_eq!(
            TriggerTime::new(time).into_time(),
            NaiveTime::from_hms_opt(9, 30, 15).unwrap()
        );
    }

    #[test]
    fn blank_description_falls_back_to_placeholder() {
        let now = NaiveDateTime::default();
        let reminder = Reminder::new(
            ReminderDraft::new("   ", Cadence::Recurring(Recurrence::daily(TriggerTime::default()))),
            now,
        );

        assert_eq!(reminder.display_description(), PLACEHOLDER_DESCRIPTION);
    }
}
