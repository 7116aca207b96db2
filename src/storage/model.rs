use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    reminder::{
        MonthDay, Recurrence, RecurrenceKind, Reminder, ReminderId, Schedule, TriggerTime, Weekdays,
    },
    scheduling::{Clock, LocalClock},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderMode {
    #[default]
    OneTime,
    Recurring,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceType {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Flat on-disk shape of a reminder. Fields that the mode makes irrelevant are still written,
/// with neutral values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: ReminderId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mode: ReminderMode,
    #[serde(default)]
    pub one_time_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    #[serde(default)]
    pub weekly_days: Vec<Weekday>,
    #[serde(default = "default_monthly_day")]
    pub monthly_day: i64,
    #[serde(default = "default_trigger_time")]
    pub trigger_time: NaiveTime,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub next_trigger_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_triggered_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

fn default_monthly_day() -> i64 {
    MonthDay::FIRST as i64
}

fn default_trigger_time() -> NaiveTime {
    TriggerTime::default().into_time()
}

fn enabled_by_default() -> bool {
    true
}

impl From<&Reminder> for ReminderRecord {
    fn from(value: &Reminder) -> Self {
        let mut record = Self {
            id: value.id,
            description: value.description.clone(),
            mode: ReminderMode::OneTime,
            one_time_at: None,
            recurrence_type: RecurrenceType::Daily,
            weekly_days: Vec::new(),
            monthly_day: default_monthly_day(),
            trigger_time: default_trigger_time(),
            is_enabled: value.enabled,
            is_completed: false,
            next_trigger_at: value.next_trigger_at,
            last_triggered_at: value.last_triggered_at,
            created_at: Some(value.created_at),
            updated_at: Some(value.updated_at),
        };

        match value.schedule {
            Schedule::OneTime { at, completed } => {
                record.one_time_at = at;
                record.is_completed = completed;
                if let Some(at) = at {
                    record.trigger_time = at.time();
                }
            }
            Schedule::Recurring(recurrence) => {
                record.mode = ReminderMode::Recurring;
                record.trigger_time = recurrence.time.into_time();
                match recurrence.kind {
                    RecurrenceKind::Daily => {}
                    RecurrenceKind::Weekly(days) => {
                        record.recurrence_type = RecurrenceType::Weekly;
                        record.weekly_days = days.iter().collect();
                    }
                    RecurrenceKind::Monthly(day) => {
                        record.recurrence_type = RecurrenceType::Monthly;
                        record.monthly_day = day.get() as i64;
                    }
                }
            }
        }

        record
    }
}

/// The result still needs normalizing: `next_trigger_at` is taken from disk as is.
impl From<ReminderRecord> for Reminder {
    fn from(value: ReminderRecord) -> Self {
        let schedule = match value.mode {
            ReminderMode::OneTime => Schedule::OneTime {
                at: value.one_time_at,
                completed: value.is_completed,
            },
            ReminderMode::Recurring => Schedule::Recurring(Recurrence {
                time: TriggerTime::new(value.trigger_time),
                kind: parse_kind(
                    value.recurrence_type,
                    value.weekly_days,
                    value.monthly_day,
                ),
            }),
        };

        let created_at = value.created_at.or(value.updated_at).unwrap_or_else(|| {
            log::warn!("Reminder {} has no timestamps, stamping it now", value.id);
            LocalClock.now()
        });

        Self {
            id: value.id,
            description: value.description,
            schedule,
            enabled: value.is_enabled,
            next_trigger_at: value.next_trigger_at,
            last_triggered_at: value.last_triggered_at,
            created_at,
            updated_at: value.updated_at.unwrap_or(created_at),
        }
    }
}

fn parse_kind(kind: RecurrenceType, weekly_days: Vec<Weekday>, monthly_day: i64) -> RecurrenceKind {
    match kind {
        RecurrenceType::Daily => RecurrenceKind::Daily,
        RecurrenceType::Weekly => RecurrenceKind::Weekly(weekly_days.into_iter().collect::<Weekdays>()),
        RecurrenceType::Monthly => {
            if !(MonthDay::FIRST as i64..=MonthDay::LAST as i64).contains(&monthly_day) {
                log::warn!("Monthly day {} is out of range, clamping", monthly_day);
            }
            RecurrenceKind::Monthly(MonthDay::new(monthly_day))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn record_uses_camel_case_and_weekday_names() {
        let json = r#"{
            "id": "6f1c5a0e-3f5b-4b8e-9a52-3e0c2d3a9b10",
            "description": "Gym",
            "mode": "Recurring",
            "recurrenceType": "Weekly",
            "weeklyDays": ["Mon", "Wed", "Mon"],
            "triggerTime": "18:30:00",
            "createdAt": "2024-01-01T00:00:00",
            "updatedAt": "2024-01-01T00:00:00"
        }"#;

        let record: ReminderRecord = serde_json::from_str(json).unwrap();
        let reminder = Reminder::from(record);

        let Schedule::Recurring(recurrence) = reminder.schedule() else {
            panic!("expected a recurring schedule");
        };
        let RecurrenceKind::Weekly(days) = recurrence.kind else {
            panic!("expected a weekly recurrence");
        };
        assert_eq!(days.iter().collect::<Vec<_>>(), vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(recurrence.time.to_string(), "18:30:00");
        assert!(reminder.is_enabled());
    }

    #[test]
    fn out_of_range_monthly_day_is_clamped() {
        let record = ReminderRecord {
            id: Uuid::new_v4(),
            description: "Rent".to_owned(),
            mode: ReminderMode::Recurring,
            one_time_at: None,
            recurrence_type: RecurrenceType::Monthly,
            weekly_days: Vec::new(),
            monthly_day: 45,
            trigger_time: default_trigger_time(),
            is_enabled: true,
            is_completed: false,
            next_trigger_at: None,
            last_triggered_at: None,
            created_at: Some(at(2024, 1, 1, 0, 0, 0)),
            updated_at: Some(at(2024, 1, 1, 0, 0, 0)),
        };

        let reminder = Reminder::from(record);

        assert_eq!(
            reminder.schedule(),
            &Schedule::Recurring(Recurrence::monthly(MonthDay::new(31), TriggerTime::default()))
        );
    }

    #[test]
    fn one_time_record_carries_trigger_time_of_instant() {
        let now = at(2024, 3, 1, 7, 0, 0);
        let reminder = Reminder::new(
            crate::reminder::ReminderDraft::new(
                "Dentist",
                crate::reminder::Cadence::Once(at(2024, 3, 2, 14, 15, 0)),
            ),
            now,
        );

        let record = ReminderRecord::from(&reminder);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["mode"], "OneTime");
        assert_eq!(json["oneTimeAt"], "2024-03-02T14:15:00");
        assert_eq!(json["triggerTime"], "14:15:00");
        assert_eq!(json["nextTriggerAt"], "2024-03-02T14:15:00");
        assert_eq!(json["weeklyDays"], serde_json::json!([]));
        assert_eq!(Reminder::from(record), reminder);
    }

    #[test]
    fn record_without_timestamps_still_loads() {
        let json = r#"{ "description": "Water plants", "mode": "Recurring" }"#;

        let record: ReminderRecord = serde_json::from_str(json).unwrap();
        let reminder = Reminder::from(record);

        assert_eq!(reminder.description(), "Water plants");
        assert_eq!(reminder.created_at(), reminder.updated_at());
    }

    #[test]
    fn missing_created_at_falls_back_to_updated_at() {
        let json = r#"{ "mode": "Recurring", "updatedAt": "2024-05-01T12:00:00" }"#;

        let reminder = Reminder::from(serde_json::from_str::<ReminderRecord>(json).unwrap());

        assert_eq!(reminder.created_at(), at(2024, 5, 1, 12, 0, 0));
        assert_eq!(reminder.updated_at(), at(2024, 5, 1, 12, 0, 0));
    }
}
