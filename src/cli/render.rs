use chrono::NaiveDateTime;

use crate::{
    reminder::{RecurrenceKind, Reminder, Schedule},
    scheduling::ManagerResponse,
};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SHORT_ID_LEN: usize = 8;

pub fn rule_text(schedule: &Schedule) -> String {
    match schedule {
        Schedule::OneTime { at: Some(at), .. } => format!("Once {}", at.format(DATE_TIME_FORMAT)),
        Schedule::OneTime { at: None, .. } => "Once (no date)".to_owned(),
        Schedule::Recurring(recurrence) => match recurrence.kind {
            RecurrenceKind::Daily => format!("Daily {}", recurrence.time),
            RecurrenceKind::Weekly(days) => format!("Weekly ({days}) {}", recurrence.time),
            RecurrenceKind::Monthly(day) => {
                format!("Monthly day {} {}", day.get(), recurrence.time)
            }
        },
    }
}

pub fn state_text(reminder: &Reminder) -> &'static str {
    if reminder.is_completed() {
        "completed"
    } else if reminder.is_enabled() {
        "enabled"
    } else {
        "disabled"
    }
}

fn instant_text(instant: Option<NaiveDateTime>) -> String {
    instant.map_or_else(|| "-".to_owned(), |at| at.format(DATE_TIME_FORMAT).to_string())
}

pub fn reminder_line(reminder: &Reminder) -> String {
    let id = reminder.id().to_string();
    format!(
        "{}  {}  {}  [{}]  last: {}  next: {}",
        &id[..SHORT_ID_LEN],
        reminder.display_description(),
        rule_text(reminder.schedule()),
        state_text(reminder),
        instant_text(reminder.last_triggered_at()),
        instant_text(reminder.next_trigger_at())
    )
}

pub fn response_text(response: &ManagerResponse) -> String {
    match response {
        ManagerResponse::Listing(reminders) if reminders.is_empty() => "No reminders.".to_owned(),
        ManagerResponse::Listing(reminders) => reminders
            .iter()
            .map(reminder_line)
            .collect::<Vec<_>>()
            .join("\n"),
        ManagerResponse::Added(reminder) => format!("Added {}", reminder_line(reminder)),
        ManagerResponse::Updated(reminder) => format!("Updated {}", reminder_line(reminder)),
        ManagerResponse::Removed(reminder) => format!("Removed {}", reminder_line(reminder)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, Weekday};

    use super::*;
    use crate::reminder::{Cadence, MonthDay, Recurrence, ReminderDraft, TriggerTime, Weekdays};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn time(h: u32) -> TriggerTime {
        TriggerTime::new(NaiveTime::from_hms_opt(h, 0, 0).unwrap())
    }

    #[test]
    fn rules_read_like_the_list_view() {
        let weekly = Recurrence::weekly([Weekday::Wed, Weekday::Mon].into_iter().collect(), time(8));

        assert_eq!(
            rule_text(&Schedule::OneTime { at: Some(at(2024, 3, 10, 14, 30)), completed: false }),
            "Once 2024-03-10 14:30:00"
        );
        assert_eq!(rule_text(&Schedule::Recurring(Recurrence::daily(time(9)))), "Daily 09:00:00");
        assert_eq!(rule_text(&Schedule::Recurring(weekly)), "Weekly (Mon,Wed) 08:00:00");
        assert_eq!(
            rule_text(&Schedule::Recurring(Recurrence::monthly(MonthDay::new(31), time(10)))),
            "Monthly day 31 10:00:00"
        );
        assert_eq!(
            rule_text(&Schedule::Recurring(Recurrence::weekly(Weekdays::EMPTY, time(8)))),
            "Weekly (unspecified) 08:00:00"
        );
    }

    #[test]
    fn state_distinguishes_completed_from_disabled() {
        let now = at(2024, 1, 1, 8, 0);
        let mut recurring = Reminder::new(
            ReminderDraft::new("Walk", Cadence::Recurring(Recurrence::daily(time(9)))),
            now,
        );
        let expired = Reminder::new(ReminderDraft::new("", Cadence::Once(at(2023, 1, 1, 8, 0))), now);

        assert_eq!(state_text(&recurring), "enabled");
        recurring.set_enabled(false, now);
        assert_eq!(state_text(&recurring), "disabled");

        let mut fired = expired.clone();
        crate::scheduling::normalizer::mark_triggered(&mut fired, now);
        assert_eq!(state_text(&fired), "completed");
        assert!(reminder_line(&fired).contains("  Reminder  "));
        assert!(reminder_line(&fired).ends_with("last: 2024-01-01 08:00:00  next: -"));
    }

    #[test]
    fn empty_listing_says_so() {
        assert_eq!(response_text(&ManagerResponse::Listing(Vec::new())), "No reminders.");
    }
}
