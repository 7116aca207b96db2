use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::reminder::{MonthDay, Recurrence, RecurrenceKind, Weekdays};

/// Two weeks, so every weekday shows up at least once even when today's slot already passed.
const WEEKLY_SEARCH_DAYS: u64 = 14;

/// Earliest instant strictly after `after` matching the recurrence.
///
/// `None` means no occurrence exists: the weekly search window came up empty, or the
/// calendar ran out of representable dates.
pub fn next_occurrence(recurrence: &Recurrence, after: NaiveDateTime) -> Option<NaiveDateTime> {
    let time = *recurrence.time.time();
    match recurrence.kind {
        RecurrenceKind::Daily => next_daily(time, after),
        RecurrenceKind::Weekly(days) => next_weekly(time, days, after),
        RecurrenceKind::Monthly(day) => next_monthly(time, day, after),
    }
}

fn next_daily(time: NaiveTime, after: NaiveDateTime) -> Option<NaiveDateTime> {
    let candidate = after.date().and_time(time);
    if candidate > after {
        Some(candidate)
    } else {
        candidate.checked_add_days(Days::new(1))
    }
}

fn next_weekly(time: NaiveTime, days: Weekdays, after: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = after.date();
    let days = if days.is_empty() {
        Weekdays::single(today.weekday())
    } else {
        days
    };

    (0..WEEKLY_SEARCH_DAYS)
        .map_while(|offset| today.checked_add_days(Days::new(offset)))
        .filter(|date| days.contains(date.weekday()))
        .map(|date| date.and_time(time))
        .find(|candidate| *candidate > after)
}

fn next_monthly(time: NaiveTime, day: MonthDay, after: NaiveDateTime) -> Option<NaiveDateTime> {
    let this_month = after.date().with_day(1)?;
    let candidate = clamp_to_month(this_month, day)?.and_time(time);
    if candidate > after {
        return Some(candidate);
    }

    let next_month = this_month.checked_add_months(Months::new(1))?;
    Some(clamp_to_month(next_month, day)?.and_time(time))
}

fn clamp_to_month(first_of_month: NaiveDate, day: MonthDay) -> Option<NaiveDate> {
    let last_day = days_in_month(first_of_month)?;
    first_of_month.with_day(day.get().min(last_day))
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> Option<u32> {
    let first = date.with_day(1)?;
    let next = first.checked_add_months(Months::new(1))?;
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}
