use chrono::{NaiveDate, NaiveTime, Weekday};
use clap::Subcommand;
use thiserror::Error;

use crate::reminder::{Cadence, MonthDay, Recurrence, ReminderDraft, TriggerTime, Weekdays};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Description must not be empty")]
    EmptyDescription,
    #[error("Invalid time '{0}', expected HH:MM or HH:MM:SS")]
    InvalidTime(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Unknown weekday '{0}'")]
    InvalidWeekday(String),
    #[error("Pick at least one weekday")]
    NoWeekdays,
    #[error("Day of month must be between 1 and 31, got '{0}'")]
    MonthDayOutOfRange(String),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleArgs {
    /// Fire once at a date and time
    Once {
        /// YYYY-MM-DD
        date: String,
        /// HH:MM or HH:MM:SS
        time: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Fire every day
    Daily {
        time: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Fire on selected weekdays
    Weekly {
        /// Comma separated, e.g. mon,wed,fri
        days: String,
        time: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Fire on a day of the month, clamped to the month's last day
    Monthly {
        /// 1-31
        day: String,
        time: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
}

impl TryFrom<ScheduleArgs> for ReminderDraft {
    type Error = DraftError;

    fn try_from(value: ScheduleArgs) -> Result<Self, Self::Error> {
        let (cadence, text) = match value {
            ScheduleArgs::Once { date, time, text } => {
                let date = parse_date(&date)?;
                let time = parse_time(&time)?;
                (Cadence::Once(date.and_time(time)), text)
            }
            ScheduleArgs::Daily { time, text } => {
                let time = TriggerTime::new(parse_time(&time)?);
                (Cadence::Recurring(Recurrence::daily(time)), text)
            }
            ScheduleArgs::Weekly { days, time, text } => {
                let days = parse_weekdays(&days)?;
                let time = TriggerTime::new(parse_time(&time)?);
                (Cadence::Recurring(Recurrence::weekly(days, time)), text)
            }
            ScheduleArgs::Monthly { day, time, text } => {
                let day = parse_month_day(&day)?;
                let time = TriggerTime::new(parse_time(&time)?);
                (Cadence::Recurring(Recurrence::monthly(day, time)), text)
            }
        };

        let description = text.join(" ").trim().to_owned();
        if description.is_empty() {
            return Err(DraftError::EmptyDescription);
        }
        Ok(ReminderDraft::new(description, cadence))
    }
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, DraftError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| DraftError::InvalidTime(raw.to_owned()))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, DraftError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| DraftError::InvalidDate(raw.to_owned()))
}

pub fn parse_weekdays(raw: &str) -> Result<Weekdays, DraftError> {
    let days = raw
        .split(',')
        .map(str::trim)
        .filter(|day| !day.is_empty())
        .map(|day| {
            day.parse::<Weekday>()
                .map_err(|_| DraftError::InvalidWeekday(day.to_owned()))
        })
        .collect::<Result<Weekdays, _>>()?;

    if days.is_empty() {
        return Err(DraftError::NoWeekdays);
    }
    Ok(days)
}

fn parse_month_day(raw: &str) -> Result<MonthDay, DraftError> {
    match raw.trim().parse::<i64>() {
        Ok(day) if (MonthDay::FIRST as i64..=MonthDay::LAST as i64).contains(&day) => {
            Ok(MonthDay::new(day))
        }
        _ => Err(DraftError::MonthDayOutOfRange(raw.trim().to_owned())),
    }
}
