use chrono::{Local, NaiveDateTime, Timelike};

/// Source of "now" for the scheduler, in local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        truncate_to_second(Local::now().naive_local())
    }
}

pub fn truncate_to_second(instant: NaiveDateTime) -> NaiveDateTime {
    instant.with_nanosecond(0).unwrap_or(instant)
}
