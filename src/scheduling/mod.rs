pub mod clock;
mod manager;
pub mod normalizer;
pub mod recurrence;
mod sweep;
mod worker;

pub use clock::{Clock, LocalClock};
pub use manager::{ManagerRequest, ManagerResponse, ReminderManager};
pub use sweep::FiredReminder;
pub use worker::{ManagerSender, SweepWorker};
#[cfg(test)]
pub use worker::SweepTask;
