mod console;
mod slots;

pub use console::ConsoleDeliveryChannel;
pub use slots::{Placement, SlotAllocator};

use async_trait::async_trait;

use crate::scheduling::FiredReminder;

/// Presents fired reminders to the user.
///
/// Called fire-and-forget: the sweep never waits for the notification to be dismissed.
#[async_trait]
pub trait ReminderDeliveryChannel: Send + Sync + 'static {
    async fn send_reminder_notification(&self, reminder: &FiredReminder) -> anyhow::Result<()>;
}
