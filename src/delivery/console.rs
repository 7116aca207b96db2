use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, stdout};

use crate::scheduling::FiredReminder;

use super::{Placement, ReminderDeliveryChannel, SlotAllocator};

/// Prints notifications to the terminal. Each one holds a slot in its zone for as long
/// as it is considered on screen.
pub struct ConsoleDeliveryChannel {
    slots: Arc<SlotAllocator>,
    placement: Placement,
    display_for: Duration,
    bell: bool,
}

impl ConsoleDeliveryChannel {
    pub fn new(
        slots: Arc<SlotAllocator>,
        placement: Placement,
        display_for: Duration,
        bell: bool,
    ) -> Self {
        Self {
            slots,
            placement,
            display_for,
            bell,
        }
    }
}

#[async_trait]
impl ReminderDeliveryChannel for ConsoleDeliveryChannel {
    async fn send_reminder_notification(&self, reminder: &FiredReminder) -> anyhow::Result<()> {
        let lease = self.slots.lease(self.placement);
        let mut text = format_notification(reminder, lease.zone(), lease.index());
        if self.bell {
            text.insert(0, '\x07');
        }

        let mut out = stdout();
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;

        log::info!(
            "Notification shown. [reminder_id = {}, zone = {}, slot = {}]",
            reminder.id,
            lease.zone(),
            lease.index()
        );

        tokio::time::sleep(self.display_for).await;
        Ok(())
    }
}

pub(crate) fn format_notification(reminder: &FiredReminder, zone: Placement, slot: usize) -> String {
    format!(
        "🔔 [{zone} #{slot}] {} ({})\n",
        reminder.message,
        reminder.fired_at.format("%Y-%m-%d %H:%M:%S")
    )
}
