use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::delivery::ReminderDeliveryChannel;

use super::{
    clock::Clock,
    manager::{ManagerRequest, ManagerResponse, ReminderManager},
    normalizer::TRIGGER_RESOLUTION,
};

const REQUEST_BUFFER: usize = 32;

#[derive(Debug)]
struct ManagerMessage {
    request: ManagerRequest,
    reply: oneshot::Sender<anyhow::Result<ManagerResponse>>,
}

/// Handle for submitting edits to a running [`SweepWorker`].
#[derive(Clone)]
pub struct ManagerSender(mpsc::Sender<ManagerMessage>);

impl ManagerSender {
    pub async fn send(&self, request: ManagerRequest) -> anyhow::Result<ManagerResponse> {
        let (reply, response) = oneshot::channel();
        self.0
            .send(ManagerMessage { request, reply })
            .await
            .context("Scheduler is not running")?;
        response.await.context("Scheduler stopped before replying")?
    }
}

/// Periodic due check. Owns the manager, so ticks and edits never interleave.
pub struct SweepWorker {
    manager: ReminderManager,
    clock: Arc<dyn Clock>,
    delivery: Arc<dyn ReminderDeliveryChannel>,
    interval: Duration,
}

impl SweepWorker {
    pub fn new(
        manager: ReminderManager,
        clock: Arc<dyn Clock>,
        delivery: Arc<dyn ReminderDeliveryChannel>,
        interval: Duration,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            interval >= TRIGGER_RESOLUTION,
            "Tick interval {interval:?} is finer than the trigger resolution {TRIGGER_RESOLUTION:?}"
        );
        Ok(Self {
            manager,
            clock,
            delivery,
            interval,
        })
    }

    pub fn spawn(self) -> SweepTask {
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();
        let (sender, receiver) = mpsc::channel(REQUEST_BUFFER);

        let task_handle = tokio::spawn(self.run(task_cancellation_token, receiver));

        SweepTask {
            task_handle,
            cancellation_token,
            sender: ManagerSender(sender),
        }
    }

    async fn run(
        mut self,
        cancellation_token: CancellationToken,
        mut receiver: mpsc::Receiver<ManagerMessage>,
    ) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!("Sweep worker started, ticking every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => break,
                _ = interval.tick() => self.sweep_once().await,
                Some(message) = receiver.recv() => {
                    let response = self.manager.handle(message.request, self.clock.now()).await;
                    if message.reply.send(response).is_err() {
                        log::warn!("Requester went away before the reply was sent");
                    }
                }
            }
        }

        if let Err(error) = self.manager.persist().await {
            log::error!("Final save failed: {error:#}");
        }
        log::info!("Sweep worker stopped");
    }

    async fn sweep_once(&mut self) {
        let fired = self.manager.sweep(self.clock.now());
        if fired.is_empty() {
            return;
        }

        for reminder in fired {
            let delivery = Arc::clone(&self.delivery);
            tokio::spawn(async move {
                if let Err(error) = delivery.send_reminder_notification(&reminder).await {
                    log::error!(
                        "Could not deliver notification. [reminder_id = {}]: {error:#}",
                        reminder.id
                    );
                }
            });
        }

        if let Err(error) = self.manager.persist().await {
            log::error!("Could not save after sweep: {error:#}");
        }
    }
}

pub struct SweepTask {
    task_handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
    sender: ManagerSender,
}

impl SweepTask {
    pub fn sender(&self) -> ManagerSender {
        self.sender.clone()
    }

    pub async fn shutdown(self, timeout: Duration) {
        self.cancellation_token.cancel();
        if time::timeout(timeout, self.task_handle).await.is_err() {
            log::warn!("Sweep worker did not stop within {timeout:?}");
        }
    }
}
