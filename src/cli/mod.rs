mod draft;
mod prompt;
mod render;

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use tokio::io::{BufReader, stdin};

use crate::{
    appsettings::AppSettings,
    delivery::{ConsoleDeliveryChannel, SlotAllocator},
    reminder::ReminderDraft,
    scheduling::{Clock, LocalClock, ManagerRequest, ReminderManager, SweepWorker},
    storage::{JsonFileReminderStorage, StoreLock},
};

pub use draft::{DraftError, ScheduleArgs};
use prompt::PromptExit;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "notice", about = "Desktop reminders: one-time, daily, weekly and monthly")]
pub struct Cli {
    /// Reminder file, overrides the configured storage path
    #[arg(short, long)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch reminders and show notifications (default)
    Run,
    #[command(flatten)]
    Edit(EditCommand),
}

/// Commands accepted both on the command line and at the interactive prompt.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Show all reminders
    List,
    /// Create a reminder
    Add {
        #[command(subcommand)]
        schedule: ScheduleArgs,
    },
    /// Replace a reminder's description and schedule
    Edit {
        /// Id or unique id prefix
        id: String,
        #[command(subcommand)]
        schedule: ScheduleArgs,
    },
    /// Delete a reminder
    Remove { id: String },
    /// Turn a reminder on, reviving completed one-time reminders
    Enable { id: String },
    /// Turn a reminder off
    Disable { id: String },
}

impl TryFrom<EditCommand> for ManagerRequest {
    type Error = DraftError;

    fn try_from(value: EditCommand) -> Result<Self, Self::Error> {
        let request = match value {
            EditCommand::List => ManagerRequest::List,
            EditCommand::Add { schedule } => ManagerRequest::Add(ReminderDraft::try_from(schedule)?),
            EditCommand::Edit { id, schedule } => ManagerRequest::Edit {
                key: id,
                draft: ReminderDraft::try_from(schedule)?,
            },
            EditCommand::Remove { id } => ManagerRequest::Remove { key: id },
            EditCommand::Enable { id } => ManagerRequest::SetEnabled { key: id, enabled: true },
            EditCommand::Disable { id } => ManagerRequest::SetEnabled { key: id, enabled: false },
        };
        Ok(request)
    }
}

pub async fn execute(cli: Cli, settings: AppSettings) -> anyhow::Result<()> {
    let path = match cli.storage {
        Some(path) => path,
        None => settings.storage.reminders_path()?,
    };
    let storage = Arc::new(JsonFileReminderStorage::new(path));
    let lock = StoreLock::acquire(storage.path())?;
    log::info!(
        "Using reminder file {} [lock = {}]",
        storage.path().display(),
        lock.path().display()
    );

    let clock: Arc<dyn Clock> = Arc::new(LocalClock);
    let manager = ReminderManager::load(storage, clock.now()).await?;

    let result = match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_daemon(manager, clock, &settings).await,
        Command::Edit(command) => run_once(manager, clock, command).await,
    };
    drop(lock);
    result
}

async fn run_once(
    mut manager: ReminderManager,
    clock: Arc<dyn Clock>,
    command: EditCommand,
) -> anyhow::Result<()> {
    let request = ManagerRequest::try_from(command)?;
    let response = manager.handle(request, clock.now()).await?;
    println!("{}", render::response_text(&response));
    Ok(())
}

async fn run_daemon(
    manager: ReminderManager,
    clock: Arc<dyn Clock>,
    settings: &AppSettings,
) -> anyhow::Result<()> {
    let delivery = Arc::new(ConsoleDeliveryChannel::new(
        Arc::new(SlotAllocator::new()),
        settings.notifications.placement,
        settings.notifications.display_for(),
        settings.notifications.bell,
    ));
    let task = SweepWorker::new(manager, clock, delivery, settings.scheduler.tick_interval())?.spawn();

    let sender = task.sender();

    tokio::select! {
        exit = prompt::run(BufReader::new(stdin()), &sender) => match exit {
            Ok(PromptExit::Quit) => {}
            Ok(PromptExit::EndOfInput) => {
                log::info!("Input closed, watching reminders until interrupted");
                wait_for_interrupt().await;
            }
            Err(error) => {
                log::error!("Prompt failed: {error:#}");
                wait_for_interrupt().await;
            }
        },
        _ = wait_for_interrupt() => {}
    }

    task.shutdown(SHUTDOWN_TIMEOUT).await;
    Ok(())
}

async fn wait_for_interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Interrupted"),
        Err(error) => log::error!("Could not listen for ctrl-c: {error}"),
    }
}
