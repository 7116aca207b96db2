use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::delivery::Placement;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct StorageSettings {
    pub path: Option<PathBuf>,
}

impl StorageSettings {
    /// Configured path, or `reminders.json` in the platform data directory.
    pub fn reminders_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("", "", "notice")
            .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory, set APP_STORAGE__PATH"))?;
        Ok(dirs.data_dir().join("reminders.json"))
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct SchedulerSettings {
    pub tick_interval_secs: u64,
}

impl SchedulerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct NotificationSettings {
    pub placement: Placement,
    pub display_secs: u64,
    pub bell: bool,
}

impl NotificationSettings {
    pub fn display_for(&self) -> Duration {
        Duration::from_secs(self.display_secs)
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            display_secs: 10,
            bell: true,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub scheduler: SchedulerSettings,
    pub notifications: NotificationSettings,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
