mod appsettings;
mod cli;
mod delivery;
mod reminder;
mod scheduling;
mod storage;

use clap::Parser;

use crate::{appsettings::AppSettings, cli::Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    if std::env::var_os("RUST_LOG").is_none() {
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        pretty_env_logger::init();
    }

    let cli = Cli::parse();
    let settings = AppSettings::load()?;
    log::debug!("Settings: {settings:?}");

    cli::execute(cli, settings).await
}
