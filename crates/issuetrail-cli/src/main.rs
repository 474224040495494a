mod cli;
mod commands;
mod logging;
mod report;

use anyhow::Result;
use clap::Parser;
use issuetrail_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Flushed when dropped at the end of main
    let _log_guard = logging::init(&config.logging.level, config.logging.file.as_deref())?;

    commands::run::handle(cli, config).await
}
