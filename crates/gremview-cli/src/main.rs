//! Gremview CLI
//!
//! Command-line entry point for the Gremview server and one-shot queries.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use gremview_cli::config_handlers::handle_config_command;
use gremview_cli::{Cli, Command, commands};
use gremview_core::GremviewConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,gremview=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Config { action } => handle_config_command(config_path, action)?,
        Command::Serve { bind, port } => {
            commands::serve(GremviewConfig::load(config_path)?, bind, port).await?
        }
        Command::Query(args) => commands::query(GremviewConfig::load(config_path)?, args).await?,
        Command::Ping(args) => commands::ping(GremviewConfig::load(config_path)?, args).await?,
    }
    Ok(())
}
