//! Conductor - multi-agent workflow engine
//!
//! Main entry point for the Conductor CLI and server.

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;

use conductor_config::ConfigLoader;

mod cli;
mod cmd_approvals;
mod cmd_run;
mod register;
mod server;

use cli::{Cli, Commands};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Get the .conductor directory path.
pub(crate) fn conductor_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".conductor"))
        .unwrap_or_else(|| PathBuf::from(".conductor"))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    server::init_tracing()?;

    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    if !cli.config.exists() {
        warn!("Config file {} not found, using defaults", cli.config.display());
    }

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });
    match command {
        Commands::Serve { host, port } => server::run_server(config, host, port).await,
        Commands::Run {
            target,
            inputs,
            timeout,
        } => cmd_run::run_workflow(&config, &target, &inputs, timeout).await,
        Commands::Validate { file } => cmd_run::validate_workflow(&config, &file).await,
        Commands::Approvals { action } => cmd_approvals::handle(&config, action).await,
        Commands::Health => server::print_health(&config).await,
    }
}
