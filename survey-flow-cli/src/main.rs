use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};

mod cli;
mod commands;
mod config;
mod logging;

use cli::{Cli, Commands};
use config::Config;
use logging::LogTarget;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let target = match cli.command {
        Commands::Run { .. } => LogTarget::Tui,
        _ => LogTarget::Stderr,
    };
    logging::init(&config, target)?;

    match &config.source {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => warn!(
            "no configuration file found, using defaults ({})",
            config::DEFAULT_CONFIG_FILE
        ),
    }

    match &cli.command {
        Commands::Run { session, title } => commands::run(session, title.clone(), &config),
        Commands::Check { session, verbose } => {
            commands::check(session, *verbose, &config, &mut std::io::stdout().lock())
        }
        Commands::Types => commands::types(&mut std::io::stdout().lock()),
    }
}
