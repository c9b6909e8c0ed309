use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Headless commands log to stderr.
    Stderr,
    /// The terminal UI owns the screen: log to the configured file, or nowhere.
    Tui,
}

fn filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
}

/// Install the global tracing subscriber.
pub fn init(config: &Config, target: LogTarget) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(config));

    let installed = match (target, &config.log_file) {
        (LogTarget::Stderr, _) => builder.with_writer(std::io::stderr).try_init(),
        (LogTarget::Tui, Some(path)) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        (LogTarget::Tui, None) => builder.with_writer(std::io::sink).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))
}
