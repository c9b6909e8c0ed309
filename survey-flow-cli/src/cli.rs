use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::SessionArgs;

/// Run and check template-driven surveys.
#[derive(Debug, Parser)]
#[command(name = "survey-flow", version, about)]
pub struct Cli {
    /// Configuration file (default: $SURVEY_FLOW_CONFIG or ./survey-flow.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Answer a session interactively in the terminal
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Title shown in the header
        #[arg(long)]
        title: Option<String>,
    },
    /// Render every question headlessly and report diagnostics
    Check {
        #[command(flatten)]
        session: SessionArgs,

        /// Print each rendered fragment
        #[arg(short, long)]
        verbose: bool,
    },
    /// List the supported question types and their templates
    Types,
}
