use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use survey_flow::{
    BundledTemplates, DirectorySource, DirectoryTemplates, FileSource, LayeredTemplates,
    NavigationController, NavigationState, QuestionSequence, QuestionSource, TemplateRenderer,
    TemplateStore, TypeCode, template_for,
};
use survey_flow_tui::{TuiError, TuiFrontend};
use tracing::{info, warn};

use crate::config::Config;

/// Where a session's questions and templates come from.
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Session identifier; `<sessions_dir>/<SESSION>.json` is loaded
    pub session: String,

    /// Read the questions from this file instead of the sessions directory
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Directory of template overrides
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl SessionArgs {
    fn source(&self, config: &Config) -> Box<dyn QuestionSource> {
        match &self.file {
            Some(path) => Box::new(FileSource::new(path)),
            None => Box::new(DirectorySource::new(&config.sessions_dir)),
        }
    }

    fn store(&self, config: &Config) -> Box<dyn TemplateStore> {
        match self.templates.as_ref().or(config.templates_dir.as_ref()) {
            Some(dir) => Box::new(LayeredTemplates::new(
                DirectoryTemplates::new(dir),
                BundledTemplates::new(),
            )),
            None => Box::new(BundledTemplates::new()),
        }
    }

    fn fetch(&self, config: &Config) -> anyhow::Result<QuestionSequence> {
        self.source(config)
            .fetch(&self.session)
            .with_context(|| format!("Failed to load session {:?}", self.session))
    }
}

/// Run a session in the terminal.
pub fn run(args: &SessionArgs, title: Option<String>, config: &Config) -> anyhow::Result<ExitCode> {
    let sequence = args.fetch(config)?;
    let store = args.store(config);
    let mut controller = NavigationController::with_store(sequence, store);
    let frontend = TuiFrontend::new().with_title(title.unwrap_or_else(|| config.tui.title.clone()));

    match controller.run(&frontend) {
        Ok(NavigationState::Done) => {
            println!(
                "Survey complete: {} questions answered.",
                controller.sequence().len()
            );
        }
        Ok(state) => println!("Survey stopped at {state}."),
        Err(err) if err.downcast_ref::<TuiError>().is_some_and(TuiError::is_cancelled) => {
            info!(state = %controller.state(), "session cancelled");
            eprintln!("Survey cancelled.");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err),
    }

    for diagnostic in controller.diagnostics() {
        warn!("{diagnostic}");
        eprintln!("warning: {diagnostic}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Render every question of a session headlessly and report problems.
pub fn check(args: &SessionArgs, verbose: bool, config: &Config, out: &mut impl Write) -> anyhow::Result<ExitCode> {
    let sequence = args.fetch(config)?;
    let renderer = TemplateRenderer::new(args.store(config));
    check_sequence(&sequence, &renderer, verbose, out)
}

fn check_sequence<S: TemplateStore>(
    sequence: &QuestionSequence,
    renderer: &TemplateRenderer<S>,
    verbose: bool,
    out: &mut impl Write,
) -> anyhow::Result<ExitCode> {
    let mut problems = 0;
    for (index, question) in sequence.iter().enumerate() {
        let rendered = renderer.render_question(index, question);
        match &rendered.diagnostic {
            Some(diagnostic) => {
                problems += 1;
                writeln!(out, "{index:>3}  {:<3} {diagnostic}", question.kind())?;
            }
            None => writeln!(
                out,
                "{index:>3}  {:<3} ok ({} controls)",
                question.kind(),
                rendered.fragment.controls().len()
            )?,
        }
        if verbose && !rendered.fragment.is_empty() {
            for line in rendered.fragment.text().lines() {
                writeln!(out, "       | {line}")?;
            }
        }
    }
    writeln!(out, "{} questions, {problems} problems", sequence.len())?;
    Ok(if problems == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// List the supported question types.
pub fn types(out: &mut impl Write) -> anyhow::Result<ExitCode> {
    writeln!(out, "{:<5} {:<18} TEMPLATE", "CODE", "NAME")?;
    for code in TypeCode::ALL {
        writeln!(
            out,
            "{:<5} {:<18} {}",
            code.code(),
            code.display_name(),
            template_for(code).key()
        )?;
    }
    Ok(ExitCode::SUCCESS)
}
