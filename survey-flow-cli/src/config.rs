use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "SURVEY_FLOW_CONFIG";
/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "survey-flow.toml";

const SESSIONS_DIR_ENV: &str = "SURVEY_FLOW_SESSIONS_DIR";
const TEMPLATES_DIR_ENV: &str = "SURVEY_FLOW_TEMPLATES_DIR";
const LOG_ENV: &str = "SURVEY_FLOW_LOG";

/// Runner configuration, read from `survey-flow.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `<session>.json` payloads.
    pub sessions_dir: PathBuf,
    /// Directory of template overrides (`<identifier>_template.tmpl`).
    pub templates_dir: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Where logs go while the terminal UI is active.
    pub log_file: Option<PathBuf>,
    pub tui: TuiConfig,

    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sessions_dir: PathBuf::from("sessions"),
            templates_dir: None,
            log_filter: "survey_flow=info".to_string(),
            log_file: None,
            tui: TuiConfig::default(),
            source: None,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            title: "Survey".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the TOML file and environment variables.
    ///
    /// The file is `explicit` if given, else `SURVEY_FLOW_CONFIG`, else
    /// `survey-flow.toml`. Only a missing `survey-flow.toml` means defaults;
    /// a named file that is missing, or any file that cannot be read or
    /// parsed, is an error.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let mut config = match &named {
            Some(path) => Self::read(path, true)?,
            None => Self::read(Path::new(DEFAULT_CONFIG_FILE), false)?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read and parse `path`.
    ///
    /// When the file is not `required`, a missing file yields the defaults.
    /// Every other read error is reported.
    fn read(path: &Path, required: bool) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut config = Self::from_toml(&content)
                    .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;
                config.source = Some(path.to_path_buf());
                Ok(config)
            }
            Err(e) if !required && e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => anyhow::bail!("Failed to read config file {}: {e}", path.display()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment overrides, looked up through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(SESSIONS_DIR_ENV) {
            self.sessions_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(TEMPLATES_DIR_ENV) {
            self.templates_dir = Some(PathBuf::from(dir));
        }
        if let Some(filter) = lookup(LOG_ENV) {
            self.log_filter = filter;
        }
    }
}
