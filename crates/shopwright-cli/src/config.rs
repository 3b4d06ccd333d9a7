//! CLI configuration

use crate::commands::{ColorArg, EnvArgs};
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use shopwright::SuiteConfig;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - step-level logs
    Verbose,
    /// Debug - everything
    Debug,
}

impl Verbosity {
    /// From `-q` and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "shopwright=info,warn",
            Self::Debug => "shopwright=debug,info",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Log as JSON lines
    pub log_json: bool,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set JSON logging
    #[must_use]
    pub const fn with_log_json(mut self, log_json: bool) -> Self {
        self.log_json = log_json;
        self
    }
}

/// Resolve the suite configuration.
///
/// Loads `--env-file` (or `./.env` when present), then reads the process
/// environment. `--base-url` wins over `BASE_URL`.
pub fn load_suite_config(env: &EnvArgs) -> CliResult<SuiteConfig> {
    match &env.env_file {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| {
                CliError::config(format!("failed to load {}: {e}", path.display()))
            })?;
        }
        None => {
            // A missing .env is normal; variables may come from the shell.
            let _ = dotenvy::dotenv();
        }
    }
    suite_config_from(env, |key| std::env::var(key).ok())
}

/// Build the suite configuration from CLI overrides and a variable lookup
pub fn suite_config_from<F>(env: &EnvArgs, lookup: F) -> CliResult<SuiteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = SuiteConfig::from_lookup(|key| match key {
        "BASE_URL" => env.base_url.clone().or_else(|| lookup(key)),
        _ => lookup(key),
    })?;
    Ok(config)
}
