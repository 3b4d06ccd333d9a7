//! Shopwright CLI Library
//!
//! Command-line surface for running the Demo Web Shop checkout scenarios.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, EnvArgs, FormatArg, PaymentArg, RunArgs,
};
pub use config::{load_suite_config, suite_config_from, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{Reporter, RunReport};
pub use runner::{build_runner, select_scenarios};
