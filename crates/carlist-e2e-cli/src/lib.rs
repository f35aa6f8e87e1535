//! carlist-e2e CLI library
//!
//! Command-line interface for the car list end-to-end harness.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, ListFormat, ReportFormat, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ConsoleReporter;
pub use runner::{execute_config, execute_list, execute_run, harness_config, render_report, select_scenarios};
