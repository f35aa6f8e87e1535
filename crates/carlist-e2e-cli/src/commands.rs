//! CLI command definitions using clap

use carlist_e2e::{ENV_BASE_URL, ENV_DRIVER_PATH};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// carlist-e2e: end-to-end scenarios for the car list application
#[derive(Parser, Debug)]
#[command(name = "carlist-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only failures and the summary)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the application
    Run(RunArgs),

    /// List the scenario catalog
    List(ListArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Application root URL
    #[arg(long, env = ENV_BASE_URL)]
    pub base_url: Option<String>,

    /// Chromium executable
    #[arg(long, env = ENV_DRIVER_PATH)]
    pub driver_path: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Only run scenarios whose name contains this
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Load scenarios from a YAML file instead of the catalog
    #[arg(short, long)]
    pub scenarios: Option<PathBuf>,

    /// Include checks beyond the regression suite
    #[arg(long)]
    pub extended: bool,

    /// Maximum concurrent scenarios (needs an isolating backend)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Stop after the first scenario that does not pass
    #[arg(long)]
    pub fail_fast: bool,

    /// Run against the in-memory application (no browser, no HTTP)
    #[arg(long)]
    pub simulate: bool,

    /// Default wait timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Default poll interval in milliseconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Include checks beyond the regression suite
    #[arg(long)]
    pub extended: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ListFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug, Default)]
pub struct ConfigArgs {
    /// Only check the configuration, print nothing
    #[arg(long)]
    pub check: bool,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON report
    Json,
    /// JUnit XML for CI
    Junit,
}

/// Catalog listing format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListFormat {
    /// One scenario per line
    #[default]
    Text,
    /// Scenarios as YAML, loadable with `run --scenarios`
    Yaml,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
