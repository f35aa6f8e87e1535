//! carlist-e2e: run the car list end-to-end scenarios
//!
//! ## Usage
//!
//! ```bash
//! carlist-e2e run                         # Regression suite against localhost:3000
//! carlist-e2e run --simulate --extended   # In-memory application, extra checks
//! carlist-e2e run --format junit -o e2e.xml
//! carlist-e2e list --format yaml          # Catalog as loadable YAML
//! carlist-e2e config                      # Resolved configuration
//! ```

use carlist_e2e_cli::{execute_config, execute_list, execute_run, logging, Cli, CliConfig, CliResult, Commands};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    logging::init(&config)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run(ref args) => execute_run(&config, config_path, args),
        Commands::List(ref args) => execute_list(&config, args).map(|()| true),
        Commands::Config(ref args) => execute_config(config_path, args).map(|()| true),
    }
}
