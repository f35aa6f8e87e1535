//! Command handlers

use crate::commands::{ConfigArgs, ListArgs, ListFormat, ReportFormat, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ConsoleReporter;
use carlist_e2e::mock::SimulatedCarList;
use carlist_e2e::{catalog, load_scenarios, HarnessConfig, RunnerOptions, Scenario, ScenarioRunner, SuiteReport};
use std::path::Path;

/// Resolve the harness configuration: file and environment, then flags
pub fn harness_config(config_path: Option<&Path>, args: &RunArgs) -> CliResult<HarnessConfig> {
    let mut config = HarnessConfig::resolve(config_path)?;
    if let Some(ref url) = args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(ref path) = args.driver_path {
        config.driver_path = Some(path.clone());
    }
    if args.headed {
        config.headless = false;
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if let Some(timeout) = args.timeout {
        config.default_timeout_ms = timeout;
    }
    if let Some(poll) = args.poll_interval {
        config.poll_interval_ms = poll;
    }
    config.fail_fast |= args.fail_fast;
    config.validate()?;
    Ok(config)
}

/// Scenarios named by the arguments, before the name filter
pub fn select_scenarios(scenarios_file: Option<&Path>, extended: bool) -> CliResult<Vec<Scenario>> {
    match scenarios_file {
        Some(path) => Ok(load_scenarios(path)?),
        None if extended => Ok(catalog::extended()),
        None => Ok(catalog::all()),
    }
}

fn runner_options(config: &HarnessConfig, args: &RunArgs) -> RunnerOptions {
    let options = RunnerOptions::from_config(config);
    match args.filter {
        Some(ref filter) => options.with_filter(filter.clone()),
        None => options,
    }
}

#[cfg(feature = "browser")]
fn live_runner(config: &HarnessConfig, options: RunnerOptions) -> CliResult<ScenarioRunner> {
    let gateway = carlist_e2e::HttpResetGateway::from_config(config)?;
    let factory = carlist_e2e::ChromiumFactory::new(config.driver_config())?;
    Ok(ScenarioRunner::new(gateway, factory, options))
}

#[cfg(not(feature = "browser"))]
fn live_runner(_config: &HarnessConfig, _options: RunnerOptions) -> CliResult<ScenarioRunner> {
    Err(CliError::config(
        "browser support not compiled in; rebuild with --features browser or use --simulate",
    ))
}

/// Render a report in the requested format
pub fn render_report(report: &SuiteReport, format: ReportFormat, console: &ConsoleReporter) -> CliResult<String> {
    Ok(match format {
        ReportFormat::Text => console.render_suite(report),
        ReportFormat::Json => {
            let mut json = report.to_json()?;
            json.push('\n');
            json
        }
        ReportFormat::Junit => report.render_junit(),
    })
}

/// Run scenarios; returns whether every one passed
pub fn execute_run(cli: &CliConfig, config_path: Option<&Path>, args: &RunArgs) -> CliResult<bool> {
    let config = harness_config(config_path, args)?;
    let scenarios = select_scenarios(args.scenarios.as_deref(), args.extended)?;
    let options = runner_options(&config, args);

    if let Some(ref filter) = options.filter {
        if !scenarios.iter().any(|s| s.name.contains(filter.as_str())) {
            return Err(CliError::invalid_argument(format!("no scenario matches filter {filter:?}")));
        }
    }

    let runner = if args.simulate {
        tracing::info!("running against the simulated application");
        let app = SimulatedCarList::new();
        ScenarioRunner::new(app.clone(), app, options)
    } else {
        tracing::info!(base_url = %config.base_url, headless = config.headless, "running against live application");
        live_runner(&config, options)?
    };

    let report = runner.run_all(&scenarios);

    let console = ConsoleReporter::new(cli.color.should_color() && args.output.is_none(), cli.verbosity.is_quiet());
    match args.output {
        Some(ref path) => {
            let plain = ConsoleReporter::new(false, false);
            report.write_to(path, &render_report(&report, args.format, &plain)?)?;
            console.print(&format!("{}\n", report.summary()));
        }
        None => console.print(&render_report(&report, args.format, &console)?),
    }
    Ok(report.all_passed())
}

/// Print the catalog
pub fn execute_list(cli: &CliConfig, args: &ListArgs) -> CliResult<()> {
    let scenarios = select_scenarios(None, args.extended)?;
    let console = ConsoleReporter::new(cli.color.should_color(), false);
    let text = match args.format {
        ListFormat::Text => console.render_catalog(&scenarios),
        ListFormat::Yaml => serde_yaml_ng::to_string(&scenarios).map_err(carlist_e2e::HarnessError::from)?,
    };
    console.print(&text);
    Ok(())
}

/// Print the resolved configuration
pub fn execute_config(config_path: Option<&Path>, args: &ConfigArgs) -> CliResult<()> {
    let config = harness_config(config_path, &RunArgs::default())?;
    if !args.check {
        ConsoleReporter::new(false, false).print(&config.to_yaml()?);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn simulate(args: RunArgs) -> RunArgs {
        RunArgs {
            simulate: true,
            ..args
        }
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://from-file/\njobs: 2\ndefault_timeout_ms: 3000").unwrap();
        let args = RunArgs {
            base_url: Some("http://from-flag/".to_string()),
            headed: true,
            fail_fast: true,
            ..RunArgs::default()
        };
        let config = harness_config(Some(file.path()), &args).unwrap();
        assert_eq!(config.base_url, "http://from-flag/");
        assert_eq!(config.jobs, 2);
        assert_eq!(config.default_timeout_ms, 3000);
        assert!(!config.headless);
        assert!(config.fail_fast);
    }

    #[test]
    fn test_invalid_timing_rejected() {
        let args = RunArgs {
            timeout: Some(100),
            poll_interval: Some(200),
            ..RunArgs::default()
        };
        assert!(harness_config(None, &args).is_err());
    }

    #[test]
    fn test_select_scenarios() {
        assert_eq!(select_scenarios(None, false).unwrap().len(), 6);
        assert_eq!(select_scenarios(None, true).unwrap().len(), 7);
    }

    #[test]
    fn test_select_from_yaml_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_yaml_ng::to_string(&vec![catalog::sort()]).unwrap().as_bytes())
            .unwrap();
        let scenarios = select_scenarios(Some(file.path()), false).unwrap();
        assert_eq!(scenarios, vec![catalog::sort()]);
    }

    #[test]
    fn test_simulated_run_passes() {
        let args = simulate(RunArgs {
            filter: Some("filter".to_string()),
            ..RunArgs::default()
        });
        assert!(execute_run(&CliConfig::new(), None, &args).unwrap());
    }

    #[test]
    fn test_filter_without_match_is_an_error() {
        let args = simulate(RunArgs {
            filter: Some("delete".to_string()),
            ..RunArgs::default()
        });
        let err = execute_run(&CliConfig::new(), None, &args).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }

    #[test]
    fn test_report_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let args = simulate(RunArgs {
            filter: Some("initial".to_string()),
            format: ReportFormat::Json,
            output: Some(path.clone()),
            ..RunArgs::default()
        });
        assert!(execute_run(&CliConfig::new(), None, &args).unwrap());
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["results"][0]["name"], "initial_load");
        assert_eq!(value["results"][0]["status"], "passed");
    }
}
