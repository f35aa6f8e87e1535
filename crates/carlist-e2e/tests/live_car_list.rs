//! Live regression suite against a running car list application.
//!
//! Needs Chromium and the application at `CARLIST_BASE_URL` (default
//! `http://localhost:3000/`). Run with:
//!
//! ```bash
//! cargo test -p carlist-e2e --test live_car_list -- --ignored
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used)]

use carlist_e2e::prelude::*;

fn live_runner() -> ScenarioRunner {
    let config = HarnessConfig::resolve(None).expect("configuration should resolve");
    config.validate().expect("configuration should be valid");
    let gateway = HttpResetGateway::from_config(&config).expect("reset gateway");
    let factory = ChromiumFactory::new(config.driver_config()).expect("chromium factory");
    ScenarioRunner::new(gateway, factory, RunnerOptions::from_config(&config))
}

fn assert_passes(scenario: &Scenario) {
    let result = live_runner().run(scenario);
    assert!(result.is_passed(), "{}: {:?}", result.name, result.outcome);
}

#[test]
#[ignore = "requires chromium and a running application"]
fn live_initial_load() {
    assert_passes(&catalog::initial_load());
}

#[test]
#[ignore = "requires chromium and a running application"]
fn live_filter() {
    assert_passes(&catalog::filter());
}

#[test]
#[ignore = "requires chromium and a running application"]
fn live_sort() {
    assert_passes(&catalog::sort());
}

#[test]
#[ignore = "requires chromium and a running application"]
fn live_edit() {
    assert_passes(&catalog::edit());
}

#[test]
#[ignore = "requires chromium and a running application"]
fn live_save_validation_error() {
    assert_passes(&catalog::save_validation_error());
}

#[test]
#[ignore = "requires chromium and a running application"]
fn live_create_new() {
    assert_passes(&catalog::create_new());
}

#[test]
#[ignore = "requires chromium and a running application"]
fn live_suite_reports_every_scenario() {
    let report = live_runner().run_all(&catalog::all());
    assert_eq!(report.results.len(), catalog::all().len());
    assert!(report.all_passed(), "{}", report.render_text());
}
