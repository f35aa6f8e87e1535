//! Simulated Suite Example
//!
//! Runs the scenario catalog against the in-memory car list application:
//! - the regression suite through `ScenarioRunner::run_all`
//! - a custom scenario built in code
//! - a wait that times out, and how it is reported
//!
//! # Running
//!
//! ```bash
//! cargo run --example simulated_suite -p carlist-e2e
//! RUST_LOG=debug cargo run --example simulated_suite -p carlist-e2e
//! ```

use carlist_e2e::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("=== carlist-e2e Simulated Suite ===\n");

    demo_regression_suite();
    demo_custom_scenario();
    demo_timeout();

    println!("\n=== Done ===");
}

fn runner(options: RunnerOptions) -> ScenarioRunner {
    let app = SimulatedCarList::new();
    ScenarioRunner::new(app.clone(), app, options)
}

fn demo_regression_suite() {
    println!("--- Regression suite ---");
    let report = runner(RunnerOptions::new()).run_all(&catalog::extended());
    print!("{}", report.render_text());
}

fn demo_custom_scenario() {
    println!("\n--- Custom scenario: filter by registration date ---");
    let rows = Locator::all(catalog::dom::ROWS);
    let scenario = Scenario::new("filter_registered")
        .describe("the filter also matches the registration date")
        .step(Step::navigate_root())
        .step(Step::wait(
            Condition::new(Probe::present(catalog::dom::FILTER)).then(Interaction::type_text("2000-")),
        ))
        .step(Step::wait(Probe::all(vec![
            Probe::count(rows.clone(), 1),
            Probe::row(rows, CellText::key("939")),
        ])));

    let result = runner(RunnerOptions::new()).run(&scenario);
    println!("{}: {:?} in {:?}", result.name, result.outcome, result.duration);
}

fn demo_timeout() {
    println!("\n--- A condition that never holds ---");
    let options = RunnerOptions::new().with_wait(WaitOptions::new().with_timeout(200).with_poll_interval(20));
    let scenario = Scenario::new("seven_rows")
        .step(Step::navigate_root())
        .step(Step::wait(Probe::count(Locator::all(catalog::dom::ROWS), 7)));

    let result = runner(options).run(&scenario);
    if let Outcome::TimedOut { step, elapsed, waited_for } = result.outcome {
        println!("step {step} gave up on {waited_for} after {}ms", elapsed.as_millis());
    }
}
