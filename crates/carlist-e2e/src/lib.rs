//! carlist-e2e: end-to-end verification harness for the car list application.
//!
//! Scenarios are declarative data. The runner resets the application's
//! fixture, opens a fresh browser session and executes each step, waiting on
//! eventually-true conditions with a bounded polling engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    CARLIST-E2E Architecture                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Scenario   │    │ Driver     │            │
//! │   │ (data)     │───►│ Runner     │───►│ (chromium, │            │
//! │   │            │    │  + Waiter  │    │  simulated)│            │
//! │   └────────────┘    └─────┬──────┘    └────────────┘            │
//! │                           │ GET /reset                          │
//! │                           ▼                                     │
//! │                     ┌────────────┐                              │
//! │                     │ Reset      │                              │
//! │                     │ Gateway    │                              │
//! │                     └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use carlist_e2e::prelude::*;
//!
//! let app = SimulatedCarList::with_timing(SimulationTiming::instant());
//! let runner = ScenarioRunner::new(app.clone(), app, RunnerOptions::new());
//! let report = runner.run_all(&catalog::all());
//! assert!(report.all_passed());
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
mod browser;
pub mod catalog;
mod condition;
mod config;
mod driver;
mod fixture;
mod locator;
pub mod mock;
mod reporter;
mod result;
mod runner;
mod scenario;
mod wait;

#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumElement, ChromiumFactory};
pub use condition::{
    CellText, Condition, FnCondition, Interaction, Probe, Verdict, WaitCondition,
    DEFAULT_CELL_SELECTOR,
};
pub use config::{
    join_url, parse_base_url, HarnessConfig, DEFAULT_BASE_URL, ENV_BASE_URL, ENV_DRIVER_PATH,
    ENV_POLL_INTERVAL_MS, ENV_TIMEOUT_MS,
};
pub use driver::{Driver, DriverConfig, Element, ElementRef, SessionFactory};
pub use fixture::{HttpResetGateway, ResetGateway, DEFAULT_RESET_TIMEOUT_MS};
pub use locator::{Cardinality, Locator};
pub use reporter::SuiteReport;
pub use result::{
    DriverError, DriverErrorKind, DriverResult, HarnessError, HarnessResult, WaitError,
};
pub use runner::{Outcome, RunnerOptions, ScenarioResult, ScenarioRunner};
pub use scenario::{load_scenarios, ActionKind, AwaitStep, Scenario, Step};
pub use wait::{
    WaitOptions, WaitReport, WaitSpec, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Everything needed to define and run scenarios
pub mod prelude {
    pub use super::catalog;
    pub use super::mock::{MockDriver, MockElement, SimulatedCarList, SimulationTiming};
    pub use super::{
        ActionKind, AwaitStep, CellText, Condition, Driver, Element, HarnessConfig, HarnessError,
        HarnessResult, HttpResetGateway, Interaction, Locator, Outcome, Probe, ResetGateway,
        RunnerOptions, Scenario, ScenarioResult, ScenarioRunner, SessionFactory, Step,
        SuiteReport, Verdict, WaitOptions, Waiter,
    };
    #[cfg(feature = "browser")]
    pub use super::ChromiumFactory;
}
