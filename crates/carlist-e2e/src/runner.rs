//! Scenario runner.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ScenarioRunner::run(scenario)                               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  1. ResetGateway::reset()      failure ─► Failed{step: None} │
//! │  2. SessionFactory::open()     failure ─► Failed{step: None} │
//! │  3. for (i, step) in steps     (session closed on drop)      │
//! │       Navigate / Act           error   ─► Failed{step: i}    │
//! │       Await ─► Waiter          timeout ─► TimedOut{step: i}  │
//! │                                other   ─► Failed{step: i}    │
//! │  4. Passed                                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::config::{join_url, HarnessConfig, DEFAULT_BASE_URL};
use crate::driver::{Driver, SessionFactory};
use crate::fixture::ResetGateway;
use crate::reporter::{serialize_millis, SuiteReport};
use crate::result::WaitError;
use crate::scenario::{Scenario, Step};
use crate::wait::{WaitOptions, Waiter};
use serde::Serialize;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// How a scenario ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every step completed
    Passed,
    /// A step (or, with `step: None`, the reset or session setup) failed
    Failed {
        /// Zero-based index of the failing step
        step: Option<usize>,
        /// What went wrong
        reason: String,
    },
    /// A wait reached its deadline
    TimedOut {
        /// Zero-based index of the wait step
        step: usize,
        /// Time spent in the wait
        #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
        elapsed: Duration,
        /// What was waited for
        waited_for: String,
    },
}

impl Outcome {
    /// Check if passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if timed out
    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Index of the step that ended the scenario
    #[must_use]
    pub const fn step(&self) -> Option<usize> {
        match self {
            Self::Passed => None,
            Self::Failed { step, .. } => *step,
            Self::TimedOut { step, .. } => Some(*step),
        }
    }
}

/// Result of running one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// How it ended
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Wall time including reset and session setup
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Steps that completed before the outcome was decided
    pub steps_completed: usize,
}

impl ScenarioResult {
    /// Check if passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        self.outcome.is_passed()
    }
}

/// Options for a runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Base URL that `Navigate` paths resolve against
    pub base_url: String,
    /// Timing for waits that do not override it
    pub wait: WaitOptions,
    /// Maximum concurrent scenarios (honored only with an atomic reset)
    pub jobs: usize,
    /// Stop after the first scenario that does not pass
    pub fail_fast: bool,
    /// Run only scenarios whose name contains this
    pub filter: Option<String>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            wait: WaitOptions::default(),
            jobs: 1,
            fail_fast: false,
            filter: None,
        }
    }
}

impl RunnerOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take base URL, timing, jobs and fail-fast from configuration
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            wait: config.wait_options(),
            jobs: config.jobs,
            fail_fast: config.fail_fast,
            filter: None,
        }
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set default wait timing
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set concurrency
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Enable fail-fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Only run scenarios whose name contains `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn selects(&self, scenario: &Scenario) -> bool {
        self.filter
            .as_deref()
            .map_or(true, |filter| scenario.name.contains(filter))
    }
}

/// Owns a driver session and closes it on every exit path
struct SessionGuard {
    driver: Box<dyn Driver>,
}

impl SessionGuard {
    fn driver(&mut self) -> &mut dyn Driver {
        self.driver.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.driver.close() {
            tracing::warn!(error = %e, "failed to close browser session");
        }
    }
}

enum StepFailure {
    Failed(String),
    TimedOut { elapsed: Duration, waited_for: String },
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Runs scenarios in isolation: reset, fresh session, steps in order
pub struct ScenarioRunner {
    gateway: Box<dyn ResetGateway>,
    factory: Box<dyn SessionFactory>,
    options: RunnerOptions,
    waiter: Waiter,
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("options", &self.options)
            .field("atomic_reset", &self.gateway.is_atomic())
            .finish_non_exhaustive()
    }
}

impl ScenarioRunner {
    /// Create a runner
    pub fn new(
        gateway: impl ResetGateway + 'static,
        factory: impl SessionFactory + 'static,
        options: RunnerOptions,
    ) -> Self {
        Self {
            gateway: Box::new(gateway),
            factory: Box::new(factory),
            options,
            waiter: Waiter::new(),
        }
    }

    /// Runner options
    #[must_use]
    pub const fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Run one scenario. Never panics; every failure becomes an [`Outcome`].
    pub fn run(&self, scenario: &Scenario) -> ScenarioResult {
        let span = tracing::info_span!("scenario", name = %scenario.name);
        let _enter = span.enter();
        let start = Instant::now();
        tracing::info!(steps = scenario.steps.len(), "scenario started");

        let (outcome, steps_completed) = self.execute(scenario);

        let duration = start.elapsed();
        match outcome {
            Outcome::Passed => {
                tracing::info!(duration_ms = duration.as_millis(), "scenario passed");
            }
            ref other => {
                tracing::info!(duration_ms = duration.as_millis(), outcome = ?other, "scenario did not pass");
            }
        }
        ScenarioResult {
            name: scenario.name.clone(),
            outcome,
            duration,
            steps_completed,
        }
    }

    fn execute(&self, scenario: &Scenario) -> (Outcome, usize) {
        let precondition = |reason: String| {
            (
                Outcome::Failed {
                    step: None,
                    reason,
                },
                0,
            )
        };

        match catch_unwind(AssertUnwindSafe(|| self.gateway.reset())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return precondition(e.to_string()),
            Err(payload) => return precondition(format!("panicked: {}", panic_message(payload.as_ref()))),
        }

        let mut session = match catch_unwind(AssertUnwindSafe(|| self.factory.open())) {
            Ok(Ok(driver)) => SessionGuard { driver },
            Ok(Err(e)) => return precondition(e.to_string()),
            Err(payload) => return precondition(format!("panicked: {}", panic_message(payload.as_ref()))),
        };

        for (index, step) in scenario.steps.iter().enumerate() {
            let span = tracing::debug_span!("step", index);
            let _enter = span.enter();
            tracing::debug!(%step, "step started");

            let result = catch_unwind(AssertUnwindSafe(|| self.execute_step(session.driver(), step)))
                .unwrap_or_else(|payload| {
                    Err(StepFailure::Failed(format!(
                        "panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                });

            match result {
                Ok(()) => {}
                Err(StepFailure::Failed(reason)) => {
                    tracing::debug!(%reason, "step failed");
                    return (
                        Outcome::Failed {
                            step: Some(index),
                            reason,
                        },
                        index,
                    );
                }
                Err(StepFailure::TimedOut { elapsed, waited_for }) => {
                    return (
                        Outcome::TimedOut {
                            step: index,
                            elapsed,
                            waited_for,
                        },
                        index,
                    );
                }
            }
        }
        (Outcome::Passed, scenario.steps.len())
    }

    fn execute_step(&self, driver: &mut dyn Driver, step: &Step) -> Result<(), StepFailure> {
        match step {
            Step::Navigate { path } => {
                let url = join_url(&self.options.base_url, path).map_err(|e| StepFailure::Failed(e.to_string()))?;
                driver
                    .navigate(&url)
                    .map_err(|e| StepFailure::Failed(format!("navigate to {url}: {e}")))
            }
            Step::Act { locator, action } => Step::perform_action(&*driver, locator, action)
                .map_err(|e| StepFailure::Failed(format!("{action} {locator}: {e}"))),
            Step::Await(wait) => {
                let spec = wait
                    .resolve(&self.options.wait)
                    .map_err(|e| StepFailure::Failed(e.to_string()))?;
                match self.waiter.wait_for(&*driver, &spec) {
                    Ok(report) => {
                        tracing::debug!(polls = report.polls, elapsed_ms = report.elapsed.as_millis(), "wait satisfied");
                        Ok(())
                    }
                    Err(WaitError::Timeout {
                        description,
                        elapsed,
                        ..
                    }) => Err(StepFailure::TimedOut {
                        elapsed,
                        waited_for: description,
                    }),
                    Err(other) => Err(StepFailure::Failed(other.to_string())),
                }
            }
        }
    }

    /// Run every selected scenario and report in definition order
    pub fn run_all(&self, scenarios: &[Scenario]) -> SuiteReport {
        let started_at = chrono::Utc::now();
        let start = Instant::now();
        let selected: Vec<&Scenario> = scenarios.iter().filter(|s| self.options.selects(s)).collect();

        let jobs = self.options.jobs.max(1);
        let parallel = jobs > 1 && self.gateway.is_atomic();
        if jobs > 1 && !parallel {
            tracing::warn!(jobs, "fixture reset is not atomic; running scenarios serially");
        }
        let batch_size = if parallel { jobs } else { 1 };

        let mut results = Vec::with_capacity(selected.len());
        let mut skipped = Vec::new();
        let mut stopped = false;
        for batch in selected.chunks(batch_size) {
            if stopped {
                skipped.extend(batch.iter().map(|s| s.name.clone()));
                continue;
            }
            let batch_results = if parallel {
                self.run_batch(batch)
            } else {
                batch.iter().map(|s| self.run(s)).collect()
            };
            if self.options.fail_fast && batch_results.iter().any(|r| !r.is_passed()) {
                tracing::info!("fail-fast: skipping remaining scenarios");
                stopped = true;
            }
            results.extend(batch_results);
        }

        SuiteReport::new(started_at, start.elapsed(), results, skipped)
    }

    fn run_batch(&self, batch: &[&Scenario]) -> Vec<ScenarioResult> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|scenario| (scenario, scope.spawn(move || self.run(scenario))))
                .collect();
            handles
                .into_iter()
                .map(|(scenario, handle)| {
                    handle.join().unwrap_or_else(|payload| ScenarioResult {
                        name: scenario.name.clone(),
                        outcome: Outcome::Failed {
                            step: None,
                            reason: format!("panicked: {}", panic_message(payload.as_ref())),
                        },
                        duration: Duration::ZERO,
                        steps_completed: 0,
                    })
                })
                .collect()
        })
    }
}
