//! Polling wait engine.
//!
//! The only place retry policy lives. A wait evaluates its condition
//! immediately, then once per poll interval until it holds, fails permanently
//! or the deadline passes. The last sleep is clamped so the final evaluation
//! lands on the deadline instead of a full interval past it.
//!
//! Driver errors raised while probing are treated as "not yet": absent and
//! stale elements are the normal state of an eventually-consistent page.

use crate::condition::{Condition, Verdict, WaitCondition};
use crate::driver::Driver;
use crate::result::WaitError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (2 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 2_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check `0 < poll_interval < timeout`
    pub fn validate(&self) -> Result<(), WaitError> {
        if self.poll_interval_ms == 0 {
            return Err(WaitError::InvalidSpec {
                message: "poll interval must be positive".to_string(),
            });
        }
        if self.poll_interval_ms >= self.timeout_ms {
            return Err(WaitError::InvalidSpec {
                message: format!(
                    "poll interval {}ms must be shorter than timeout {}ms",
                    self.poll_interval_ms, self.timeout_ms
                ),
            });
        }
        Ok(())
    }
}

// =============================================================================
// WAIT SPEC
// =============================================================================

/// A condition together with validated timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    condition: Condition,
    options: WaitOptions,
}

impl WaitSpec {
    /// Create a wait spec, rejecting unusable timing
    pub fn new(condition: Condition, options: WaitOptions) -> Result<Self, WaitError> {
        options.validate()?;
        Ok(Self { condition, options })
    }

    /// The condition to wait for
    #[must_use]
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Timing for this wait
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }
}

// =============================================================================
// WAIT REPORT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitReport {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of condition evaluations
    pub polls: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER
// =============================================================================

/// Polls conditions against a driver
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter;

impl Waiter {
    /// Create a new waiter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Wait for a validated spec
    pub fn wait_for(&self, driver: &dyn Driver, spec: &WaitSpec) -> Result<WaitReport, WaitError> {
        self.wait_until(driver, spec.condition(), spec.options())
    }

    /// Wait for any condition
    pub fn wait_until<C: WaitCondition + ?Sized>(
        &self,
        driver: &dyn Driver,
        condition: &C,
        options: &WaitOptions,
    ) -> Result<WaitReport, WaitError> {
        options.validate()?;
        let description = condition.description();
        let timeout = options.timeout();
        let poll_interval = options.poll_interval();
        let start = Instant::now();
        let mut polls: u32 = 0;
        let mut last_error: Option<String> = None;

        loop {
            polls += 1;
            match condition.poll(driver) {
                Ok(Verdict::Satisfied(subject)) => {
                    match condition.on_first_true(driver, subject.as_deref()) {
                        Ok(()) => {
                            let elapsed = start.elapsed();
                            tracing::debug!(
                                waited_for = %description,
                                polls,
                                elapsed_ms = elapsed.as_millis(),
                                "condition satisfied"
                            );
                            return Ok(WaitReport {
                                elapsed,
                                polls,
                                waited_for: description,
                            });
                        }
                        Err(e) if e.is_transient() => {
                            tracing::debug!(waited_for = %description, error = %e, "interaction not ready");
                            last_error = Some(e.to_string());
                        }
                        Err(source) => {
                            return Err(WaitError::Interaction {
                                description,
                                source,
                            });
                        }
                    }
                }
                Ok(Verdict::Pending) => {
                    tracing::trace!(waited_for = %description, polls, "pending");
                }
                Ok(Verdict::Failed(reason)) => {
                    tracing::debug!(waited_for = %description, %reason, "condition failed permanently");
                    return Err(WaitError::Permanent { reason });
                }
                Err(e) => {
                    tracing::debug!(waited_for = %description, error = %e, "probe error treated as pending");
                    last_error = Some(e.to_string());
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                if let Some(ref error) = last_error {
                    tracing::warn!(waited_for = %description, %error, "timed out with probe errors");
                }
                return Err(WaitError::Timeout {
                    description,
                    elapsed,
                    polls,
                    last_error,
                });
            }
            std::thread::sleep(poll_interval.min(timeout - elapsed));
        }
    }
}
