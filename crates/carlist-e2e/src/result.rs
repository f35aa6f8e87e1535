//! Result and error types for the harness.
//!
//! Errors are layered: [`DriverError`] comes from the browser capability,
//! [`WaitError`] from the polling engine and [`HarnessError`] from everything
//! around them (fixture reset, sessions, configuration, scenario files).

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Classification of a driver failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverErrorKind {
    /// No element matched the locator
    NotFound,
    /// The element handle no longer refers to a live node
    Stale,
    /// A navigation is still in flight
    NavigationInProgress,
    /// Navigation failed outright
    Navigation,
    /// The browser session is broken or closed
    Session,
    /// Script evaluation inside the page failed
    Script,
    /// The backend does not support the operation
    Unsupported,
}

impl DriverErrorKind {
    /// Get a short name for this kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::Stale => "stale element",
            Self::NavigationInProgress => "navigation in progress",
            Self::Navigation => "navigation failed",
            Self::Session => "session error",
            Self::Script => "script error",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by a [`crate::Driver`] or [`crate::Element`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct DriverError {
    /// What went wrong
    pub kind: DriverErrorKind,
    /// Backend message
    pub message: String,
}

impl DriverError {
    /// Create a new driver error
    #[must_use]
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// No element matched
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::NotFound, message)
    }

    /// Element handle went stale
    #[must_use]
    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Stale, message)
    }

    /// Session-level failure
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Session, message)
    }

    /// Whether a later poll may succeed where this one failed.
    ///
    /// The wait engine swallows transient errors and keeps polling.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            DriverErrorKind::NotFound | DriverErrorKind::Stale | DriverErrorKind::NavigationInProgress
        )
    }
}

/// Errors from the wait engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    /// Deadline elapsed without the condition holding
    #[error(
        "timed out after {}ms waiting for {description} ({polls} polls){}",
        .elapsed.as_millis(),
        last_error_suffix(.last_error)
    )]
    Timeout {
        /// What was waited for
        description: String,
        /// Time spent waiting
        elapsed: Duration,
        /// Number of probe evaluations
        polls: u32,
        /// Last transient error seen while probing
        last_error: Option<String>,
    },

    /// The probe decided the condition can never hold
    #[error("condition can never hold: {reason}")]
    Permanent {
        /// Why polling stopped
        reason: String,
    },

    /// The on-first-true interaction failed with a non-transient error
    #[error("interaction after {description} failed: {source}")]
    Interaction {
        /// What was waited for
        description: String,
        /// Underlying driver error
        #[source]
        source: DriverError,
    },

    /// Timeout/poll interval combination is unusable
    #[error("invalid wait options: {message}")]
    InvalidSpec {
        /// Error message
        message: String,
    },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_ref()
        .map(|e| format!("; last error: {e}"))
        .unwrap_or_default()
}

/// Errors that can occur in the harness
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Reset endpoint answered with a non-success status
    #[error("fixture reset failed: {url} returned HTTP {status}")]
    ResetRejected {
        /// Reset URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Reset endpoint could not be reached
    #[error("fixture reset failed: {message}")]
    ResetFailed {
        /// Error message
        message: String,
    },

    /// Browser session could not be opened
    #[error("failed to open browser session: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario file could not be interpreted
    #[error("invalid scenario {name}: {message}")]
    ScenarioParse {
        /// Scenario name (or file)
        name: String,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from the fixture reset precondition
    #[must_use]
    pub const fn is_reset_failure(&self) -> bool {
        matches!(self, Self::ResetRejected { .. } | Self::ResetFailed { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(DriverError::not_found("#filter").is_transient());
        assert!(DriverError::stale("row").is_transient());
        assert!(DriverError::new(DriverErrorKind::NavigationInProgress, "x").is_transient());
        assert!(!DriverError::session("closed").is_transient());
        assert!(!DriverError::new(DriverErrorKind::Script, "boom").is_transient());
    }

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::not_found("#tbodycars tr");
        assert_eq!(err.to_string(), "not found: #tbodycars tr");
    }

    #[test]
    fn test_timeout_display_includes_last_error() {
        let err = WaitError::Timeout {
            description: "row count == 5".to_string(),
            elapsed: Duration::from_millis(2000),
            polls: 40,
            last_error: Some("stale element: row".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("2000ms"));
        assert!(text.contains("row count == 5"));
        assert!(text.contains("last error: stale element"));
    }

    #[test]
    fn test_timeout_display_without_last_error() {
        let err = WaitError::Timeout {
            description: "x".to_string(),
            elapsed: Duration::from_millis(10),
            polls: 1,
            last_error: None,
        };
        assert!(!err.to_string().contains("last error"));
    }

    #[test]
    fn test_reset_failure_classification() {
        let rejected = HarnessError::ResetRejected {
            url: "http://localhost:3000/reset".to_string(),
            status: 500,
        };
        assert!(rejected.is_reset_failure());
        assert!(rejected.to_string().starts_with("fixture reset failed"));
        assert!(!HarnessError::config("bad").is_reset_failure());
    }
}
