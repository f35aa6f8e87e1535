//! Suite reports.
//!
//! A [`SuiteReport`] collects the [`ScenarioResult`]s of one run and renders
//! them as a console summary, JSON or JUnit XML for CI.

use crate::result::HarnessResult;
use crate::runner::{Outcome, ScenarioResult};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// Serialize a [`Duration`] as whole milliseconds
pub(crate) fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Results of one suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall time of the whole run
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Results in definition order
    pub results: Vec<ScenarioResult>,
    /// Scenarios not run because of fail-fast
    pub skipped: Vec<String>,
}

impl SuiteReport {
    /// Create a report with a fresh run id
    #[must_use]
    pub fn new(
        started_at: DateTime<Utc>,
        duration: Duration,
        results: Vec<ScenarioResult>,
        skipped: Vec<String>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            duration,
            results,
            skipped,
        }
    }

    /// Scenarios that passed
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.is_passed()).count()
    }

    /// Scenarios that failed (not counting timeouts)
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
            .count()
    }

    /// Scenarios that timed out
    #[must_use]
    pub fn timed_out(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_timed_out()).count()
    }

    /// Scenarios run or skipped
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len() + self.skipped.len()
    }

    /// True when every selected scenario ran and passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.skipped.is_empty() && self.results.iter().all(ScenarioResult::is_passed)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} timed out, {} skipped ({:.2}s)",
            self.passed(),
            self.failed(),
            self.timed_out(),
            self.skipped.len(),
            self.duration.as_secs_f64()
        )
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> HarnessResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain text, one line per scenario plus the summary
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut text = String::new();
        for result in &self.results {
            let millis = result.duration.as_millis();
            let _ = match result.outcome {
                Outcome::Passed => writeln!(text, "PASS {} ({millis}ms)", result.name),
                Outcome::Failed { step: Some(step), ref reason } => {
                    writeln!(text, "FAIL {} step {step}: {reason} ({millis}ms)", result.name)
                }
                Outcome::Failed { step: None, ref reason } => {
                    writeln!(text, "FAIL {} before first step: {reason} ({millis}ms)", result.name)
                }
                Outcome::TimedOut {
                    step,
                    elapsed,
                    ref waited_for,
                } => writeln!(
                    text,
                    "TIME {} step {step}: no {waited_for} after {}ms",
                    result.name,
                    elapsed.as_millis()
                ),
            };
        }
        for name in &self.skipped {
            let _ = writeln!(text, "SKIP {name}");
        }
        text.push_str(&self.summary());
        text.push('\n');
        text
    }

    /// JUnit XML for CI systems
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuite name="carlist-e2e" tests="{}" failures="{}" errors="{}" skipped="{}" time="{:.3}" timestamp="{}">"#,
            self.total(),
            self.failed(),
            self.timed_out(),
            self.skipped.len(),
            self.duration.as_secs_f64(),
            self.started_at.format("%Y-%m-%dT%H:%M:%S")
        );

        for result in &self.results {
            let _ = write!(
                xml,
                r#"  <testcase name="{}" time="{:.3}""#,
                escape_xml(&result.name),
                result.duration.as_secs_f64()
            );
            match result.outcome {
                Outcome::Passed => xml.push_str("/>\n"),
                Outcome::Failed { ref reason, .. } => {
                    let _ = write!(
                        xml,
                        ">\n    <failure message=\"{}\"/>\n  </testcase>\n",
                        escape_xml(reason)
                    );
                }
                Outcome::TimedOut { ref waited_for, elapsed, .. } => {
                    let message = format!("timed out after {}ms waiting for {waited_for}", elapsed.as_millis());
                    let _ = write!(
                        xml,
                        ">\n    <error type=\"timeout\" message=\"{}\"/>\n  </testcase>\n",
                        escape_xml(&message)
                    );
                }
            }
        }
        for name in &self.skipped {
            let _ = writeln!(xml, "  <testcase name=\"{}\">\n    <skipped/>\n  </testcase>", escape_xml(name));
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Write a rendered report to `path`
    pub fn write_to(&self, path: &Path, contents: &str) -> HarnessResult<()> {
        std::fs::write(path, contents)?;
        tracing::info!(path = %path.display(), run_id = %self.run_id, "report written");
        Ok(())
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
