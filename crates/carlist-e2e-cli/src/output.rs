//! Console output for suite reports and the catalog

use carlist_e2e::{Outcome, Scenario, ScenarioResult, SuiteReport};
use console::{style, Style, Term};
use std::fmt::Write as _;

/// Renders reports for a terminal
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode: passing scenarios are not listed
    pub quiet: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ConsoleReporter {
    /// Create a new reporter
    #[must_use]
    pub const fn new(use_color: bool, quiet: bool) -> Self {
        Self { use_color, quiet }
    }

    fn line(&self, result: &ScenarioResult) -> String {
        let millis = result.duration.as_millis();
        let (prefix, plain, detail) = match result.outcome {
            Outcome::Passed => (style("✓").green().bold(), "PASS", format!("({millis}ms)")),
            Outcome::Failed { step: Some(step), ref reason } => (
                style("✗").red().bold(),
                "FAIL",
                format!("step {step}: {reason} ({millis}ms)"),
            ),
            Outcome::Failed { step: None, ref reason } => (
                style("✗").red().bold(),
                "FAIL",
                format!("before first step: {reason} ({millis}ms)"),
            ),
            Outcome::TimedOut {
                step,
                elapsed,
                ref waited_for,
            } => (
                style("⏱").yellow().bold(),
                "TIME",
                format!("step {step}: no {waited_for} after {}ms", elapsed.as_millis()),
            ),
        };
        if self.use_color {
            format!("{prefix} {} {}", style(&result.name).bold(), style(detail).dim())
        } else {
            format!("{plain} {} {detail}", result.name)
        }
    }

    /// Render a suite report
    #[must_use]
    pub fn render_suite(&self, report: &SuiteReport) -> String {
        let mut out = String::new();
        for result in &report.results {
            if self.quiet && result.is_passed() {
                continue;
            }
            out.push_str(&self.line(result));
            out.push('\n');
        }
        for name in &report.skipped {
            if self.use_color {
                let _ = writeln!(out, "{} {}", style("↷").dim(), style(name).dim());
            } else {
                let _ = writeln!(out, "SKIP {name}");
            }
        }

        let status = if report.all_passed() { "PASSED" } else { "FAILED" };
        if self.use_color {
            let status_style = if report.all_passed() {
                Style::new().green().bold()
            } else {
                Style::new().red().bold()
            };
            let _ = writeln!(out, "\n{} {}", status_style.apply_to(status), report.summary());
        } else {
            let _ = writeln!(out, "\n{status} {}", report.summary());
        }
        out
    }

    /// Render the catalog, one scenario per line
    #[must_use]
    pub fn render_catalog(&self, scenarios: &[Scenario]) -> String {
        let width = scenarios.iter().map(|s| s.name.len()).max().unwrap_or(0);
        let mut out = String::new();
        for scenario in scenarios {
            let name = format!("{:width$}", scenario.name);
            let description = scenario.description.as_deref().unwrap_or("");
            let steps = format!("({} steps)", scenario.steps.len());
            if self.use_color {
                let _ = writeln!(out, "{}  {description} {}", style(name).bold(), style(steps).dim());
            } else {
                let _ = writeln!(out, "{name}  {description} {steps}");
            }
        }
        out
    }

    /// Write to stdout
    pub fn print(&self, text: &str) {
        let _ = Term::stdout().write_str(text);
    }
}
