//! Declarative scenarios.
//!
//! A [`Scenario`] is plain data: an ordered list of [`Step`]s that can be
//! built in code, written as YAML, and re-run any number of times. Nothing
//! here touches a browser; the [`crate::ScenarioRunner`] interprets steps.
//!
//! ```yaml
//! name: filter
//! steps:
//!   - step: navigate
//!     path: ""
//!   - step: await
//!     condition:
//!       probe: { kind: present, locator: { selector: "#filter" } }
//!       on_first_true: { kind: type, text: "2002" }
//!   - step: await
//!     condition:
//!       probe: { kind: count, locator: { selector: "#tbodycars tr", cardinality: all }, expected: 2 }
//! ```

use crate::condition::{Condition, Probe, WaitCondition};
use crate::driver::{Driver, Element};
use crate::locator::Locator;
use crate::result::{DriverError, DriverResult, HarnessError, HarnessResult, WaitError};
use crate::wait::{WaitOptions, WaitSpec};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One-shot action on located elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    /// Click
    Click,
    /// Type text
    Type {
        /// Text to type
        text: String,
    },
    /// Select all and delete, so input events fire
    Clear,
}

impl ActionKind {
    /// Perform the action on one element
    pub fn perform(&self, element: &dyn Element) -> DriverResult<()> {
        match self {
            Self::Click => element.click(),
            Self::Type { text } => element.send_keys(text),
            Self::Clear => element.clear(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click => f.write_str("click"),
            Self::Type { text } => write!(f, "type {text:?}"),
            Self::Clear => f.write_str("clear"),
        }
    }
}

/// A wait step; unset timing falls back to the runner's defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwaitStep {
    /// What to wait for
    pub condition: Condition,
    /// Timeout override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Poll interval override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl AwaitStep {
    /// Wait for `condition` with default timing
    #[must_use]
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self {
            condition: condition.into(),
            timeout_ms: None,
            poll_interval_ms: None,
        }
    }

    /// Override the timeout
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Override the poll interval
    #[must_use]
    pub const fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = Some(poll_interval_ms);
        self
    }

    /// Build the concrete wait against `defaults`.
    ///
    /// An inherited poll interval that is not below this step's own timeout
    /// is capped at half of it; an explicit override is taken as written.
    pub fn resolve(&self, defaults: &WaitOptions) -> Result<WaitSpec, WaitError> {
        let poll_interval_ms = match (self.poll_interval_ms, self.timeout_ms) {
            (Some(poll), _) => poll,
            (None, Some(timeout)) if defaults.poll_interval_ms >= timeout => (timeout / 2).max(1),
            (None, _) => defaults.poll_interval_ms,
        };
        let options = WaitOptions {
            timeout_ms: self.timeout_ms.unwrap_or(defaults.timeout_ms),
            poll_interval_ms,
        };
        WaitSpec::new(self.condition.clone(), options)
    }
}

/// One step of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Load a page, relative to the base URL
    Navigate {
        /// Path below the base URL; empty for the root
        path: String,
    },
    /// Act once on the located element(s)
    Act {
        /// Target
        locator: Locator,
        /// What to do
        action: ActionKind,
    },
    /// Wait for a condition
    Await(AwaitStep),
}

impl Step {
    /// Navigate to `path`
    #[must_use]
    pub fn navigate(path: impl Into<String>) -> Self {
        Self::Navigate { path: path.into() }
    }

    /// Navigate to the application root
    #[must_use]
    pub fn navigate_root() -> Self {
        Self::navigate("")
    }

    /// Act on `locator`
    #[must_use]
    pub fn act(locator: impl Into<Locator>, action: ActionKind) -> Self {
        Self::Act {
            locator: locator.into(),
            action,
        }
    }

    /// Click `locator`
    #[must_use]
    pub fn click(locator: impl Into<Locator>) -> Self {
        Self::act(locator, ActionKind::Click)
    }

    /// Type `text` into `locator`
    #[must_use]
    pub fn type_into(locator: impl Into<Locator>, text: impl Into<String>) -> Self {
        Self::act(locator, ActionKind::Type { text: text.into() })
    }

    /// Clear `locator`
    #[must_use]
    pub fn clear(locator: impl Into<Locator>) -> Self {
        Self::act(locator, ActionKind::Clear)
    }

    /// Wait for `condition` with default timing
    #[must_use]
    pub fn wait(condition: impl Into<Condition>) -> Self {
        Self::Await(AwaitStep::new(condition))
    }

    /// Wait for `condition` at most `timeout_ms`
    #[must_use]
    pub fn wait_within(condition: impl Into<Condition>, timeout_ms: u64) -> Self {
        Self::Await(AwaitStep::new(condition).timeout_ms(timeout_ms))
    }

    /// Perform an `Act` step.
    ///
    /// A single locator must match; an `All` locator acts on every match and
    /// requires at least one.
    pub fn perform_action(driver: &dyn Driver, locator: &Locator, action: &ActionKind) -> DriverResult<()> {
        if !locator.is_all() {
            return action.perform(driver.require(locator)?.as_ref());
        }
        let elements = driver.find_all(locator)?;
        if elements.is_empty() {
            return Err(DriverError::not_found(locator.to_string()));
        }
        elements
            .iter()
            .try_for_each(|element| action.perform(element.as_ref()))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate { path } if path.is_empty() => f.write_str("navigate to root"),
            Self::Navigate { path } => write!(f, "navigate to {path}"),
            Self::Act { locator, action } => write!(f, "{action} {locator}"),
            Self::Await(step) => {
                write!(f, "await {}", step.condition.description())?;
                if let Some(ms) = step.timeout_ms {
                    write!(f, " within {ms}ms")?;
                }
                Ok(())
            }
        }
    }
}

/// A named, ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name
    pub name: String,
    /// What the scenario checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps, executed in order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create an empty scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    /// Set the description
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append steps
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Check the scenario can be executed.
    ///
    /// Rejects an empty name, an empty step list, interactions with nothing
    /// to act on and invalid regular expressions.
    pub fn validate(&self) -> HarnessResult<()> {
        let invalid = |message: String| HarnessError::ScenarioParse {
            name: self.name.clone(),
            message,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("scenario name is empty".to_string()));
        }
        if self.steps.is_empty() {
            return Err(invalid("scenario has no steps".to_string()));
        }
        for (index, step) in self.steps.iter().enumerate() {
            let Step::Await(wait) = step else { continue };
            let condition = &wait.condition;
            if let Some(ref interaction) = condition.on_first_true {
                if condition.probe.primary_locator().is_none() {
                    return Err(invalid(format!(
                        "step {index}: {} has no element to {interaction}",
                        condition.probe
                    )));
                }
            }
            for probe in std::iter::once(&condition.probe).chain(condition.abort_when.iter()) {
                check_patterns(probe).map_err(|e| invalid(format!("step {index}: {e}")))?;
            }
        }
        Ok(())
    }

    /// Parse one scenario from YAML
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        let scenario: Self = serde_yaml_ng::from_str(yaml).map_err(|e| HarnessError::ScenarioParse {
            name: "<yaml>".to_string(),
            message: e.to_string(),
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> HarnessResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

fn check_patterns(probe: &Probe) -> Result<(), String> {
    match probe {
        Probe::TextMatches { pattern, .. } => Regex::new(pattern)
            .map(|_| ())
            .map_err(|e| format!("invalid pattern {pattern:?}: {e}")),
        Probe::All { probes } => probes.iter().try_for_each(check_patterns),
        Probe::Not { probe } => check_patterns(probe),
        _ => Ok(()),
    }
}

/// Load a YAML file holding a list of scenarios
pub fn load_scenarios(path: &Path) -> HarnessResult<Vec<Scenario>> {
    let text = std::fs::read_to_string(path)?;
    let scenarios: Vec<Scenario> = serde_yaml_ng::from_str(&text).map_err(|e| HarnessError::ScenarioParse {
        name: path.display().to_string(),
        message: e.to_string(),
    })?;
    for scenario in &scenarios {
        scenario.validate()?;
    }
    tracing::debug!(path = %path.display(), count = scenarios.len(), "loaded scenarios");
    Ok(scenarios)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::condition::{CellText, Interaction};
    use crate::mock::{MockDriver, MockElement};
    use std::io::Write;

    mod step_tests {
        use super::*;

        #[test]
        fn test_resolve_uses_defaults() {
            let defaults = WaitOptions::new().with_timeout(2000).with_poll_interval(50);
            let spec = AwaitStep::new(Probe::present("#new")).resolve(&defaults).unwrap();
            assert_eq!(spec.options(), &defaults);
        }

        #[test]
        fn test_resolve_overrides() {
            let defaults = WaitOptions::default();
            let spec = AwaitStep::new(Probe::present("#new"))
                .timeout_ms(5000)
                .poll_interval_ms(100)
                .resolve(&defaults)
                .unwrap();
            assert_eq!(spec.options().timeout_ms, 5000);
            assert_eq!(spec.options().poll_interval_ms, 100);
        }

        #[test]
        fn test_resolve_caps_inherited_poll_below_step_timeout() {
            let defaults = WaitOptions::new().with_timeout(5000).with_poll_interval(2500);
            let spec = AwaitStep::new(Probe::present("#new"))
                .timeout_ms(2000)
                .resolve(&defaults)
                .unwrap();
            assert_eq!(spec.options().timeout_ms, 2000);
            assert_eq!(spec.options().poll_interval_ms, 1000);

            let spec = AwaitStep::new(Probe::present("#new"))
                .timeout_ms(3000)
                .resolve(&defaults)
                .unwrap();
            assert_eq!(spec.options().poll_interval_ms, 2500);
        }

        #[test]
        fn test_resolve_rejects_override_above_timeout() {
            let defaults = WaitOptions::new().with_timeout(2000).with_poll_interval(50);
            let err = AwaitStep::new(Probe::present("#new"))
                .poll_interval_ms(3000)
                .resolve(&defaults)
                .unwrap_err();
            assert!(matches!(err, WaitError::InvalidSpec { .. }));
        }

        #[test]
        fn test_display() {
            assert_eq!(Step::navigate_root().to_string(), "navigate to root");
            assert_eq!(Step::click("#save").to_string(), "click #save");
            assert_eq!(
                Step::wait_within(Probe::present("#new"), 2000).to_string(),
                "await #new present within 2000ms"
            );
        }
    }

    mod action_tests {
        use super::*;

        #[test]
        fn test_single_locator_requires_match() {
            let driver = MockDriver::new();
            let err = Step::perform_action(&driver, &Locator::one("#save"), &ActionKind::Click).unwrap_err();
            assert!(err.is_transient());
        }

        #[test]
        fn test_single_locator_acts_on_first() {
            let driver = MockDriver::new();
            let inputs = driver.set_elements("input", &["", ""]);
            Step::perform_action(
                &driver,
                &Locator::one("input"),
                &ActionKind::Type {
                    text: "Kia".to_string(),
                },
            )
            .unwrap();
            assert_eq!(inputs[0].value(), "Kia");
            assert_eq!(inputs[1].value(), "");
        }

        #[test]
        fn test_all_locator_acts_on_every_match() {
            let driver = MockDriver::new();
            let buttons = driver.set_elements("button", &["a", "b", "c"]);
            Step::perform_action(&driver, &Locator::all("button"), &ActionKind::Click).unwrap();
            assert!(buttons.iter().all(|b| b.clicks() == 1));
        }

        #[test]
        fn test_all_locator_fails_without_matches() {
            let driver = MockDriver::new();
            assert!(Step::perform_action(&driver, &Locator::all("button"), &ActionKind::Click).is_err());
        }

        #[test]
        fn test_clear() {
            let element = MockElement::new("").with_attribute("value", "Moon roof");
            ActionKind::Clear.perform(&element).unwrap();
            assert_eq!(element.value(), "");
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_rejects_empty() {
            assert!(Scenario::new("").step(Step::navigate_root()).validate().is_err());
            assert!(Scenario::new("empty").validate().is_err());
        }

        #[test]
        fn test_rejects_interaction_without_target() {
            let scenario = Scenario::new("bad").step(Step::wait(
                Condition::new(Probe::not(Probe::present("#x"))).then(Interaction::Click),
            ));
            let err = scenario.validate().unwrap_err();
            assert!(err.to_string().contains("step 0"));
        }

        #[test]
        fn test_rejects_bad_nested_pattern() {
            let scenario = Scenario::new("bad").step(Step::wait(Probe::all(vec![
                Probe::present("#x"),
                Probe::text_matches("#x", "[unclosed"),
            ])));
            assert!(scenario.validate().is_err());
        }

        #[test]
        fn test_accepts_row_click_within() {
            let scenario = Scenario::new("edit").step(Step::wait(
                Condition::new(Probe::row(Locator::all("#tbodycars tr"), CellText::key("938")))
                    .then(Interaction::click_within("a")),
            ));
            assert!(scenario.validate().is_ok());
        }
    }

    mod yaml_tests {
        use super::*;

        const FILTER_YAML: &str = r##"
name: filter
description: typing 2002 leaves two rows
steps:
  - step: navigate
    path: ""
  - step: await
    condition:
      probe: { kind: present, locator: { selector: "#filter" } }
      on_first_true: { kind: type, text: "2002" }
  - step: await
    condition:
      probe:
        kind: count
        locator: { selector: "#tbodycars tr", cardinality: all }
        expected: 2
    timeout_ms: 3000
  - step: act
    locator: { selector: "#filter" }
    action: { kind: clear }
"##;

        #[test]
        fn test_from_yaml() {
            let scenario = Scenario::from_yaml(FILTER_YAML).unwrap();
            assert_eq!(scenario.name, "filter");
            assert_eq!(scenario.steps.len(), 4);
            assert_eq!(
                scenario.steps[1],
                Step::wait(Condition::new(Probe::present("#filter")).then(Interaction::type_text("2002")))
            );
            assert_eq!(
                scenario.steps[2],
                Step::wait_within(Probe::count(Locator::all("#tbodycars tr"), 2), 3000)
            );
            assert_eq!(scenario.steps[3], Step::clear("#filter"));
        }

        #[test]
        fn test_from_yaml_reports_parse_error() {
            let err = Scenario::from_yaml("name: x\nsteps:\n  - step: teleport\n").unwrap_err();
            assert!(matches!(err, HarnessError::ScenarioParse { .. }));
        }

        #[test]
        fn test_load_scenarios_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            let yaml = format!("- {}", FILTER_YAML.trim_start().replace('\n', "\n  "));
            file.write_all(yaml.as_bytes()).unwrap();
            let scenarios = load_scenarios(file.path()).unwrap();
            assert_eq!(scenarios.len(), 1);
            assert_eq!(scenarios[0].description.as_deref(), Some("typing 2002 leaves two rows"));
        }

        #[test]
        fn test_load_scenarios_names_file_on_error() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(b"- name: x\n  steps: 3\n").unwrap();
            match load_scenarios(file.path()).unwrap_err() {
                HarnessError::ScenarioParse { name, .. } => {
                    assert_eq!(name, file.path().display().to_string());
                }
                other => panic!("expected parse error, got {other:?}"),
            }
        }

        #[test]
        fn test_to_yaml_mentions_steps() {
            let yaml = Scenario::new("sort")
                .step(Step::navigate_root())
                .step(Step::click("#h_year"))
                .to_yaml()
                .unwrap();
            assert!(yaml.contains("step: navigate"));
            assert!(yaml.contains("kind: click"));
        }
    }
}
