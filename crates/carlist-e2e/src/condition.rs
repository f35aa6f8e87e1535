//! Conditions: re-evaluatable predicates over live page state.
//!
//! A [`Condition`] pairs a declarative [`Probe`] with an optional
//! [`Interaction`] that runs on the poll where the probe first holds, against
//! the element that poll observed. This is what lets one wait both detect
//! readiness and act on it ("once the filter input exists, type into it")
//! without re-querying through a possibly stale handle.
//!
//! Probes return a tri-state [`Verdict`]. Driver errors raised while probing
//! are returned as `Err` and the [`crate::Waiter`] decides what to do with them.

use crate::driver::{Driver, Element, ElementRef};
use crate::locator::Locator;
use crate::result::{DriverError, DriverErrorKind, DriverResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell selector used for table rows unless a probe overrides it
pub const DEFAULT_CELL_SELECTOR: &str = "td";

fn default_cells() -> Locator {
    Locator::all(DEFAULT_CELL_SELECTOR)
}

/// Outcome of a single probe evaluation
#[derive(Debug)]
pub enum Verdict {
    /// Not true yet; poll again
    Pending,
    /// True; carries the element the probe observed, if any
    Satisfied(Option<ElementRef>),
    /// Can never become true; stop polling
    Failed(String),
}

impl Verdict {
    /// Satisfied without a subject element
    #[must_use]
    pub const fn satisfied() -> Self {
        Self::Satisfied(None)
    }

    /// Check if the verdict is satisfied
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    /// Check if the verdict is pending
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    fn from_bool(holds: bool, subject: Option<ElementRef>) -> Self {
        if holds {
            Self::Satisfied(subject)
        } else {
            Self::Pending
        }
    }
}

/// Expected text of one cell in a table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellText {
    /// Zero-based cell index
    pub column: usize,
    /// Exact text
    pub text: String,
}

impl CellText {
    /// Create a new cell expectation
    #[must_use]
    pub fn new(column: usize, text: impl Into<String>) -> Self {
        Self {
            column,
            text: text.into(),
        }
    }

    /// Expectation on the row key (cell 0)
    #[must_use]
    pub fn key(text: impl Into<String>) -> Self {
        Self::new(0, text)
    }
}

/// Built-in predicates over the rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Probe {
    /// At least one element matches
    Present {
        /// Element to look for
        locator: Locator,
    },
    /// The first match is displayed
    Visible {
        /// Element to look for
        locator: Locator,
    },
    /// Exactly `expected` elements match
    Count {
        /// Elements to count
        locator: Locator,
        /// Expected number of matches
        expected: usize,
    },
    /// The first match's text equals `expected`
    Text {
        /// Element to read
        locator: Locator,
        /// Exact text
        expected: String,
    },
    /// The first match's text matches a regular expression
    TextMatches {
        /// Element to read
        locator: Locator,
        /// Regular expression
        pattern: String,
    },
    /// The first match's attribute (or property) equals `expected`
    Attribute {
        /// Element to read
        locator: Locator,
        /// Attribute name
        name: String,
        /// Exact value
        expected: String,
    },
    /// A row whose `key` cell matches exists, and optionally another of its
    /// cells reads `expect`
    Row {
        /// Table rows
        rows: Locator,
        /// Cells within a row
        #[serde(default = "default_cells")]
        cells: Locator,
        /// Cell identifying the row
        key: CellText,
        /// Additional cell the row must show
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<CellText>,
    },
    /// The first and last rows carry the given keys (cell 0)
    FirstAndLast {
        /// Table rows
        rows: Locator,
        /// Cells within a row
        #[serde(default = "default_cells")]
        cells: Locator,
        /// Key of the first row
        first: String,
        /// Key of the last row
        last: String,
    },
    /// Every probe holds
    All {
        /// Conjuncts, evaluated in order
        probes: Vec<Probe>,
    },
    /// The probe does not hold
    Not {
        /// Negated probe
        probe: Box<Probe>,
    },
}

impl Probe {
    /// `locator` matches at least one element
    #[must_use]
    pub fn present(locator: impl Into<Locator>) -> Self {
        Self::Present {
            locator: locator.into(),
        }
    }

    /// `locator`'s first match is displayed
    #[must_use]
    pub fn visible(locator: impl Into<Locator>) -> Self {
        Self::Visible {
            locator: locator.into(),
        }
    }

    /// `locator` matches exactly `expected` elements
    #[must_use]
    pub fn count(locator: Locator, expected: usize) -> Self {
        Self::Count { locator, expected }
    }

    /// First match's text equals `expected`
    #[must_use]
    pub fn text(locator: impl Into<Locator>, expected: impl Into<String>) -> Self {
        Self::Text {
            locator: locator.into(),
            expected: expected.into(),
        }
    }

    /// First match's text matches `pattern`
    #[must_use]
    pub fn text_matches(locator: impl Into<Locator>, pattern: impl Into<String>) -> Self {
        Self::TextMatches {
            locator: locator.into(),
            pattern: pattern.into(),
        }
    }

    /// First match's `name` attribute equals `expected`
    #[must_use]
    pub fn attribute(
        locator: impl Into<Locator>,
        name: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::Attribute {
            locator: locator.into(),
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// A row keyed by `key` exists
    #[must_use]
    pub fn row(rows: Locator, key: CellText) -> Self {
        Self::Row {
            rows,
            cells: default_cells(),
            key,
            expect: None,
        }
    }

    /// A row keyed by `key` exists and shows `expect`
    #[must_use]
    pub fn row_showing(rows: Locator, key: CellText, expect: CellText) -> Self {
        Self::Row {
            rows,
            cells: default_cells(),
            key,
            expect: Some(expect),
        }
    }

    /// First row key is `first` and last row key is `last`
    #[must_use]
    pub fn first_and_last(rows: Locator, first: impl Into<String>, last: impl Into<String>) -> Self {
        Self::FirstAndLast {
            rows,
            cells: default_cells(),
            first: first.into(),
            last: last.into(),
        }
    }

    /// Conjunction
    #[must_use]
    pub fn all(probes: Vec<Self>) -> Self {
        Self::All { probes }
    }

    /// Negation
    #[must_use]
    pub fn not(probe: Self) -> Self {
        Self::Not {
            probe: Box::new(probe),
        }
    }

    /// Locator an interaction falls back to when a satisfied verdict carries
    /// no element
    #[must_use]
    pub fn primary_locator(&self) -> Option<&Locator> {
        match self {
            Self::Present { locator }
            | Self::Visible { locator }
            | Self::Count { locator, .. }
            | Self::Text { locator, .. }
            | Self::TextMatches { locator, .. }
            | Self::Attribute { locator, .. } => Some(locator),
            Self::Row { rows, .. } | Self::FirstAndLast { rows, .. } => Some(rows),
            Self::All { probes } => probes.iter().find_map(Self::primary_locator),
            Self::Not { .. } => None,
        }
    }

    /// Evaluate the probe once against live state
    pub fn evaluate(&self, driver: &dyn Driver) -> DriverResult<Verdict> {
        match self {
            Self::Present { locator } => Ok(match driver.find_one(locator)? {
                Some(element) => Verdict::Satisfied(Some(element)),
                None => Verdict::Pending,
            }),
            Self::Visible { locator } => match driver.find_one(locator)? {
                Some(element) => {
                    let shown = element.is_displayed()?;
                    Ok(Verdict::from_bool(shown, Some(element)))
                }
                None => Ok(Verdict::Pending),
            },
            Self::Count { locator, expected } => {
                let found = driver.find_all(locator)?.len();
                Ok(Verdict::from_bool(found == *expected, None))
            }
            Self::Text { locator, expected } => match driver.find_one(locator)? {
                Some(element) => {
                    let holds = element.text()?.trim() == expected;
                    Ok(Verdict::from_bool(holds, Some(element)))
                }
                None => Ok(Verdict::Pending),
            },
            Self::TextMatches { locator, pattern } => {
                let re = match Regex::new(pattern) {
                    Ok(re) => re,
                    Err(e) => return Ok(Verdict::Failed(format!("invalid pattern {pattern:?}: {e}"))),
                };
                match driver.find_one(locator)? {
                    Some(element) => {
                        let holds = re.is_match(&element.text()?);
                        Ok(Verdict::from_bool(holds, Some(element)))
                    }
                    None => Ok(Verdict::Pending),
                }
            }
            Self::Attribute {
                locator,
                name,
                expected,
            } => match driver.find_one(locator)? {
                Some(element) => {
                    let holds = element.attribute(name)?.as_deref() == Some(expected.as_str());
                    Ok(Verdict::from_bool(holds, Some(element)))
                }
                None => Ok(Verdict::Pending),
            },
            Self::Row {
                rows,
                cells,
                key,
                expect,
            } => {
                for row in driver.find_all(rows)? {
                    let row_cells = row.find_all(cells)?;
                    if !cell_reads(&row_cells, key)? {
                        continue;
                    }
                    let holds = match expect {
                        Some(expect) => cell_reads(&row_cells, expect)?,
                        None => true,
                    };
                    return Ok(Verdict::from_bool(holds, Some(row)));
                }
                Ok(Verdict::Pending)
            }
            Self::FirstAndLast {
                rows,
                cells,
                first,
                last,
            } => {
                let found = driver.find_all(rows)?;
                let (Some(first_row), Some(last_row)) = (found.first(), found.last()) else {
                    return Ok(Verdict::Pending);
                };
                let holds = row_key(first_row.as_ref(), cells)?.as_deref() == Some(first.as_str())
                    && row_key(last_row.as_ref(), cells)?.as_deref() == Some(last.as_str());
                Ok(Verdict::from_bool(holds, None))
            }
            Self::All { probes } => {
                let mut subject = None;
                for probe in probes {
                    match probe.evaluate(driver)? {
                        Verdict::Satisfied(observed) => {
                            if subject.is_none() {
                                subject = observed;
                            }
                        }
                        other => return Ok(other),
                    }
                }
                Ok(Verdict::Satisfied(subject))
            }
            Self::Not { probe } => Ok(match probe.evaluate(driver)? {
                Verdict::Satisfied(_) => Verdict::Pending,
                Verdict::Pending => Verdict::satisfied(),
                failed @ Verdict::Failed(_) => failed,
            }),
        }
    }
}

fn cell_reads(cells: &[ElementRef], expected: &CellText) -> DriverResult<bool> {
    match cells.get(expected.column) {
        Some(cell) => Ok(cell.text()?.trim() == expected.text),
        None => Ok(false),
    }
}

fn row_key(row: &dyn Element, cells: &Locator) -> DriverResult<Option<String>> {
    match row.find_one(cells)? {
        Some(cell) => Ok(Some(cell.text()?.trim().to_string())),
        None => Ok(None),
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present { locator } => write!(f, "{locator} present"),
            Self::Visible { locator } => write!(f, "{locator} visible"),
            Self::Count { locator, expected } => write!(f, "count({}) == {expected}", locator.selector),
            Self::Text { locator, expected } => write!(f, "text({locator}) == {expected:?}"),
            Self::TextMatches { locator, pattern } => write!(f, "text({locator}) =~ /{pattern}/"),
            Self::Attribute {
                locator,
                name,
                expected,
            } => write!(f, "{locator}[{name}] == {expected:?}"),
            Self::Row { rows, key, expect, .. } => {
                write!(f, "row of {} with cell {} == {:?}", rows.selector, key.column, key.text)?;
                if let Some(expect) = expect {
                    write!(f, " showing cell {} == {:?}", expect.column, expect.text)?;
                }
                Ok(())
            }
            Self::FirstAndLast {
                rows, first, last, ..
            } => write!(f, "rows of {} run {first:?}..{last:?}", rows.selector),
            Self::All { probes } => {
                let parts: Vec<String> = probes.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" and "))
            }
            Self::Not { probe } => write!(f, "not {probe}"),
        }
    }
}

/// Side effect run on the poll where a condition first holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// Click the observed element
    Click,
    /// Type into the observed element
    Type {
        /// Text to type
        text: String,
    },
    /// Clear the observed element
    Clear,
    /// Click a descendant of the observed element
    ClickWithin {
        /// Descendant to click
        locator: Locator,
    },
}

impl Interaction {
    /// Type `text` into the observed element
    #[must_use]
    pub fn type_text(text: impl Into<String>) -> Self {
        Self::Type { text: text.into() }
    }

    /// Click a descendant of the observed element
    #[must_use]
    pub fn click_within(locator: impl Into<Locator>) -> Self {
        Self::ClickWithin {
            locator: locator.into(),
        }
    }

    /// Perform the interaction on `subject`
    pub fn apply(&self, subject: &dyn Element) -> DriverResult<()> {
        match self {
            Self::Click => subject.click(),
            Self::Type { text } => subject.send_keys(text),
            Self::Clear => subject.clear(),
            Self::ClickWithin { locator } => subject
                .find_one(locator)?
                .ok_or_else(|| DriverError::not_found(locator.to_string()))?
                .click(),
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click => f.write_str("click"),
            Self::Type { text } => write!(f, "type {text:?}"),
            Self::Clear => f.write_str("clear"),
            Self::ClickWithin { locator } => write!(f, "click {locator} within"),
        }
    }
}

/// Trait for conditions the [`crate::Waiter`] can poll
pub trait WaitCondition {
    /// Evaluate the condition once
    fn poll(&self, driver: &dyn Driver) -> DriverResult<Verdict>;

    /// Run the on-first-true side effect against what the satisfying poll saw
    fn on_first_true(&self, _driver: &dyn Driver, _subject: Option<&dyn Element>) -> DriverResult<()> {
        Ok(())
    }

    /// Get description for error messages
    fn description(&self) -> String;
}

/// A declarative, serializable condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// What must hold
    pub probe: Probe,
    /// Side effect on the first satisfied poll
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_first_true: Option<Interaction>,
    /// When this holds, the wait fails permanently
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_when: Option<Probe>,
}

impl Condition {
    /// Create a condition from a probe
    #[must_use]
    pub fn new(probe: Probe) -> Self {
        Self {
            probe,
            on_first_true: None,
            abort_when: None,
        }
    }

    /// Run `interaction` on the poll where the probe first holds
    #[must_use]
    pub fn then(mut self, interaction: Interaction) -> Self {
        self.on_first_true = Some(interaction);
        self
    }

    /// Fail immediately once `probe` holds
    #[must_use]
    pub fn abort_when(mut self, probe: Probe) -> Self {
        self.abort_when = Some(probe);
        self
    }
}

impl From<Probe> for Condition {
    fn from(probe: Probe) -> Self {
        Self::new(probe)
    }
}

impl WaitCondition for Condition {
    fn poll(&self, driver: &dyn Driver) -> DriverResult<Verdict> {
        if let Some(ref guard) = self.abort_when {
            if guard.evaluate(driver)?.is_satisfied() {
                return Ok(Verdict::Failed(format!("{guard} while waiting for {}", self.probe)));
            }
        }
        self.probe.evaluate(driver)
    }

    fn on_first_true(&self, driver: &dyn Driver, subject: Option<&dyn Element>) -> DriverResult<()> {
        let Some(ref interaction) = self.on_first_true else {
            return Ok(());
        };
        if let Some(element) = subject {
            return interaction.apply(element);
        }
        match self.probe.primary_locator() {
            Some(locator) => interaction.apply(driver.require(locator)?.as_ref()),
            None => Err(DriverError::new(
                DriverErrorKind::Unsupported,
                format!("{} observed no element to {interaction}", self.probe),
            )),
        }
    }

    fn description(&self) -> String {
        match self.on_first_true {
            Some(ref interaction) => format!("{} then {interaction}", self.probe),
            None => self.probe.to_string(),
        }
    }
}

/// A function-based wait condition
pub struct FnCondition<F>
where
    F: Fn(&dyn Driver) -> DriverResult<Verdict>,
{
    func: F,
    description: String,
}

impl<F> fmt::Debug for FnCondition<F>
where
    F: Fn(&dyn Driver) -> DriverResult<Verdict>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> FnCondition<F>
where
    F: Fn(&dyn Driver) -> DriverResult<Verdict>,
{
    /// Create a new function condition
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F> WaitCondition for FnCondition<F>
where
    F: Fn(&dyn Driver) -> DriverResult<Verdict>,
{
    fn poll(&self, driver: &dyn Driver) -> DriverResult<Verdict> {
        (self.func)(driver)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};

    fn rows_driver(keys: &[&str]) -> MockDriver {
        let driver = MockDriver::new();
        let rows = keys
            .iter()
            .map(|key| {
                MockElement::new("").with_children(
                    "td",
                    vec![
                        MockElement::new(*key),
                        MockElement::new("2002"),
                        MockElement::new("Ford"),
                    ],
                )
            })
            .collect();
        driver.insert("#tbodycars tr", rows);
        driver
    }

    mod probe_tests {
        use super::*;

        #[test]
        fn test_present_observes_element() {
            let driver = MockDriver::new();
            assert!(Probe::present("#new").evaluate(&driver).unwrap().is_pending());

            driver.set_elements("#new", &["New"]);
            match Probe::present("#new").evaluate(&driver).unwrap() {
                Verdict::Satisfied(Some(element)) => assert_eq!(element.text().unwrap(), "New"),
                other => panic!("expected subject, got {other:?}"),
            }
        }

        #[test]
        fn test_visible_requires_display() {
            let driver = MockDriver::new();
            driver.insert("#filter", vec![MockElement::new("").hidden()]);
            assert!(Probe::visible("#filter").evaluate(&driver).unwrap().is_pending());

            driver.insert("#filter", vec![MockElement::new("")]);
            assert!(Probe::visible("#filter").evaluate(&driver).unwrap().is_satisfied());
        }

        #[test]
        fn test_count_exact() {
            let driver = rows_driver(&["936", "937", "938"]);
            let rows = Locator::all("#tbodycars tr");
            assert!(Probe::count(rows.clone(), 3).evaluate(&driver).unwrap().is_satisfied());
            assert!(Probe::count(rows.clone(), 5).evaluate(&driver).unwrap().is_pending());
            assert!(Probe::count(Locator::all("#none"), 0)
                .evaluate(&driver)
                .unwrap()
                .is_satisfied());
        }

        #[test]
        fn test_text_is_trimmed_and_exact() {
            let driver = MockDriver::new();
            driver.set_elements("#submiterr", &["  All fields are required\n"]);
            let probe = Probe::text("#submiterr", "All fields are required");
            assert!(probe.evaluate(&driver).unwrap().is_satisfied());

            let probe = Probe::text("#submiterr", "All fields");
            assert!(probe.evaluate(&driver).unwrap().is_pending());
        }

        #[test]
        fn test_text_matches_bad_pattern_is_permanent() {
            let driver = MockDriver::new();
            driver.set_elements("#x", &["abc"]);
            match Probe::text_matches("#x", "(").evaluate(&driver).unwrap() {
                Verdict::Failed(reason) => assert!(reason.contains("invalid pattern")),
                other => panic!("expected failure, got {other:?}"),
            }
            assert!(Probe::text_matches("#x", "^a.c$")
                .evaluate(&driver)
                .unwrap()
                .is_satisfied());
        }

        #[test]
        fn test_attribute_reads_value() {
            let driver = MockDriver::new();
            driver.insert("#id", vec![MockElement::new("").with_attribute("value", "938")]);
            assert!(Probe::attribute("#id", "value", "938")
                .evaluate(&driver)
                .unwrap()
                .is_satisfied());
            assert!(Probe::attribute("#id", "value", "939")
                .evaluate(&driver)
                .unwrap()
                .is_pending());
            assert!(Probe::attribute("#id", "placeholder", "938")
                .evaluate(&driver)
                .unwrap()
                .is_pending());
        }

        #[test]
        fn test_row_by_key_and_expected_cell() {
            let driver = rows_driver(&["936", "938"]);
            let rows = Locator::all("#tbodycars tr");

            match Probe::row(rows.clone(), CellText::key("938")).evaluate(&driver).unwrap() {
                Verdict::Satisfied(Some(row)) => {
                    let cells = row.find_all(&Locator::all("td")).unwrap();
                    assert_eq!(cells[0].text().unwrap(), "938");
                }
                other => panic!("expected row, got {other:?}"),
            }

            let showing = Probe::row_showing(rows.clone(), CellText::key("938"), CellText::new(2, "Ford"));
            assert!(showing.evaluate(&driver).unwrap().is_satisfied());

            let wrong = Probe::row_showing(rows.clone(), CellText::key("938"), CellText::new(2, "Kia"));
            assert!(wrong.evaluate(&driver).unwrap().is_pending());

            let out_of_range = Probe::row_showing(rows.clone(), CellText::key("938"), CellText::new(9, "x"));
            assert!(out_of_range.evaluate(&driver).unwrap().is_pending());

            assert!(Probe::row(rows, CellText::key("999")).evaluate(&driver).unwrap().is_pending());
        }

        #[test]
        fn test_first_and_last() {
            let rows = Locator::all("#tbodycars tr");
            let sorted = rows_driver(&["938", "936", "940"]);
            assert!(Probe::first_and_last(rows.clone(), "938", "940")
                .evaluate(&sorted)
                .unwrap()
                .is_satisfied());

            let unsorted = rows_driver(&["936", "938", "940"]);
            assert!(Probe::first_and_last(rows.clone(), "938", "940")
                .evaluate(&unsorted)
                .unwrap()
                .is_pending());

            let empty = MockDriver::new();
            assert!(Probe::first_and_last(rows, "938", "940")
                .evaluate(&empty)
                .unwrap()
                .is_pending());
        }

        #[test]
        fn test_all_and_not() {
            let driver = MockDriver::new();
            driver.set_elements("#new", &["New"]);
            driver.set_elements("#save", &["Save"]);

            let both = Probe::all(vec![Probe::present("#new"), Probe::present("#save")]);
            match both.evaluate(&driver).unwrap() {
                Verdict::Satisfied(Some(subject)) => assert_eq!(subject.text().unwrap(), "New"),
                other => panic!("expected subject from first conjunct, got {other:?}"),
            }

            let missing = Probe::all(vec![Probe::present("#new"), Probe::present("#gone")]);
            assert!(missing.evaluate(&driver).unwrap().is_pending());

            assert!(Probe::not(Probe::present("#gone"))
                .evaluate(&driver)
                .unwrap()
                .is_satisfied());
            assert!(Probe::not(Probe::present("#new"))
                .evaluate(&driver)
                .unwrap()
                .is_pending());
        }

        #[test]
        fn test_driver_errors_propagate() {
            let driver = MockDriver::new();
            driver.fail_next("#tbodycars tr", DriverError::stale("re-render"));
            let err = Probe::count(Locator::all("#tbodycars tr"), 5)
                .evaluate(&driver)
                .unwrap_err();
            assert!(err.is_transient());
        }

        #[test]
        fn test_display() {
            let probe = Probe::count(Locator::all("#tbodycars tr"), 5);
            assert_eq!(probe.to_string(), "count(#tbodycars tr) == 5");
            let probe = Probe::not(Probe::present("#x"));
            assert_eq!(probe.to_string(), "not #x present");
        }

        #[test]
        fn test_yaml_shape() {
            let yaml = "kind: row\nrows:\n  selector: '#tbodycars tr'\n  cardinality: all\nkey:\n  column: 0\n  text: '938'\n";
            let probe: Probe = serde_yaml_ng::from_str(yaml).unwrap();
            assert_eq!(
                probe,
                Probe::row(Locator::all("#tbodycars tr"), CellText::key("938"))
            );
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_on_first_true_acts_on_subject() {
            let driver = MockDriver::new();
            let filter = driver.set_elements("#filter", &[""]).remove(0);
            let condition = Condition::new(Probe::present("#filter")).then(Interaction::type_text("2002"));

            let Verdict::Satisfied(subject) = condition.poll(&driver).unwrap() else {
                panic!("filter should be present");
            };
            condition.on_first_true(&driver, subject.as_deref()).unwrap();
            assert_eq!(filter.value(), "2002");
        }

        #[test]
        fn test_click_within_row() {
            let driver = MockDriver::new();
            let link = MockElement::new("edit");
            driver.insert(
                "#tbodycars tr",
                vec![MockElement::new("")
                    .with_children("td", vec![MockElement::new("938")])
                    .with_children("a", vec![link.clone()])],
            );
            let condition = Condition::new(Probe::row(Locator::all("#tbodycars tr"), CellText::key("938")))
                .then(Interaction::click_within("a"));

            let Verdict::Satisfied(subject) = condition.poll(&driver).unwrap() else {
                panic!("row should be present");
            };
            condition.on_first_true(&driver, subject.as_deref()).unwrap();
            assert_eq!(link.clicks(), 1);
        }

        #[test]
        fn test_interaction_relocates_when_probe_has_no_subject() {
            let driver = MockDriver::new();
            let filter = driver.set_elements("#filter", &[""]).remove(0);
            let condition = Condition::new(Probe::count(Locator::all("#filter"), 1))
                .then(Interaction::type_text("2002"));
            condition.on_first_true(&driver, None).unwrap();
            assert_eq!(filter.value(), "2002");
        }

        #[test]
        fn test_interaction_without_any_target_is_unsupported() {
            let driver = MockDriver::new();
            let condition = Condition::new(Probe::not(Probe::present("#x"))).then(Interaction::Click);
            let err = condition.on_first_true(&driver, None).unwrap_err();
            assert_eq!(err.kind, DriverErrorKind::Unsupported);
            assert!(!err.is_transient());
        }

        #[test]
        fn test_abort_when_fails_permanently() {
            let driver = MockDriver::new();
            driver.set_elements("#submiterr", &["All fields are required"]);
            let condition = Condition::new(Probe::count(Locator::all("#tbodycars tr"), 6))
                .abort_when(Probe::present("#submiterr"));
            match condition.poll(&driver).unwrap() {
                Verdict::Failed(reason) => assert!(reason.contains("#submiterr present")),
                other => panic!("expected permanent failure, got {other:?}"),
            }
        }

        #[test]
        fn test_description_mentions_interaction() {
            let condition = Condition::new(Probe::present("#h_year")).then(Interaction::Click);
            assert_eq!(condition.description(), "#h_year present then click");
        }

        #[test]
        fn test_fn_condition() {
            let driver = MockDriver::new();
            let condition = FnCondition::new(|_: &dyn Driver| Ok(Verdict::satisfied()), "always");
            assert!(condition.poll(&driver).unwrap().is_satisfied());
            assert_eq!(condition.description(), "always");
            assert!(condition.on_first_true(&driver, None).is_ok());
        }
    }
}
