//! Locator abstraction for element selection.
//!
//! A [`Locator`] only *describes* what to find. The selector text is handed to
//! the [`crate::Driver`] untouched; nothing in the harness parses it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How many elements a locator is expected to address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// The first matching element
    #[default]
    One,
    /// Every matching element
    All,
}

/// A locator for finding elements in the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Selector understood by the driver (CSS for the bundled backends)
    pub selector: String,
    /// Single or all-matching
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl Locator {
    /// Locate the first element matching `selector`
    #[must_use]
    pub fn one(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            cardinality: Cardinality::One,
        }
    }

    /// Locate every element matching `selector`
    #[must_use]
    pub fn all(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            cardinality: Cardinality::All,
        }
    }

    /// Get the selector text
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Whether this locator addresses every match
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self.cardinality, Cardinality::All)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cardinality {
            Cardinality::One => write!(f, "{}", self.selector),
            Cardinality::All => write!(f, "all({})", self.selector),
        }
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Self::one(selector)
    }
}
