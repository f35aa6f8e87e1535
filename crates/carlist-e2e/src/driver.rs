//! Driver capability consumed by the harness.
//!
//! The harness never talks to a browser directly. It sees a [`Driver`] that
//! resolves [`Locator`]s to [`Element`] handles, and a [`SessionFactory`] that
//! hands out one fresh driver per scenario.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Driver (trait)                                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐   ┌──────────────────────────────┐ │
//! │  │  ChromiumDriver      │   │  SimulatedCarList / Mock     │ │
//! │  │  (feature browser)   │   │  (in-memory, unit tests)     │ │
//! │  │  CDP via chromiumoxide│  │                              │ │
//! │  └──────────────────────┘   └──────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation may fail with a transient error (element absent, handle
//! stale); see [`DriverError::is_transient`].

use crate::locator::Locator;
use crate::result::{DriverError, DriverResult, HarnessResult};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Owned handle to a live element
pub type ElementRef = Box<dyn Element>;

/// A handle to one rendered element.
pub trait Element: fmt::Debug + Send {
    /// Visible text of the element
    fn text(&self) -> DriverResult<String>;

    /// Value of a property or attribute.
    ///
    /// Like WebDriver's `getAttribute`, the live property wins over the markup
    /// attribute, so `attribute("value")` reads what the user typed.
    fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self) -> DriverResult<bool>;

    /// Click the element
    fn click(&self) -> DriverResult<()>;

    /// Type text into the element
    fn send_keys(&self, text: &str) -> DriverResult<()>;

    /// Erase the element's value the way a user would (select all, delete)
    fn clear(&self) -> DriverResult<()>;

    /// Find descendants of this element
    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>>;

    /// Find the first descendant of this element
    fn find_one(&self, locator: &Locator) -> DriverResult<Option<ElementRef>> {
        Ok(self.find_all(locator)?.into_iter().next())
    }
}

/// A live browser session.
pub trait Driver: Send {
    /// Load `url` in the session's page
    fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// URL currently loaded
    fn current_url(&self) -> DriverResult<String>;

    /// Find every element matching `locator`
    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>>;

    /// Find the first element matching `locator`
    fn find_one(&self, locator: &Locator) -> DriverResult<Option<ElementRef>> {
        Ok(self.find_all(locator)?.into_iter().next())
    }

    /// Find the first element matching `locator`, failing with a
    /// not-found error when there is none
    fn require(&self, locator: &Locator) -> DriverResult<ElementRef> {
        self.find_one(locator)?
            .ok_or_else(|| DriverError::not_found(locator.to_string()))
    }

    /// Close the session and release the browser
    fn close(&mut self) -> DriverResult<()>;
}

/// Hands out one fresh [`Driver`] per scenario.
pub trait SessionFactory: Send + Sync {
    /// Open a new session
    fn open(&self) -> HarnessResult<Box<dyn Driver>>;
}

impl<F> SessionFactory for F
where
    F: Fn() -> HarnessResult<Box<dyn Driver>> + Send + Sync,
{
    fn open(&self) -> HarnessResult<Box<dyn Driver>> {
        self()
    }
}

/// Browser configuration for driver sessions
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Browser executable override
    pub executable_path: Option<PathBuf>,
    /// Disable the Chromium sandbox (containers/CI)
    pub no_sandbox: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            navigation_timeout: Duration::from_secs(30),
            executable_path: None,
            no_sandbox: false,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Use a specific browser executable
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Disable the sandbox
    #[must_use]
    pub const fn no_sandbox(mut self, no_sandbox: bool) -> Self {
        self.no_sandbox = no_sandbox;
        self
    }
}
