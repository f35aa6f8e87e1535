//! Harness configuration.
//!
//! Resolved once at startup: defaults, then an optional YAML file, then
//! `CARLIST_*` environment variables. The CLI layers its flags on top.

use crate::driver::DriverConfig;
use crate::fixture::DEFAULT_RESET_TIMEOUT_MS;
use crate::result::{HarnessError, HarnessResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default application URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Environment variable overriding [`HarnessConfig::base_url`]
pub const ENV_BASE_URL: &str = "CARLIST_BASE_URL";
/// Environment variable overriding [`HarnessConfig::driver_path`]
pub const ENV_DRIVER_PATH: &str = "CARLIST_DRIVER_PATH";
/// Environment variable overriding [`HarnessConfig::poll_interval_ms`]
pub const ENV_POLL_INTERVAL_MS: &str = "CARLIST_POLL_INTERVAL_MS";
/// Environment variable overriding [`HarnessConfig::default_timeout_ms`]
pub const ENV_TIMEOUT_MS: &str = "CARLIST_TIMEOUT_MS";

/// Configuration for a harness run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root URL of the application under test
    pub base_url: String,
    /// Browser executable (auto-detected when unset)
    pub driver_path: Option<PathBuf>,
    /// Run the browser headless
    pub headless: bool,
    /// Default poll interval for waits
    pub poll_interval_ms: u64,
    /// Default timeout for waits
    pub default_timeout_ms: u64,
    /// Timeout for the fixture reset request
    pub reset_timeout_ms: u64,
    /// Maximum concurrent scenarios
    pub jobs: usize,
    /// Stop after the first scenario that does not pass
    pub fail_fast: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            driver_path: None,
            headless: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            default_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            reset_timeout_ms: DEFAULT_RESET_TIMEOUT_MS,
            jobs: 1,
            fail_fast: false,
        }
    }
}

impl HarnessConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML; missing keys keep their defaults
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text).map_err(|e| HarnessError::config(format!("{}: {e}", path.display())))
    }

    /// Defaults, then `path` if given, then the process environment
    pub fn resolve(path: Option<&Path>) -> HarnessResult<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `CARLIST_*` overrides read through `lookup`
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> HarnessResult<Self> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(path) = lookup(ENV_DRIVER_PATH) {
            self.driver_path = Some(PathBuf::from(path));
        }
        if let Some(ms) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_ms(ENV_POLL_INTERVAL_MS, &ms)?;
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS) {
            self.default_timeout_ms = parse_ms(ENV_TIMEOUT_MS, &ms)?;
        }
        Ok(self)
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set default wait timing
    #[must_use]
    pub const fn with_timing(mut self, timeout_ms: u64, poll_interval_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> HarnessResult<()> {
        parse_base_url(&self.base_url)?;
        if self.reset_timeout_ms == 0 {
            return Err(HarnessError::config("reset_timeout_ms must be positive"));
        }
        if self.jobs == 0 {
            return Err(HarnessError::config("jobs must be at least 1"));
        }
        self.wait_options()
            .validate()
            .map_err(|e| HarnessError::config(e.to_string()))
    }

    /// Resolve `path` against the base URL; `""` is the root
    pub fn url_for(&self, path: &str) -> HarnessResult<String> {
        join_url(&self.base_url, path)
    }

    /// Default wait timing
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.default_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Fixture reset timeout
    #[must_use]
    pub const fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }

    /// Browser settings for new sessions
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        let config = DriverConfig::new().headless(self.headless);
        match self.driver_path {
            Some(ref path) => config.executable_path(path.clone()),
            None => config,
        }
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> HarnessResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// Parse an application base URL: absolute `http`/`https` with a host
pub fn parse_base_url(base: &str) -> HarnessResult<Url> {
    let url = Url::parse(base).map_err(|e| HarnessError::config(format!("base_url {base:?} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(HarnessError::config(format!(
            "base_url must be an http:// or https:// URL, got {base:?}"
        )));
    }
    Ok(url)
}

/// Resolve `path` below `base`.
///
/// The base path is treated as a directory and `path` as relative to it, so
/// `/cars/938` and `cars/938` resolve alike. A query on the base carries over
/// to same-origin results. Absolute URLs pass through.
pub fn join_url(base: &str, path: &str) -> HarnessResult<String> {
    let mut root = parse_base_url(base)?;
    let query = root.query().map(str::to_string);
    root.set_query(None);
    root.set_fragment(None);
    if !root.path().ends_with('/') {
        let dir = format!("{}/", root.path());
        root.set_path(&dir);
    }

    let mut url = root
        .join(path.trim_start_matches('/'))
        .map_err(|e| HarnessError::config(format!("cannot resolve {path:?} against {base:?}: {e}")))?;
    if url.query().is_none() && url.origin() == root.origin() {
        url.set_query(query.as_deref());
    }
    Ok(url.into())
}

fn parse_ms(key: &str, value: &str) -> HarnessResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| HarnessError::config(format!("{key} must be a number of milliseconds, got {value:?}")))
}
