//! Fixture reset.
//!
//! Every scenario starts from the same five records. The application exposes
//! an idempotent `GET /reset` that restores them; a [`ResetGateway`] is the
//! harness's view of that endpoint.

use crate::config::{join_url, HarnessConfig};
use crate::result::{HarnessError, HarnessResult};
use std::time::Duration;

/// Default timeout for the reset request (10 seconds)
pub const DEFAULT_RESET_TIMEOUT_MS: u64 = 10_000;

/// Restores the application's baseline dataset.
pub trait ResetGateway: Send + Sync {
    /// Restore the fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the application could not be reset. The runner
    /// treats this as a failed precondition and does not retry.
    fn reset(&self) -> HarnessResult<()>;

    /// Whether concurrent scenarios are isolated from each other's writes.
    ///
    /// A single shared dataset is not, so the default is `false` and the
    /// runner serializes.
    fn is_atomic(&self) -> bool {
        false
    }
}

/// Resets the fixture over HTTP
#[derive(Debug, Clone)]
pub struct HttpResetGateway {
    url: String,
    client: reqwest::blocking::Client,
    atomic: bool,
}

impl HttpResetGateway {
    /// Create a gateway for `<base_url>/reset`
    pub fn new(base_url: &str, timeout: Duration) -> HarnessResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarnessError::ResetFailed {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            url: join_url(base_url, "reset")?,
            client,
            atomic: false,
        })
    }

    /// Create a gateway from resolved configuration
    pub fn from_config(config: &HarnessConfig) -> HarnessResult<Self> {
        Self::new(&config.base_url, config.reset_timeout())
    }

    /// Declare that the backend isolates concurrent scenarios
    #[must_use]
    pub const fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Reset endpoint URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ResetGateway for HttpResetGateway {
    fn reset(&self) -> HarnessResult<()> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| HarnessError::ResetFailed {
                message: format!("{}: {e}", self.url),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarnessError::ResetRejected {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        tracing::info!(url = %self.url, status = status.as_u16(), "fixture reset");
        Ok(())
    }

    fn is_atomic(&self) -> bool {
        self.atomic
    }
}
