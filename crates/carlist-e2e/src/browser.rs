//! Chromium backend over the Chrome DevTools Protocol.
//!
//! chromiumoxide is async; the harness is not. Each factory owns a tokio
//! runtime and every driver call blocks on it, so the rest of the crate only
//! ever sees the synchronous [`Driver`] and [`Element`] traits.

use crate::driver::{Driver, DriverConfig, Element, ElementRef, SessionFactory};
use crate::locator::Locator;
use crate::result::{DriverError, DriverErrorKind, DriverResult, HarnessError, HarnessResult};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::element::Element as CdpElement;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::sync::Arc;
use tokio::runtime::Runtime;

const IS_DISPLAYED_JS: &str = "function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}";

const SELECT_ALL_JS: &str = "function() { this.focus(); if (this.select) { this.select(); } }";

/// Map a CDP failure onto the harness's error kinds.
///
/// Node lookups that race a re-render surface as "could not find node" or
/// "no node with given id"; those are stale handles, not missing elements.
fn classify(message: &str) -> DriverErrorKind {
    let lower = message.to_ascii_lowercase();
    if lower.contains("no node") || lower.contains("could not find node") || lower.contains("detached") {
        DriverErrorKind::Stale
    } else if lower.contains("not found") {
        DriverErrorKind::NotFound
    } else if lower.contains("navigat") || lower.contains("execution context was destroyed") {
        DriverErrorKind::NavigationInProgress
    } else if lower.contains("javascript") || lower.contains("exception") {
        DriverErrorKind::Script
    } else {
        DriverErrorKind::Session
    }
}

fn cdp_error(context: &str, err: &CdpError) -> DriverError {
    let message = err.to_string();
    DriverError::new(classify(&message), format!("{context}: {message}"))
}

/// A DOM element inside a Chromium page
#[derive(Debug)]
pub struct ChromiumElement {
    runtime: Arc<Runtime>,
    inner: CdpElement,
}

impl ChromiumElement {
    fn wrap(runtime: &Arc<Runtime>, elements: Vec<CdpElement>) -> Vec<ElementRef> {
        elements
            .into_iter()
            .map(|inner| {
                Box::new(Self {
                    runtime: Arc::clone(runtime),
                    inner,
                }) as ElementRef
            })
            .collect()
    }

    fn call_js(&self, function: &str) -> DriverResult<Option<serde_json::Value>> {
        self.runtime
            .block_on(self.inner.call_js_fn(function, false))
            .map(|returns| returns.result.value)
            .map_err(|e| cdp_error("script", &e))
    }
}

impl Element for ChromiumElement {
    fn text(&self) -> DriverResult<String> {
        self.runtime
            .block_on(self.inner.inner_text())
            .map(Option::unwrap_or_default)
            .map_err(|e| cdp_error("text", &e))
    }

    fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        // Live properties first so `value` reflects typing, then the markup.
        let property = self
            .runtime
            .block_on(self.inner.property(name))
            .map_err(|e| cdp_error("property", &e))?;
        match property {
            Some(serde_json::Value::String(s)) => return Ok(Some(s)),
            Some(serde_json::Value::Number(n)) => return Ok(Some(n.to_string())),
            Some(serde_json::Value::Bool(b)) => return Ok(Some(b.to_string())),
            _ => {}
        }
        self.runtime
            .block_on(self.inner.attribute(name))
            .map_err(|e| cdp_error("attribute", &e))
    }

    fn is_displayed(&self) -> DriverResult<bool> {
        Ok(self
            .call_js(IS_DISPLAYED_JS)?
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    fn click(&self) -> DriverResult<()> {
        self.runtime.block_on(async {
            self.inner.scroll_into_view().await?;
            self.inner.click().await.map(|_| ())
        })
        .map_err(|e| cdp_error("click", &e))
    }

    fn send_keys(&self, text: &str) -> DriverResult<()> {
        self.runtime.block_on(async {
            self.inner.focus().await?;
            self.inner.type_str(text).await.map(|_| ())
        })
        .map_err(|e| cdp_error("type", &e))
    }

    fn clear(&self) -> DriverResult<()> {
        self.call_js(SELECT_ALL_JS)?;
        self.runtime
            .block_on(self.inner.press_key("Backspace"))
            .map(|_| ())
            .map_err(|e| cdp_error("clear", &e))
    }

    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        match self.runtime.block_on(self.inner.find_elements(locator.selector())) {
            Ok(elements) => Ok(Self::wrap(&self.runtime, elements)),
            Err(e) => match classify(&e.to_string()) {
                DriverErrorKind::NotFound => Ok(Vec::new()),
                kind => Err(DriverError::new(kind, format!("find {locator}: {e}"))),
            },
        }
    }
}

/// A Chromium session: one browser process and one page
#[derive(Debug)]
pub struct ChromiumDriver {
    runtime: Arc<Runtime>,
    browser: Option<CdpBrowser>,
    page: CdpPage,
    handler: tokio::task::JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch a browser on `runtime`
    pub fn launch(config: &DriverConfig, runtime: Arc<Runtime>) -> HarnessResult<Self> {
        let session_error = |message: String| HarnessError::Session { message };

        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.navigation_timeout);
        if !config.headless {
            builder = builder.with_head();
        }
        if config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(session_error)?;

        let (browser, page, handler) = runtime.block_on(async {
            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            let page = browser.new_page("about:blank").await?;
            Ok::<_, CdpError>((browser, page, handler))
        })
        .map_err(|e| session_error(e.to_string()))?;

        tracing::debug!(headless = config.headless, "chromium session opened");
        Ok(Self {
            runtime,
            browser: Some(browser),
            page,
            handler,
        })
    }

    fn live(&self) -> DriverResult<()> {
        if self.browser.is_some() {
            Ok(())
        } else {
            Err(DriverError::session("session closed"))
        }
    }
}

impl Driver for ChromiumDriver {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.live()?;
        self.runtime
            .block_on(self.page.goto(url))
            .map(|_| ())
            .map_err(|e| DriverError::new(DriverErrorKind::Navigation, format!("{url}: {e}")))
    }

    fn current_url(&self) -> DriverResult<String> {
        self.live()?;
        self.runtime
            .block_on(self.page.url())
            .map(Option::unwrap_or_default)
            .map_err(|e| cdp_error("url", &e))
    }

    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        self.live()?;
        match self.runtime.block_on(self.page.find_elements(locator.selector())) {
            Ok(elements) => Ok(ChromiumElement::wrap(&self.runtime, elements)),
            Err(e) => match classify(&e.to_string()) {
                DriverErrorKind::NotFound => Ok(Vec::new()),
                kind => Err(DriverError::new(kind, format!("find {locator}: {e}"))),
            },
        }
    }

    fn close(&mut self) -> DriverResult<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        let result = self.runtime.block_on(async {
            browser.close().await?;
            let _ = browser.wait().await;
            Ok::<_, CdpError>(())
        });
        self.handler.abort();
        tracing::debug!("chromium session closed");
        result.map_err(|e| DriverError::session(e.to_string()))
    }
}

/// Opens a fresh Chromium session per scenario
#[derive(Debug, Clone)]
pub struct ChromiumFactory {
    config: DriverConfig,
    runtime: Arc<Runtime>,
}

impl ChromiumFactory {
    /// Create a factory with its own runtime
    pub fn new(config: DriverConfig) -> HarnessResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("carlist-cdp")
            .build()
            .map_err(|e| HarnessError::Session {
                message: format!("failed to start runtime: {e}"),
            })?;
        Ok(Self {
            config,
            runtime: Arc::new(runtime),
        })
    }

    /// Browser settings
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }
}

impl SessionFactory for ChromiumFactory {
    fn open(&self) -> HarnessResult<Box<dyn Driver>> {
        Ok(Box::new(ChromiumDriver::launch(&self.config, Arc::clone(&self.runtime))?))
    }
}
