//! Scripted mock driver.

use crate::driver::{Driver, Element, ElementRef};
use crate::locator::Locator;
use crate::result::{DriverError, DriverResult};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct MockNode {
    text: String,
    attributes: HashMap<String, String>,
    hidden: bool,
    stale: bool,
    children: HashMap<String, Vec<MockElement>>,
    clicks: u32,
}

/// A scripted element.
///
/// Clones share state, so a test can keep a handle and inspect what the
/// harness did to it.
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    node: Arc<Mutex<MockNode>>,
}

impl MockElement {
    /// Create a visible element with `text`
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let element = Self::default();
        lock(&element.node).text = text.into();
        element
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        lock(&self.node).attributes.insert(name.into(), value.into());
        self
    }

    /// Add descendants reachable through `selector`
    #[must_use]
    pub fn with_children(self, selector: impl Into<String>, children: Vec<Self>) -> Self {
        lock(&self.node)
            .children
            .entry(selector.into())
            .or_default()
            .extend(children);
        self
    }

    /// Mark as not displayed
    #[must_use]
    pub fn hidden(self) -> Self {
        lock(&self.node).hidden = true;
        self
    }

    /// Mark as detached; every operation fails with a stale error
    #[must_use]
    pub fn stale(self) -> Self {
        self.set_stale(true);
        self
    }

    /// Detach or re-attach the element
    pub fn set_stale(&self, stale: bool) {
        lock(&self.node).stale = stale;
    }

    /// Replace the element's text
    pub fn set_text(&self, text: impl Into<String>) {
        lock(&self.node).text = text.into();
    }

    /// Number of clicks received
    #[must_use]
    pub fn clicks(&self) -> u32 {
        lock(&self.node).clicks
    }

    /// Current `value` (what was typed)
    #[must_use]
    pub fn value(&self) -> String {
        lock(&self.node)
            .attributes
            .get("value")
            .cloned()
            .unwrap_or_default()
    }

    fn live(&self) -> DriverResult<MutexGuard<'_, MockNode>> {
        let node = lock(&self.node);
        if node.stale {
            return Err(DriverError::stale(format!("element {:?} is detached", node.text)));
        }
        Ok(node)
    }
}

impl Element for MockElement {
    fn text(&self) -> DriverResult<String> {
        Ok(self.live()?.text.clone())
    }

    fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        Ok(self.live()?.attributes.get(name).cloned())
    }

    fn is_displayed(&self) -> DriverResult<bool> {
        Ok(!self.live()?.hidden)
    }

    fn click(&self) -> DriverResult<()> {
        self.live()?.clicks += 1;
        Ok(())
    }

    fn send_keys(&self, text: &str) -> DriverResult<()> {
        self.live()?
            .attributes
            .entry("value".to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    fn clear(&self) -> DriverResult<()> {
        self.live()?.attributes.insert("value".to_string(), String::new());
        Ok(())
    }

    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let node = self.live()?;
        Ok(node
            .children
            .get(locator.selector())
            .map(|children| {
                children
                    .iter()
                    .map(|child| Box::new(child.clone()) as ElementRef)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Debug, Default)]
struct MockDom {
    url: String,
    elements: HashMap<String, Vec<MockElement>>,
    failures: HashMap<String, VecDeque<DriverError>>,
    call_history: Vec<String>,
    closed: bool,
}

/// Mock driver for unit testing.
///
/// Selectors are matched by exact text against what was inserted. Clones
/// share the same document, so a test can mutate the page while a wait runs
/// on another thread.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    dom: Arc<Mutex<MockDom>>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the matches of `selector` with plain elements showing `texts`.
    /// Returns handles to the new elements.
    pub fn set_elements(&self, selector: &str, texts: &[&str]) -> Vec<MockElement> {
        let elements: Vec<MockElement> = texts.iter().map(|text| MockElement::new(*text)).collect();
        self.insert(selector, elements.clone());
        elements
    }

    /// Replace the matches of `selector`
    pub fn insert(&self, selector: &str, elements: Vec<MockElement>) {
        lock(&self.dom).elements.insert(selector.to_string(), elements);
    }

    /// Remove every match of `selector`
    pub fn remove(&self, selector: &str) {
        lock(&self.dom).elements.remove(selector);
    }

    /// Fail the next lookup of `selector` with `error`
    pub fn fail_next(&self, selector: &str, error: DriverError) {
        lock(&self.dom)
            .failures
            .entry(selector.to_string())
            .or_default()
            .push_back(error);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.dom).call_history.clone()
    }

    /// Check if a call was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        lock(&self.dom)
            .call_history
            .iter()
            .any(|call| call.starts_with(prefix))
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        lock(&self.dom).closed
    }
}

impl Driver for MockDriver {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        let mut dom = lock(&self.dom);
        if dom.closed {
            return Err(DriverError::session("session closed"));
        }
        dom.call_history.push(format!("navigate:{url}"));
        dom.url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(lock(&self.dom).url.clone())
    }

    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let mut dom = lock(&self.dom);
        if dom.closed {
            return Err(DriverError::session("session closed"));
        }
        dom.call_history.push(format!("find:{}", locator.selector()));
        if let Some(error) = dom
            .failures
            .get_mut(locator.selector())
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(dom
            .elements
            .get(locator.selector())
            .map(|elements| {
                elements
                    .iter()
                    .map(|element| Box::new(element.clone()) as ElementRef)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn close(&mut self) -> DriverResult<()> {
        let mut dom = lock(&self.dom);
        dom.call_history.push("close".to_string());
        dom.closed = true;
        Ok(())
    }
}
