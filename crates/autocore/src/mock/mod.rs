//! In-memory browser fakes
//!
//! [`FakeApplication`] owns a [`FakeDriver`] whose "DOM" is a map from
//! locator to the elements it currently matches. Elements can be hidden,
//! disabled, detached (stale) or told to fail their next few interactions,
//! which is enough to drive every wait and retry path without a browser.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::driver::{Application, ElementHandle, WebDriver, WebElement};
use crate::locator::Locator;
use crate::result::{CoreError, CoreResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// =============================================================================
// FAKE ELEMENT
// =============================================================================

/// A scripted DOM node
#[derive(Debug)]
pub struct FakeElement {
    id: String,
    displayed: AtomicBool,
    enabled: AtomicBool,
    stale: AtomicBool,
    flaky_interactions: AtomicUsize,
    attributes: Mutex<HashMap<String, String>>,
    text: Mutex<String>,
    typed: Mutex<Vec<String>>,
    clicks: AtomicUsize,
}

impl Default for FakeElement {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            displayed: AtomicBool::new(true),
            enabled: AtomicBool::new(true),
            stale: AtomicBool::new(false),
            flaky_interactions: AtomicUsize::new(0),
            attributes: Mutex::new(HashMap::new()),
            text: Mutex::new(String::new()),
            typed: Mutex::new(Vec::new()),
            clicks: AtomicUsize::new(0),
        }
    }
}

impl FakeElement {
    /// Visible, enabled element
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible, enabled element behind an `Arc`
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Start hidden
    #[must_use]
    pub fn hidden(self) -> Self {
        self.displayed.store(false, Ordering::SeqCst);
        self
    }

    /// Start disabled
    #[must_use]
    pub fn disabled(self) -> Self {
        self.enabled.store(false, Ordering::SeqCst);
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        lock(&self.attributes).insert(name.to_string(), value.to_string());
        self
    }

    /// Set the visible text
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        *lock(&self.text) = text.to_string();
        self
    }

    /// Share the element
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Change visibility
    pub fn set_displayed(&self, displayed: bool) {
        self.displayed.store(displayed, Ordering::SeqCst);
    }

    /// Change enabled-ness
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Detach from the DOM: every call fails with `StaleElementReference`
    pub fn detach(&self) {
        self.stale.store(true, Ordering::SeqCst);
    }

    /// Fail the next `count` interactions (click, send keys, text,
    /// attribute reads) with `StaleElementReference`
    pub fn fail_next_interactions(&self, count: usize) {
        self.flaky_interactions.store(count, Ordering::SeqCst);
    }

    /// Number of successful clicks
    #[must_use]
    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    /// Text typed so far, one entry per `send_keys`
    #[must_use]
    pub fn typed(&self) -> Vec<String> {
        lock(&self.typed).clone()
    }

    fn check_attached(&self) -> CoreResult<()> {
        if self.stale.load(Ordering::SeqCst) {
            return Err(CoreError::stale(format!(
                "element {} is not attached to the page document",
                self.id
            )));
        }
        Ok(())
    }

    fn check_interaction(&self) -> CoreResult<()> {
        self.check_attached()?;
        let pending = self.flaky_interactions.load(Ordering::SeqCst);
        if pending > 0 {
            self.flaky_interactions.store(pending - 1, Ordering::SeqCst);
            return Err(CoreError::stale(format!("element {} was re-rendered", self.id)));
        }
        Ok(())
    }
}

impl WebElement for FakeElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_displayed(&self) -> CoreResult<bool> {
        self.check_attached()?;
        Ok(self.displayed.load(Ordering::SeqCst))
    }

    fn is_enabled(&self) -> CoreResult<bool> {
        self.check_attached()?;
        Ok(self.enabled.load(Ordering::SeqCst))
    }

    fn get_attribute(&self, name: &str) -> CoreResult<Option<String>> {
        self.check_interaction()?;
        Ok(lock(&self.attributes).get(name).cloned())
    }

    fn text(&self) -> CoreResult<String> {
        self.check_interaction()?;
        Ok(lock(&self.text).clone())
    }

    fn click(&self) -> CoreResult<()> {
        self.check_interaction()?;
        if !self.enabled.load(Ordering::SeqCst) {
            return Err(CoreError::invalid_state(format!("element {} is disabled", self.id)));
        }
        self.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn send_keys(&self, text: &str) -> CoreResult<()> {
        self.check_interaction()?;
        lock(&self.typed).push(text.to_string());
        Ok(())
    }
}

// =============================================================================
// FAKE DRIVER
// =============================================================================

/// Locator-keyed fake DOM
#[derive(Debug, Default)]
pub struct FakeDriver {
    dom: Mutex<HashMap<Locator, Vec<Arc<FakeElement>>>>,
    frames: Mutex<HashMap<Locator, VecDeque<Vec<Arc<FakeElement>>>>>,
    page_source: Mutex<Option<String>>,
    find_calls: AtomicUsize,
}

impl FakeDriver {
    /// Empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements `locator` matches from now on
    pub fn set_elements(&self, locator: Locator, elements: Vec<Arc<FakeElement>>) {
        lock(&self.dom).insert(locator, elements);
    }

    /// Remove every match of `locator`
    pub fn clear(&self, locator: &Locator) {
        lock(&self.dom).remove(locator);
        lock(&self.frames).remove(locator);
    }

    /// Successive answers for `locator`, one per lookup; once exhausted the
    /// last frame keeps being returned
    pub fn script(&self, locator: Locator, frames: Vec<Vec<Arc<FakeElement>>>) {
        lock(&self.frames).insert(locator, frames.into_iter().collect());
    }

    /// Page source returned by the driver; `None` makes reads fail
    pub fn set_page_source(&self, source: Option<&str>) {
        *lock(&self.page_source) = source.map(str::to_string);
    }

    /// Number of `find_elements` calls
    #[must_use]
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    fn current(&self, locator: &Locator) -> Vec<Arc<FakeElement>> {
        let mut frames = lock(&self.frames);
        if let Some(queue) = frames.get_mut(locator) {
            if queue.len() > 1 {
                if let Some(frame) = queue.pop_front() {
                    return frame;
                }
            }
            if let Some(last) = queue.front() {
                return last.clone();
            }
        }
        drop(frames);
        lock(&self.dom).get(locator).cloned().unwrap_or_default()
    }
}

impl WebDriver for FakeDriver {
    fn find_elements(&self, locator: &Locator) -> CoreResult<Vec<ElementHandle>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .current(locator)
            .into_iter()
            .map(|element| element as ElementHandle)
            .collect())
    }

    fn page_source(&self) -> CoreResult<String> {
        lock(&self.page_source)
            .clone()
            .ok_or_else(|| CoreError::driver("page source is unavailable"))
    }
}

// =============================================================================
// FAKE APPLICATION
// =============================================================================

/// Fake browser session recording implicit-wait changes
#[derive(Debug)]
pub struct FakeApplication {
    driver: FakeDriver,
    started: AtomicBool,
    implicit_waits: Mutex<Vec<Duration>>,
}

impl Default for FakeApplication {
    fn default() -> Self {
        Self {
            driver: FakeDriver::new(),
            started: AtomicBool::new(true),
            implicit_waits: Mutex::new(Vec::new()),
        }
    }
}

impl FakeApplication {
    /// Started session with an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Started session behind an `Arc`
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Concrete driver, for scripting the page
    #[must_use]
    pub const fn driver_fake(&self) -> &FakeDriver {
        &self.driver
    }

    /// Mark the session started or stopped
    pub fn set_started(&self, started: bool) {
        self.started.store(started, Ordering::SeqCst);
    }

    /// Every implicit wait set so far, oldest first
    #[must_use]
    pub fn implicit_wait_history(&self) -> Vec<Duration> {
        lock(&self.implicit_waits).clone()
    }
}

impl Application for FakeApplication {
    fn driver(&self) -> &dyn WebDriver {
        &self.driver
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn set_implicit_wait_timeout(&self, timeout: Duration) -> CoreResult<()> {
        lock(&self.implicit_waits).push(timeout);
        Ok(())
    }
}
