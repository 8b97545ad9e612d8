//! Memoized element handle with a staleness check.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::desired_state::ElementState;
use super::finder::ElementFinder;
use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::result::CoreResult;

/// Caches the handle an element resolved to
///
/// The handle is replaced wholesale when it goes stale, never patched.
#[derive(Debug)]
pub struct ElementCacheHandler {
    locator: Locator,
    name: String,
    state: ElementState,
    finder: Arc<ElementFinder>,
    element: Mutex<Option<ElementHandle>>,
}

impl ElementCacheHandler {
    /// Create an empty cache for one logical element
    #[must_use]
    pub fn new(
        locator: Locator,
        name: impl Into<String>,
        state: ElementState,
        finder: Arc<ElementFinder>,
    ) -> Self {
        Self {
            locator,
            name: name.into(),
            state,
            finder,
            element: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ElementHandle>> {
        self.element.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Currently cached handle, if any
    #[must_use]
    pub fn cached(&self) -> Option<ElementHandle> {
        self.slot().clone()
    }

    /// A handle is cached and needs a refresh
    #[must_use]
    pub fn is_stale(&self) -> bool {
        let slot = self.slot();
        slot.is_some() && refresh_needed(slot.as_ref(), self.effective(None))
    }

    /// Whether the next [`Self::get_element`] will search again
    ///
    /// True with nothing cached, when the cached handle cannot report its
    /// visibility, or when the effective state is `Displayed` and the handle
    /// is hidden. Presence-only states never refresh on visibility.
    #[must_use]
    pub fn is_refresh_needed(&self, override_state: Option<ElementState>) -> bool {
        refresh_needed(self.slot().as_ref(), self.effective(override_state))
    }

    /// Cached handle, searching again when a refresh is needed
    ///
    /// # Errors
    ///
    /// Errors of [`ElementFinder::find_element`].
    pub fn get_element(
        &self,
        timeout: Option<Duration>,
        override_state: Option<ElementState>,
    ) -> CoreResult<ElementHandle> {
        let state = self.effective(override_state);
        let mut slot = self.slot();
        if let Some(element) = slot.clone() {
            if !refresh_needed(Some(&element), state) {
                return Ok(element);
            }
        }
        tracing::debug!(locator = %self.locator, name = %self.name, "Refreshing cached element");
        let element = self
            .finder
            .find_element(&self.locator, state, timeout, Some(&self.name))?;
        *slot = Some(Arc::clone(&element));
        Ok(element)
    }

    fn effective(&self, override_state: Option<ElementState>) -> ElementState {
        override_state.unwrap_or(self.state)
    }
}

fn refresh_needed(element: Option<&ElementHandle>, state: ElementState) -> bool {
    let Some(element) = element else {
        return true;
    };
    match element.is_displayed() {
        Ok(displayed) => state == ElementState::Displayed && !displayed,
        Err(_) => true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::configuration::{LoggerConfiguration, TimeoutConfiguration};
    use crate::driver::WebElement;
    use crate::localization::{LocalizationManager, LocalizedLogger};
    use crate::mock::{FakeApplication, FakeElement};
    use crate::wait::ConditionalWait;

    const SHORT: Option<Duration> = Some(Duration::from_millis(50));

    fn handler(state: ElementState) -> (Arc<FakeApplication>, ElementCacheHandler) {
        let app = FakeApplication::shared();
        let timeouts = TimeoutConfiguration::default()
            .with_condition(Duration::from_millis(100))
            .with_polling_interval(Duration::from_millis(10));
        let wait = Arc::new(ConditionalWait::new(timeouts, app.clone()));
        let logger = Arc::new(LocalizedLogger::new(
            Arc::new(LocalizationManager::new("en", None).unwrap()),
            LoggerConfiguration::default(),
        ));
        let finder = Arc::new(ElementFinder::new(logger, wait));
        (app, ElementCacheHandler::new(Locator::id("cached"), "Cached", state, finder))
    }

    #[test]
    fn test_refresh_needed_before_first_fetch() {
        let (_app, handler) = handler(ElementState::Displayed);
        assert!(handler.is_refresh_needed(None));
        assert!(handler.is_refresh_needed(Some(ElementState::ExistsInAnyState)));
        assert!(!handler.is_stale());
    }

    #[test]
    fn test_get_element_memoizes() {
        let (app, handler) = handler(ElementState::Displayed);
        let element = FakeElement::shared();
        app.driver_fake().set_elements(Locator::id("cached"), vec![element.clone()]);

        let first = handler.get_element(SHORT, None).unwrap();
        let calls = app.driver_fake().find_calls();
        let second = handler.get_element(SHORT, None).unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(app.driver_fake().find_calls(), calls);
        assert!(!handler.is_refresh_needed(None));
    }

    #[test]
    fn test_detached_handle_is_refreshed() {
        let (app, handler) = handler(ElementState::Displayed);
        let old = FakeElement::shared();
        app.driver_fake().set_elements(Locator::id("cached"), vec![old.clone()]);
        handler.get_element(SHORT, None).unwrap();

        old.detach();
        assert!(handler.is_stale());
        let fresh = FakeElement::shared();
        app.driver_fake().set_elements(Locator::id("cached"), vec![fresh.clone()]);
        let element = handler.get_element(SHORT, None).unwrap();
        assert_eq!(element.id(), fresh.id());
        assert_eq!(handler.cached().unwrap().id(), fresh.id());
    }

    #[test]
    fn test_hidden_handle_refresh_depends_on_state() {
        let (app, handler) = handler(ElementState::Displayed);
        let element = FakeElement::shared();
        app.driver_fake().set_elements(Locator::id("cached"), vec![element.clone()]);
        handler.get_element(SHORT, None).unwrap();

        element.set_displayed(false);
        assert!(handler.is_refresh_needed(None));
        assert!(handler.is_refresh_needed(Some(ElementState::Displayed)));
        assert!(!handler.is_refresh_needed(Some(ElementState::ExistsInAnyState)));
    }

    #[test]
    fn test_exists_state_ignores_visibility() {
        let (app, handler) = handler(ElementState::ExistsInAnyState);
        let element = FakeElement::new().hidden().into_shared();
        app.driver_fake().set_elements(Locator::id("cached"), vec![element.clone()]);
        handler.get_element(SHORT, None).unwrap();
        assert!(!handler.is_refresh_needed(None));
        assert!(!handler.is_stale());
        assert!(element.is_displayed().is_ok());
    }

    #[test]
    fn test_failed_refresh_keeps_error() {
        let (_app, handler) = handler(ElementState::Displayed);
        let err = handler.get_element(SHORT, None).unwrap_err();
        assert!(err.is(crate::result::ErrorKind::NoSuchElement));
        assert!(handler.cached().is_none());
    }
}
