//! Boolean and blocking state queries for one locator.

use std::sync::Arc;
use std::time::Duration;

use super::desired_state::{DesiredState, ElementState};
use super::finder::ElementFinder;
use crate::driver::WebElement;
use crate::locator::Locator;
use crate::result::{CoreResult, ErrorKind};
use crate::wait::{ConditionalWait, WaitOptions};

/// Callback receiving `(message_key, state_key)` for state-wait logging
pub type StateLogger = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Answers "is the element displayed / present / enabled / clickable" and
/// waits for those states
///
/// The `is_*` queries are single, non-polling checks. A `wait_for_*` call
/// with no timeout or a zero timeout does not log; a positive timeout logs
/// the wait and, when it ends unsatisfied, its failure.
#[derive(Clone)]
pub struct ElementStateProvider {
    locator: Locator,
    wait: Arc<ConditionalWait>,
    finder: Arc<ElementFinder>,
    log_state: StateLogger,
}

impl std::fmt::Debug for ElementStateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementStateProvider")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

fn is_element_enabled(element: &dyn WebElement) -> CoreResult<bool> {
    Ok(element.is_enabled()?
        && !element
            .get_attribute("class")?
            .is_some_and(|class| class.contains("disabled")))
}

impl ElementStateProvider {
    /// Create a provider
    #[must_use]
    pub fn new(
        locator: Locator,
        wait: Arc<ConditionalWait>,
        finder: Arc<ElementFinder>,
        log_state: StateLogger,
    ) -> Self {
        Self {
            locator,
            wait,
            finder,
            log_state,
        }
    }

    /// Locator the provider queries
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Any match is visible right now
    pub fn is_displayed(&self) -> CoreResult<bool> {
        self.wait_for_displayed(Some(Duration::ZERO))
    }

    /// Any match exists right now
    pub fn is_exist(&self) -> CoreResult<bool> {
        self.wait_for_exist(Some(Duration::ZERO))
    }

    /// Any match is enabled and lacks a `disabled` class right now
    pub fn is_enabled(&self) -> CoreResult<bool> {
        self.wait_for_enabled(Some(Duration::ZERO))
    }

    /// Any match is visible and enabled right now
    pub fn is_clickable(&self) -> CoreResult<bool> {
        self.is_element_clickable(Some(Duration::ZERO), true)
    }

    /// Wait until a match is visible
    pub fn wait_for_displayed(&self, timeout: Option<Duration>) -> CoreResult<bool> {
        self.do_and_log_wait_for_state(
            || self.is_any_element_found(timeout, ElementState::Displayed),
            "displayed",
            timeout,
        )
    }

    /// Wait until no match is visible
    pub fn wait_for_not_displayed(&self, timeout: Option<Duration>) -> CoreResult<bool> {
        self.do_and_log_wait_for_state(
            || {
                self.wait.wait_for_condition(
                    || Ok(!self.is_displayed()?),
                    &WaitOptions::timeout(timeout),
                )
            },
            "not.displayed",
            timeout,
        )
    }

    /// Wait until a match exists, visible or not
    pub fn wait_for_exist(&self, timeout: Option<Duration>) -> CoreResult<bool> {
        self.do_and_log_wait_for_state(
            || self.is_any_element_found(timeout, ElementState::ExistsInAnyState),
            "exist",
            timeout,
        )
    }

    /// Wait until nothing matches
    pub fn wait_for_not_exist(&self, timeout: Option<Duration>) -> CoreResult<bool> {
        self.do_and_log_wait_for_state(
            || {
                self.wait
                    .wait_for_condition(|| Ok(!self.is_exist()?), &WaitOptions::timeout(timeout))
            },
            "not.exist",
            timeout,
        )
    }

    /// Wait until a match is enabled
    pub fn wait_for_enabled(&self, timeout: Option<Duration>) -> CoreResult<bool> {
        self.do_and_log_wait_for_state(
            || self.is_element_in_desired_state(is_element_enabled, "ENABLED", timeout),
            "enabled",
            timeout,
        )
    }

    /// Wait until a match is disabled
    pub fn wait_for_not_enabled(&self, timeout: Option<Duration>) -> CoreResult<bool> {
        self.do_and_log_wait_for_state(
            || {
                self.is_element_in_desired_state(
                    |element| Ok(!is_element_enabled(element)?),
                    "NOT ENABLED",
                    timeout,
                )
            },
            "not.enabled",
            timeout,
        )
    }

    /// Wait until a match is visible and enabled
    ///
    /// # Errors
    ///
    /// `Timeout` (or `NoSuchElement`) when the element does not become
    /// clickable in time.
    pub fn wait_for_clickable(&self, timeout: Option<Duration>) -> CoreResult<()> {
        const STATE_KEY: &str = "loc.el.state.clickable";
        (self.log_state)("loc.wait.for.state", STATE_KEY);
        self.is_element_clickable(timeout, false)
            .map(|_| ())
            .map_err(|error| {
                (self.log_state)("loc.wait.for.state.failed", STATE_KEY);
                error
            })
    }

    fn is_element_clickable(
        &self,
        timeout: Option<Duration>,
        catch_timeout: bool,
    ) -> CoreResult<bool> {
        let desired = DesiredState::new(
            |element| Ok(element.is_displayed()? && element.is_enabled()?),
            "CLICKABLE",
        )
        .with_catch_timeout(catch_timeout);
        self.is_element_in_desired_condition(timeout, desired)
    }

    fn is_element_in_desired_condition(
        &self,
        timeout: Option<Duration>,
        desired: DesiredState,
    ) -> CoreResult<bool> {
        Ok(!self
            .finder
            .find_elements(&self.locator, desired, timeout, None)?
            .is_empty())
    }

    fn is_any_element_found(
        &self,
        timeout: Option<Duration>,
        state: ElementState,
    ) -> CoreResult<bool> {
        Ok(!self
            .finder
            .find_elements(&self.locator, state, timeout, None)?
            .is_empty())
    }

    fn is_element_in_desired_state<F>(
        &self,
        condition: F,
        state_name: &str,
        timeout: Option<Duration>,
    ) -> CoreResult<bool>
    where
        F: Fn(&dyn WebElement) -> CoreResult<bool> + Send + Sync + 'static,
    {
        let desired = DesiredState::new(condition, state_name)
            .with_catch_timeout(true)
            .with_throw_not_found(true);
        match self.is_element_in_desired_condition(timeout, desired) {
            Err(error) if error.is(ErrorKind::NoSuchElement) => {
                tracing::debug!(
                    %error,
                    locator = %self.locator,
                    "Element not found while checking state"
                );
                Ok(false)
            }
            other => other,
        }
    }

    fn do_and_log_wait_for_state<F>(
        &self,
        mut check: F,
        state_key: &str,
        timeout: Option<Duration>,
    ) -> CoreResult<bool>
    where
        F: FnMut() -> CoreResult<bool>,
    {
        let timeout = match timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => return check(),
        };
        let condition_key = format!("loc.el.state.{state_key}");
        (self.log_state)("loc.wait.for.state", &condition_key);
        let satisfied = self
            .wait
            .wait_for_condition(&mut check, &WaitOptions::timeout(Some(timeout)))?;
        if !satisfied {
            (self.log_state)("loc.wait.for.state.failed", &condition_key);
        }
        Ok(satisfied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::configuration::{LoggerConfiguration, TimeoutConfiguration};
    use crate::localization::{LocalizationManager, LocalizedLogger};
    use crate::mock::{FakeApplication, FakeElement};
    use std::sync::Mutex;
    use std::time::Instant;

    struct Fixture {
        app: Arc<FakeApplication>,
        provider: ElementStateProvider,
        logged: Arc<Mutex<Vec<(String, String)>>>,
    }

    fn fixture() -> Fixture {
        let app = FakeApplication::shared();
        let timeouts = TimeoutConfiguration::default()
            .with_condition(Duration::from_millis(150))
            .with_polling_interval(Duration::from_millis(10));
        let wait = Arc::new(ConditionalWait::new(timeouts, app.clone()));
        let logger = Arc::new(LocalizedLogger::new(
            Arc::new(LocalizationManager::new("en", None).unwrap()),
            LoggerConfiguration::default(),
        ));
        let finder = Arc::new(ElementFinder::new(logger, Arc::clone(&wait)));
        let logged = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&logged);
        let log_state: StateLogger = Arc::new(move |message: &str, state: &str| {
            sink.lock().unwrap().push((message.to_string(), state.to_string()));
        });
        let provider = ElementStateProvider::new(Locator::id("target"), wait, finder, log_state);
        Fixture { app, provider, logged }
    }

    fn place(fixture: &Fixture, element: Arc<FakeElement>) {
        fixture
            .app
            .driver_fake()
            .set_elements(Locator::id("target"), vec![element]);
    }

    mod immediate_tests {
        use super::*;

        #[test]
        fn test_missing_element_states() {
            let f = fixture();
            assert!(!f.provider.is_displayed().unwrap());
            assert!(!f.provider.is_exist().unwrap());
            assert!(!f.provider.is_enabled().unwrap());
            assert!(!f.provider.is_clickable().unwrap());
            assert!(f.logged.lock().unwrap().is_empty());
        }

        #[test]
        fn test_visible_enabled_element() {
            let f = fixture();
            place(&f, FakeElement::shared());
            assert!(f.provider.is_displayed().unwrap());
            assert!(f.provider.is_exist().unwrap());
            assert!(f.provider.is_enabled().unwrap());
            assert!(f.provider.is_clickable().unwrap());
        }

        #[test]
        fn test_hidden_element_exists_but_not_displayed() {
            let f = fixture();
            place(&f, FakeElement::new().hidden().into_shared());
            assert!(!f.provider.is_displayed().unwrap());
            assert!(f.provider.is_exist().unwrap());
            assert!(!f.provider.is_clickable().unwrap());
        }

        #[test]
        fn test_disabled_class_means_not_enabled() {
            let f = fixture();
            place(
                &f,
                FakeElement::new()
                    .with_attribute("class", "btn btn-disabled")
                    .into_shared(),
            );
            assert!(!f.provider.is_enabled().unwrap());
            assert!(f.provider.wait_for_not_enabled(Some(Duration::ZERO)).unwrap());
        }

        #[test]
        fn test_immediate_check_does_not_poll() {
            let f = fixture();
            f.provider.is_displayed().unwrap();
            assert_eq!(f.app.driver_fake().find_calls(), 1);
        }
    }

    mod wait_tests {
        use super::*;

        #[test]
        fn test_wait_for_displayed_after_delay() {
            let f = fixture();
            let element = FakeElement::new().hidden().into_shared();
            place(&f, element.clone());
            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(60));
                element.set_displayed(true);
            });
            let start = Instant::now();
            assert!(f.provider.wait_for_displayed(Some(Duration::from_secs(1))).unwrap());
            handle.join().unwrap();
            assert!(start.elapsed() < Duration::from_millis(500));
            assert_eq!(
                f.logged.lock().unwrap().as_slice(),
                &[("loc.wait.for.state".to_string(), "loc.el.state.displayed".to_string())]
            );
        }

        #[test]
        fn test_failed_wait_logs_failure() {
            let f = fixture();
            assert!(!f.provider.wait_for_exist(Some(Duration::from_millis(40))).unwrap());
            let logged = f.logged.lock().unwrap();
            assert_eq!(logged.len(), 2);
            assert_eq!(logged[1].0, "loc.wait.for.state.failed");
            assert_eq!(logged[1].1, "loc.el.state.exist");
        }

        #[test]
        fn test_wait_for_not_exist_after_removal() {
            let f = fixture();
            place(&f, FakeElement::shared());
            let app = Arc::clone(&f.app);
            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(40));
                app.driver_fake().clear(&Locator::id("target"));
            });
            assert!(f.provider.wait_for_not_exist(Some(Duration::from_secs(1))).unwrap());
            handle.join().unwrap();
        }

        #[test]
        fn test_wait_for_not_displayed_times_out_while_visible() {
            let f = fixture();
            place(&f, FakeElement::shared());
            assert!(!f
                .provider
                .wait_for_not_displayed(Some(Duration::from_millis(40)))
                .unwrap());
        }

        #[test]
        fn test_wait_for_enabled_missing_element_is_false() {
            let f = fixture();
            assert!(!f.provider.wait_for_enabled(Some(Duration::from_millis(40))).unwrap());
        }

        #[test]
        fn test_wait_for_clickable_success_and_failure() {
            let f = fixture();
            place(&f, FakeElement::shared());
            f.provider.wait_for_clickable(Some(Duration::from_millis(40))).unwrap();
            assert_eq!(f.logged.lock().unwrap().len(), 1);

            place(&f, FakeElement::new().disabled().into_shared());
            let err = f
                .provider
                .wait_for_clickable(Some(Duration::from_millis(40)))
                .unwrap_err();
            assert!(err.is(ErrorKind::Timeout));
            let logged = f.logged.lock().unwrap();
            assert_eq!(logged.last().unwrap().0, "loc.wait.for.state.failed");
            assert_eq!(logged.last().unwrap().1, "loc.el.state.clickable");
        }
    }
}
