//! Conditional waits
//!
//! Every higher-level wait in the crate bottoms out in one of two polling
//! loops:
//!
//! - [`ConditionalWait::wait_for_driver`] hands the browser driver to the
//!   predicate and suspends the implicit wait while polling, so element
//!   lookups inside the predicate return immediately.
//! - [`ConditionalWait::wait_for_true`] polls an arbitrary predicate against
//!   the wall clock.
//!
//! [`ConditionalWait::wait_for_condition`] is the non-raising form of
//! `wait_for_true`: a timeout becomes `false`, every other error propagates.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::configuration::TimeoutConfiguration;
use crate::driver::{Application, WebDriver};
use crate::result::{CoreError, CoreResult, ErrorKind};

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Per-call overrides for a wait; unset values come from [`TimeoutConfiguration`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitOptions {
    timeout: Option<Duration>,
    polling_interval: Option<Duration>,
    message: Option<String>,
    ignored: Option<Vec<ErrorKind>>,
}

impl WaitOptions {
    /// Options that defer everything to the configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with only a timeout override
    #[must_use]
    pub fn timeout(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = Some(interval);
        self
    }

    /// Set the text appended to the timeout message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the error kinds swallowed while polling
    ///
    /// An empty list keeps the default of the wait it is passed to.
    #[must_use]
    pub fn with_ignored(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.ignored = Some(kinds.into_iter().collect());
        self
    }

    /// Timeout override
    #[must_use]
    pub const fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Polling interval override
    #[must_use]
    pub const fn polling_interval_override(&self) -> Option<Duration> {
        self.polling_interval
    }

    /// Timeout message suffix
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Ignored kinds override
    #[must_use]
    pub fn ignored(&self) -> Option<&[ErrorKind]> {
        self.ignored.as_deref()
    }
}

/// `Timed out after {seconds} seconds[: {message}]`
#[must_use]
pub fn timeout_message(timeout: Duration, message: Option<&str>) -> String {
    let base = format!("Timed out after {} seconds", timeout.as_secs_f64());
    match message {
        Some(message) => format!("{base}: {message}"),
        None => base,
    }
}

// =============================================================================
// IMPLICIT WAIT GUARD
// =============================================================================

/// Zeroes the implicit wait and restores the configured value on drop
struct ImplicitWaitGuard<'a> {
    application: &'a dyn Application,
    restore: Duration,
}

impl<'a> ImplicitWaitGuard<'a> {
    fn suspend(application: &'a dyn Application, restore: Duration) -> CoreResult<Self> {
        application.set_implicit_wait_timeout(Duration::ZERO)?;
        Ok(Self {
            application,
            restore,
        })
    }
}

impl Drop for ImplicitWaitGuard<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.application.set_implicit_wait_timeout(self.restore) {
            tracing::warn!(%error, "Failed to restore implicit wait");
        }
    }
}

// =============================================================================
// CONDITIONAL WAIT
// =============================================================================

/// Polling engine shared by the finder, state provider and factory
#[derive(Clone)]
pub struct ConditionalWait {
    timeouts: TimeoutConfiguration,
    application: Arc<dyn Application>,
}

impl std::fmt::Debug for ConditionalWait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionalWait")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl ConditionalWait {
    /// Default kinds ignored by [`Self::wait_for_driver`]
    pub const DRIVER_IGNORED: [ErrorKind; 1] = [ErrorKind::StaleElementReference];

    /// Create a waiter bound to one application
    #[must_use]
    pub fn new(timeouts: TimeoutConfiguration, application: Arc<dyn Application>) -> Self {
        Self {
            timeouts,
            application,
        }
    }

    /// Timeout configuration
    #[must_use]
    pub const fn timeouts(&self) -> &TimeoutConfiguration {
        &self.timeouts
    }

    /// Application this waiter polls
    #[must_use]
    pub fn application(&self) -> &dyn Application {
        self.application.as_ref()
    }

    fn resolve_timeout(&self, options: &WaitOptions) -> Duration {
        options.timeout.unwrap_or(self.timeouts.condition)
    }

    fn resolve_interval(&self, options: &WaitOptions) -> Duration {
        options
            .polling_interval
            .unwrap_or(self.timeouts.polling_interval)
    }

    /// Poll `predicate` with the driver until it yields `Some`
    ///
    /// The predicate runs at least once. Errors of an ignored kind
    /// (`StaleElementReference` unless overridden with a non-empty list)
    /// count as an unsatisfied attempt; any other error aborts the wait.
    ///
    /// # Errors
    ///
    /// `Timeout` when the deadline passes, or the first non-ignored error.
    pub fn wait_for_driver<T, F>(&self, mut predicate: F, options: &WaitOptions) -> CoreResult<T>
    where
        F: FnMut(&dyn WebDriver) -> CoreResult<Option<T>>,
    {
        let timeout = self.resolve_timeout(options);
        let interval = self.resolve_interval(options);
        let ignored = options
            .ignored()
            .filter(|kinds| !kinds.is_empty())
            .unwrap_or(&Self::DRIVER_IGNORED);

        let application = self.application.as_ref();
        let _guard = ImplicitWaitGuard::suspend(application, self.timeouts.implicit)?;
        let start = Instant::now();
        loop {
            match predicate(application.driver()) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(error) if ignored.contains(&error.kind()) => {
                    tracing::trace!(%error, "Ignored error while waiting");
                }
                Err(error) => return Err(error),
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(CoreError::timeout(timeout_message(timeout, options.message())));
            }
            std::thread::sleep(interval.min(timeout - elapsed));
        }
    }

    /// Poll `predicate` until it returns `true`
    ///
    /// No error kinds are ignored unless the options say so.
    ///
    /// # Errors
    ///
    /// `Timeout` once more than the timeout has elapsed, or the first
    /// non-ignored error from the predicate.
    pub fn wait_for_true<F>(&self, mut predicate: F, options: &WaitOptions) -> CoreResult<()>
    where
        F: FnMut() -> CoreResult<bool>,
    {
        let timeout = self.resolve_timeout(options);
        let interval = self.resolve_interval(options);
        let ignored = options.ignored().unwrap_or_default();

        let start = Instant::now();
        loop {
            match predicate() {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(error) if ignored.contains(&error.kind()) => {
                    tracing::trace!(%error, "Ignored error while waiting");
                }
                Err(error) => return Err(error),
            }
            if start.elapsed() > timeout {
                return Err(CoreError::timeout(timeout_message(timeout, options.message())));
            }
            std::thread::sleep(interval);
        }
    }

    /// Poll `predicate` until it returns `true`; `false` on timeout
    ///
    /// # Errors
    ///
    /// Any non-timeout error from the predicate.
    pub fn wait_for_condition<F>(&self, predicate: F, options: &WaitOptions) -> CoreResult<bool>
    where
        F: FnMut() -> CoreResult<bool>,
    {
        match self.wait_for_true(predicate, options) {
            Ok(()) => Ok(true),
            Err(error) if error.is(ErrorKind::Timeout) => Ok(false),
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::locator::Locator;
    use crate::mock::{FakeApplication, FakeElement};

    fn fast_timeouts() -> TimeoutConfiguration {
        TimeoutConfiguration::default()
            .with_condition(Duration::from_millis(200))
            .with_polling_interval(Duration::from_millis(10))
            .with_implicit(Duration::from_secs(3))
    }

    fn waiter() -> (Arc<FakeApplication>, ConditionalWait) {
        let app = FakeApplication::shared();
        let wait = ConditionalWait::new(fast_timeouts(), app.clone());
        (app, wait)
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_default_defers_to_configuration() {
            let options = WaitOptions::new();
            assert_eq!(options.timeout_override(), None);
            assert_eq!(options.polling_interval_override(), None);
            assert_eq!(options.message(), None);
            assert_eq!(options.ignored(), None);
        }

        #[test]
        fn test_builder_chain() {
            let options = WaitOptions::new()
                .with_timeout(Duration::from_secs(1))
                .with_polling_interval(Duration::from_millis(5))
                .with_message("button")
                .with_ignored([ErrorKind::Driver]);
            assert_eq!(options.timeout_override(), Some(Duration::from_secs(1)));
            assert_eq!(options.polling_interval_override(), Some(Duration::from_millis(5)));
            assert_eq!(options.message(), Some("button"));
            assert_eq!(options.ignored(), Some(&[ErrorKind::Driver][..]));
        }

        #[test]
        fn test_timeout_message_format() {
            assert_eq!(
                timeout_message(Duration::from_secs(1), None),
                "Timed out after 1 seconds"
            );
            assert_eq!(
                timeout_message(Duration::from_millis(500), Some("login")),
                "Timed out after 0.5 seconds: login"
            );
        }
    }

    mod wait_for_driver_tests {
        use super::*;

        #[test]
        fn test_returns_first_some() {
            let (app, wait) = waiter();
            app.driver_fake().set_elements(Locator::id("a"), vec![FakeElement::shared()]);
            let found = wait
                .wait_for_driver(
                    |driver| {
                        let elements = driver.find_elements(&Locator::id("a"))?;
                        Ok((!elements.is_empty()).then_some(elements.len()))
                    },
                    &WaitOptions::new(),
                )
                .unwrap();
            assert_eq!(found, 1);
        }

        #[test]
        fn test_timeout_error_and_single_call_with_zero_timeout() {
            let (_app, wait) = waiter();
            let mut calls = 0;
            let err = wait
                .wait_for_driver(
                    |_| {
                        calls += 1;
                        Ok(None::<()>)
                    },
                    &WaitOptions::timeout(Some(Duration::ZERO)).with_message("nothing"),
                )
                .unwrap_err();
            assert_eq!(calls, 1);
            assert!(err.is(ErrorKind::Timeout));
            assert_eq!(err.to_string(), "Timed out after 0 seconds: nothing");
        }

        #[test]
        fn test_stale_ignored_by_default() {
            let (_app, wait) = waiter();
            let mut calls = 0;
            let value = wait
                .wait_for_driver(
                    |_| {
                        calls += 1;
                        if calls < 3 {
                            Err(CoreError::stale("detached"))
                        } else {
                            Ok(Some("ok"))
                        }
                    },
                    &WaitOptions::new(),
                )
                .unwrap();
            assert_eq!(value, "ok");
            assert_eq!(calls, 3);
        }

        #[test]
        fn test_empty_ignored_list_keeps_stale_default() {
            let (_app, wait) = waiter();
            let mut calls = 0;
            let value = wait
                .wait_for_driver(
                    |_| {
                        calls += 1;
                        if calls < 2 {
                            Err(CoreError::stale("detached"))
                        } else {
                            Ok(Some(calls))
                        }
                    },
                    &WaitOptions::new().with_ignored(Vec::<ErrorKind>::new()),
                )
                .unwrap();
            assert_eq!(value, 2);
        }

        #[test]
        fn test_other_errors_propagate() {
            let (_app, wait) = waiter();
            let err = wait
                .wait_for_driver(
                    |_| Err::<Option<()>, _>(CoreError::driver("session lost")),
                    &WaitOptions::new(),
                )
                .unwrap_err();
            assert!(err.is(ErrorKind::Driver));
        }

        #[test]
        fn test_implicit_wait_restored_on_success_and_failure() {
            let (app, wait) = waiter();
            wait.wait_for_driver(|_| Ok(Some(())), &WaitOptions::new()).unwrap();
            assert_eq!(
                app.implicit_wait_history(),
                vec![Duration::ZERO, Duration::from_secs(3)]
            );

            let _ = wait.wait_for_driver(
                |_| Err::<Option<()>, _>(CoreError::driver("boom")),
                &WaitOptions::new(),
            );
            assert_eq!(app.implicit_wait_history().len(), 4);
            assert_eq!(app.implicit_wait_history()[3], Duration::from_secs(3));
        }
    }

    mod wait_for_true_tests {
        use super::*;

        #[test]
        fn test_becomes_true() {
            let (_app, wait) = waiter();
            let mut calls = 0;
            wait.wait_for_true(
                || {
                    calls += 1;
                    Ok(calls == 3)
                },
                &WaitOptions::new(),
            )
            .unwrap();
            assert_eq!(calls, 3);
        }

        #[test]
        fn test_times_out() {
            let (_app, wait) = waiter();
            let start = Instant::now();
            let err = wait
                .wait_for_true(|| Ok(false), &WaitOptions::new().with_message("never"))
                .unwrap_err();
            assert!(start.elapsed() >= Duration::from_millis(200));
            assert!(err.is(ErrorKind::Timeout));
            assert!(err.to_string().ends_with(": never"));
        }

        #[test]
        fn test_nothing_ignored_by_default() {
            let (_app, wait) = waiter();
            let err = wait
                .wait_for_true(|| Err(CoreError::stale("x")), &WaitOptions::new())
                .unwrap_err();
            assert!(err.is(ErrorKind::StaleElementReference));
        }

        #[test]
        fn test_ignored_kinds_override() {
            let (_app, wait) = waiter();
            let mut calls = 0;
            wait.wait_for_true(
                || {
                    calls += 1;
                    if calls == 1 {
                        Err(CoreError::invalid_state("busy"))
                    } else {
                        Ok(true)
                    }
                },
                &WaitOptions::new().with_ignored([ErrorKind::InvalidElementState]),
            )
            .unwrap();
            assert_eq!(calls, 2);
        }

        #[test]
        fn test_does_not_touch_implicit_wait() {
            let (app, wait) = waiter();
            wait.wait_for_true(|| Ok(true), &WaitOptions::new()).unwrap();
            assert!(app.implicit_wait_history().is_empty());
        }
    }

    mod wait_for_condition_tests {
        use super::*;

        #[test]
        fn test_true_when_satisfied() {
            let (_app, wait) = waiter();
            assert!(wait.wait_for_condition(|| Ok(true), &WaitOptions::new()).unwrap());
        }

        #[test]
        fn test_false_on_timeout() {
            let (_app, wait) = waiter();
            let options = WaitOptions::timeout(Some(Duration::from_millis(30)));
            assert!(!wait.wait_for_condition(|| Ok(false), &options).unwrap());
        }

        #[test]
        fn test_other_errors_propagate() {
            let (_app, wait) = waiter();
            let err = wait
                .wait_for_condition(|| Err(CoreError::no_such_element("gone")), &WaitOptions::new())
                .unwrap_err();
            assert!(err.is(ErrorKind::NoSuchElement));
        }
    }
}
