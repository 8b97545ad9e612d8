//! Retry-on-error wrappers for browser actions.
//!
//! An action is invoked up to `number + 1` times. A failure is retried only
//! while attempts remain and its [`ErrorKind`] is handled; every other failure
//! propagates unchanged on the spot.

use crate::configuration::RetryConfiguration;
use crate::result::{CoreResult, ErrorKind};

/// Generic retrier over a closed set of error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRetrier {
    configuration: RetryConfiguration,
}

impl ActionRetrier {
    /// Create a retrier
    #[must_use]
    pub const fn new(configuration: RetryConfiguration) -> Self {
        Self { configuration }
    }

    /// Retry configuration
    #[must_use]
    pub const fn configuration(&self) -> &RetryConfiguration {
        &self.configuration
    }

    /// Run `action`, retrying failures whose kind is in `handled`
    ///
    /// An empty `handled` list retries nothing.
    ///
    /// # Errors
    ///
    /// The last failure once attempts are exhausted, or the first unhandled one.
    pub fn do_with_retry<T, F>(&self, action: F, handled: &[ErrorKind]) -> CoreResult<T>
    where
        F: FnMut() -> CoreResult<T>,
    {
        self.do_with_retry_if(action, |kind| handled.contains(&kind))
    }

    /// Run `action`, retrying failures for which `is_retryable` holds
    ///
    /// # Errors
    ///
    /// The last failure once attempts are exhausted, or the first failure
    /// `is_retryable` rejects.
    pub fn do_with_retry_if<T, F, P>(&self, mut action: F, is_retryable: P) -> CoreResult<T>
    where
        F: FnMut() -> CoreResult<T>,
        P: Fn(ErrorKind) -> bool,
    {
        let attempts = self.configuration.attempts();
        let mut attempt = 1;
        loop {
            match action() {
                Ok(value) => return Ok(value),
                Err(error) if attempt < attempts && is_retryable(error.kind()) => {
                    tracing::debug!(
                        attempt,
                        attempts,
                        kind = %error.kind(),
                        "Retrying action after handled error"
                    );
                    attempt += 1;
                    std::thread::sleep(self.configuration.polling_interval);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Retrier for element interactions
///
/// Handles the transient DOM errors (`StaleElementReference`,
/// `InvalidElementState`) unless the caller supplies a non-empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementActionRetrier {
    inner: ActionRetrier,
}

impl ElementActionRetrier {
    /// Kinds handled when no override is given
    pub const HANDLED: [ErrorKind; 2] = ErrorKind::TRANSIENT;

    /// Create an element retrier
    #[must_use]
    pub const fn new(configuration: RetryConfiguration) -> Self {
        Self {
            inner: ActionRetrier::new(configuration),
        }
    }

    /// Retry configuration
    #[must_use]
    pub const fn configuration(&self) -> &RetryConfiguration {
        self.inner.configuration()
    }

    /// Run `action`, retrying transient DOM errors
    ///
    /// # Errors
    ///
    /// See [`ActionRetrier::do_with_retry`].
    pub fn do_with_retry<T, F>(&self, action: F) -> CoreResult<T>
    where
        F: FnMut() -> CoreResult<T>,
    {
        self.inner.do_with_retry(action, &Self::HANDLED)
    }

    /// Run `action` with an explicit handled list; `None` or an empty list
    /// falls back to the transient DOM errors
    ///
    /// # Errors
    ///
    /// See [`ActionRetrier::do_with_retry`].
    pub fn do_with_retry_handling<T, F>(
        &self,
        action: F,
        handled: Option<&[ErrorKind]>,
    ) -> CoreResult<T>
    where
        F: FnMut() -> CoreResult<T>,
    {
        let handled: &[ErrorKind] = match handled {
            Some(kinds) if !kinds.is_empty() => kinds,
            _ => &Self::HANDLED,
        };
        self.inner.do_with_retry(action, handled)
    }
}
