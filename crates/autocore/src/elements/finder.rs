//! Element finder
//!
//! One search is one [`ConditionalWait::wait_for_driver`] call. Every tick
//! asks the driver for all raw matches of the locator and appends the new
//! ones to a running `found` set (matches are never dropped across ticks).
//! The `found` set filtered by the desired-state predicate is the result;
//! the wait succeeds as soon as the result is non-empty. A match that has
//! gone stale since it was seen is filtered out, not reported.
//!
//! When the wait times out the outcome depends on the search flags and on
//! whether anything was found at all:
//!
//! | catch_timeout | found | outcome |
//! |---|---|---|
//! | yes | some | debug log, empty result |
//! | yes | none | `NoSuchElement` if `throw_not_found`, else debug log and empty result |
//! | no | none, `throw_not_found` | `NoSuchElement`, timeout text appended |
//! | no | otherwise | `Timeout`, search message appended |

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::desired_state::{DesiredState, StateSpec};
use crate::driver::ElementHandle;
use crate::localization::LocalizedLogger;
use crate::locator::Locator;
use crate::result::{CoreError, CoreResult, ErrorKind};
use crate::wait::{ConditionalWait, WaitOptions};

/// Locates elements in a desired state
#[derive(Debug, Clone)]
pub struct ElementFinder {
    logger: Arc<LocalizedLogger>,
    wait: Arc<ConditionalWait>,
}

impl ElementFinder {
    /// Create a finder
    #[must_use]
    pub const fn new(logger: Arc<LocalizedLogger>, wait: Arc<ConditionalWait>) -> Self {
        Self { logger, wait }
    }

    /// Find the first element in `state`
    ///
    /// `timeout` defaults to the configured condition timeout; `name` only
    /// affects messages.
    ///
    /// # Errors
    ///
    /// `NoSuchElement` when nothing matched the locator, `Timeout` when
    /// matches existed but none reached the state.
    pub fn find_element(
        &self,
        locator: &Locator,
        state: impl Into<StateSpec>,
        timeout: Option<Duration>,
        name: Option<&str>,
    ) -> CoreResult<ElementHandle> {
        let desired = state.into().for_element();
        self.search(locator, &desired, timeout, name)?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::no_such_element(not_found_message(locator, &desired, name)))
    }

    /// Find every element in `state`
    ///
    /// Named states and predicates return an empty list on timeout; an
    /// explicit [`DesiredState`] follows its own flags.
    ///
    /// # Errors
    ///
    /// See the module table.
    pub fn find_elements(
        &self,
        locator: &Locator,
        state: impl Into<StateSpec>,
        timeout: Option<Duration>,
        name: Option<&str>,
    ) -> CoreResult<Vec<ElementHandle>> {
        let desired = state.into().for_elements();
        self.search(locator, &desired, timeout, name)
    }

    fn search(
        &self,
        locator: &Locator,
        desired: &DesiredState,
        timeout: Option<Duration>,
        name: Option<&str>,
    ) -> CoreResult<Vec<ElementHandle>> {
        let mut found: Vec<ElementHandle> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut result: Vec<ElementHandle> = Vec::new();

        let outcome = self.wait.wait_for_driver(
            |driver| {
                for element in driver.find_elements(locator)? {
                    if seen.insert(element.id().to_string()) {
                        found.push(element);
                    }
                }
                let mut matched = Vec::new();
                for element in &found {
                    match desired.matches(element.as_ref()) {
                        Ok(true) => matched.push(Arc::clone(element)),
                        Ok(false) => {}
                        // A detached match stays in `found` but never matches.
                        Err(error) if error.is(ErrorKind::StaleElementReference) => {}
                        Err(error) => return Err(error),
                    }
                }
                result = matched;
                Ok((!result.is_empty()).then_some(()))
            },
            &WaitOptions::timeout(timeout),
        );

        match outcome {
            Ok(()) => Ok(result),
            Err(error) if error.is(ErrorKind::Timeout) => {
                self.classify_timeout(&error, locator, desired, found.is_empty(), name)?;
                Ok(Vec::new())
            }
            Err(error) => Err(error),
        }
    }

    fn classify_timeout(
        &self,
        error: &CoreError,
        locator: &Locator,
        desired: &DesiredState,
        nothing_found: bool,
        name: Option<&str>,
    ) -> CoreResult<()> {
        let message = not_found_message(locator, desired, name);
        let locator_text = locator.to_string();
        match (desired.catch_timeout, nothing_found) {
            (true, true) if desired.throw_not_found => Err(CoreError::no_such_element(message)),
            (true, true) => {
                self.logger.debug(
                    "loc.no.elements.found.in.state",
                    None,
                    &[locator_text.as_str(), desired.state_name()],
                );
                Ok(())
            }
            (true, false) => {
                self.logger.debug(
                    "loc.elements.were.found.but.not.in.state",
                    None,
                    &[locator_text.as_str(), desired.state_name()],
                );
                Ok(())
            }
            (false, true) if desired.throw_not_found => Err(CoreError::no_such_element(format!(
                "{message}: {}",
                error.message()
            ))),
            (false, _) => Err(CoreError::timeout(format!("{}: {message}", error.message()))),
        }
    }
}

fn not_found_message(locator: &Locator, desired: &DesiredState, name: Option<&str>) -> String {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => format!(
            "Element [{name}] was not found by locator '{locator}' in {} state",
            desired.state_name()
        ),
        None => format!(
            "No elements with locator '{locator}' were found in {} state",
            desired.state_name()
        ),
    }
}
