//! Element construction: custom, child and indexed element lists.

use std::sync::Arc;
use std::time::Duration;

use super::desired_state::ElementState;
use super::element::{Element, ElementEnvironment};
use crate::locator::Locator;
use crate::result::CoreResult;
use crate::wait::WaitOptions;

/// Expected number of matches for a list lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementsCount {
    /// No element may match
    Zero,
    /// At least one element must match
    MoreThanZero,
    /// Any number
    #[default]
    Any,
}

/// Creates [`Element`]s bound to one session
#[derive(Debug, Clone)]
pub struct ElementFactory {
    env: Arc<ElementEnvironment>,
}

impl ElementFactory {
    /// Create a factory
    #[must_use]
    pub const fn new(env: Arc<ElementEnvironment>) -> Self {
        Self { env }
    }

    /// Element for `locator`
    #[must_use]
    pub fn get_custom_element(&self, locator: Locator, name: &str, state: ElementState) -> Element {
        Element::new(locator, name, state, Arc::clone(&self.env))
    }

    /// Element located relative to `parent`
    ///
    /// Named `Child element of {parent}` unless `name` is given.
    ///
    /// # Errors
    ///
    /// `Configuration` when either locator has no XPath form.
    pub fn find_child_element(
        &self,
        parent: &Element,
        child_locator: &Locator,
        name: Option<&str>,
        state: ElementState,
    ) -> CoreResult<Element> {
        let locator = parent.locator().child(child_locator)?;
        let name = child_name(parent, name);
        Ok(Element::new(locator, name, state, Arc::clone(&self.env)))
    }

    /// Elements located relative to `parent`
    ///
    /// # Errors
    ///
    /// See [`Self::find_elements`].
    pub fn find_child_elements(
        &self,
        parent: &Element,
        child_locator: &Locator,
        name: Option<&str>,
        expected_count: ElementsCount,
        state: ElementState,
    ) -> CoreResult<Vec<Element>> {
        let locator = parent.locator().child(child_locator)?;
        let name = child_name(parent, name);
        self.find_elements(&locator, Some(&name), expected_count, state)
    }

    /// One element per current match of `locator`
    ///
    /// Waits (up to the condition timeout) until the match count agrees with
    /// `expected_count`. Each element gets the locator `(xpath)[i]` and the
    /// name `{name} {i}`, `i` starting at 1.
    ///
    /// # Errors
    ///
    /// `Timeout` when the expected count is not reached, `Configuration` when
    /// the locator has no XPath form.
    pub fn find_elements(
        &self,
        locator: &Locator,
        name: Option<&str>,
        expected_count: ElementsCount,
        state: ElementState,
    ) -> CoreResult<Vec<Element>> {
        let finder = &self.env.finder;
        let manager = self.env.logger.localization_manager();
        let locator_text = locator.to_string();
        let label = name.unwrap_or_default();
        let count_now = || -> CoreResult<usize> {
            Ok(finder
                .find_elements(locator, state, Some(Duration::ZERO), name)?
                .len())
        };

        match expected_count {
            ElementsCount::Zero => {
                let message = manager.get_localized_message(
                    "loc.elements.with.name.found.but.should.not",
                    &[label, locator_text.as_str(), state.as_str()],
                );
                self.env.wait.wait_for_true(
                    || Ok(count_now()? == 0),
                    &WaitOptions::new().with_message(message),
                )?;
            }
            ElementsCount::MoreThanZero => {
                let message = manager.get_localized_message(
                    "loc.no.elements.with.name.found.by.locator",
                    &[label, locator_text.as_str()],
                );
                self.env.wait.wait_for_true(
                    || Ok(count_now()? > 0),
                    &WaitOptions::new().with_message(message),
                )?;
            }
            ElementsCount::Any => {
                self.env
                    .wait
                    .wait_for_condition(|| count_now().map(|_| true), &WaitOptions::new())?;
            }
        }

        let base_name = name.unwrap_or("element");
        let count = count_now()?;
        (1..=count)
            .map(|index| -> CoreResult<Element> {
                Ok(Element::new(
                    locator.indexed(index)?,
                    format!("{base_name} {index}"),
                    state,
                    Arc::clone(&self.env),
                ))
            })
            .collect()
    }
}

fn child_name(parent: &Element, name: Option<&str>) -> String {
    name.map_or_else(
        || format!("Child element of {}", parent.name()),
        str::to_string,
    )
}
