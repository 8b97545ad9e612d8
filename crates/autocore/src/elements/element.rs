//! The logical element: a named locator plus the services it acts through.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use super::cache::ElementCacheHandler;
use super::desired_state::ElementState;
use super::factory::{ElementFactory, ElementsCount};
use super::finder::ElementFinder;
use super::state::{ElementStateProvider, StateLogger};
use crate::configuration::ElementCacheConfiguration;
use crate::driver::{Application, ElementHandle};
use crate::localization::LocalizedLogger;
use crate::locator::Locator;
use crate::result::{CoreError, CoreResult, ErrorKind};
use crate::retry::ElementActionRetrier;
use crate::wait::ConditionalWait;

/// Services every element of one session shares
#[derive(Clone)]
pub struct ElementEnvironment {
    /// Browser session
    pub application: Arc<dyn Application>,
    /// Polling engine
    pub wait: Arc<ConditionalWait>,
    /// Element finder
    pub finder: Arc<ElementFinder>,
    /// Retrier for interactions
    pub retrier: ElementActionRetrier,
    /// Localized logger
    pub logger: Arc<LocalizedLogger>,
    /// Element cache switch
    pub cache_configuration: ElementCacheConfiguration,
}

impl std::fmt::Debug for ElementEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementEnvironment")
            .field("retrier", &self.retrier)
            .field("cache_configuration", &self.cache_configuration)
            .finish_non_exhaustive()
    }
}

/// A UI element addressed by locator
///
/// The browser handle is looked up on every interaction, or memoized when
/// element caching is enabled. Interactions are logged and retried on
/// transient DOM errors.
#[derive(Debug)]
pub struct Element {
    locator: Locator,
    name: String,
    element_state: ElementState,
    element_type: String,
    env: Arc<ElementEnvironment>,
    cache: OnceLock<ElementCacheHandler>,
}

impl Element {
    /// Default type label used in action logs
    pub const DEFAULT_TYPE: &'static str = "Element";

    /// Create an element
    #[must_use]
    pub fn new(
        locator: Locator,
        name: impl Into<String>,
        element_state: ElementState,
        env: Arc<ElementEnvironment>,
    ) -> Self {
        Self {
            locator,
            name: name.into(),
            element_state,
            element_type: Self::DEFAULT_TYPE.to_string(),
            env,
            cache: OnceLock::new(),
        }
    }

    /// Set the type label (`Button`, `Link`, ...)
    #[must_use]
    pub fn with_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = element_type.into();
        self
    }

    /// Locator
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// State used to resolve the handle
    #[must_use]
    pub const fn element_state(&self) -> ElementState {
        self.element_state
    }

    /// Type label
    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Shared services
    #[must_use]
    pub fn environment(&self) -> &Arc<ElementEnvironment> {
        &self.env
    }

    /// Cache handler, created on first use
    pub fn cache(&self) -> &ElementCacheHandler {
        self.cache.get_or_init(|| {
            ElementCacheHandler::new(
                self.locator.clone(),
                self.name.clone(),
                self.element_state,
                Arc::clone(&self.env.finder),
            )
        })
    }

    /// State queries for this element's locator
    #[must_use]
    pub fn state(&self) -> ElementStateProvider {
        ElementStateProvider::new(
            self.locator.clone(),
            Arc::clone(&self.env.wait),
            Arc::clone(&self.env.finder),
            self.state_logger(),
        )
    }

    /// Resolve the browser handle
    ///
    /// # Errors
    ///
    /// `NoSuchElement` or `Timeout` from the finder. The page source is
    /// logged first when `log_page_source` is set.
    pub fn get_element(&self, timeout: Option<Duration>) -> CoreResult<ElementHandle> {
        let result = if self.env.cache_configuration.is_enabled {
            self.cache().get_element(timeout, None)
        } else {
            self.env
                .finder
                .find_element(&self.locator, self.element_state, timeout, Some(&self.name))
        };
        result.map_err(|error| {
            if error.is(ErrorKind::NoSuchElement)
                && self.env.logger.configuration().log_page_source
            {
                self.log_page_source(&error);
            }
            error
        })
    }

    /// Click the element
    pub fn click(&self) -> CoreResult<()> {
        self.log_element_action("loc.clicking", &[]);
        self.env
            .retrier
            .do_with_retry(|| self.get_element(None)?.click())
    }

    /// Type `text` into the element
    pub fn send_keys(&self, text: &str) -> CoreResult<()> {
        self.log_element_action("loc.text.sending.keys", &[text]);
        self.env
            .retrier
            .do_with_retry(|| self.get_element(None)?.send_keys(text))
    }

    /// Visible text
    pub fn text(&self) -> CoreResult<String> {
        self.log_element_action("loc.get.text", &[]);
        let text = self.env.retrier.do_with_retry(|| self.get_element(None)?.text())?;
        self.log_element_action("loc.text.value", &[text.as_str()]);
        Ok(text)
    }

    /// Attribute value, `None` when absent
    pub fn get_attribute(&self, attribute: &str) -> CoreResult<Option<String>> {
        self.log_element_action("loc.el.getattr", &[attribute]);
        let value = self
            .env
            .retrier
            .do_with_retry(|| self.get_element(None)?.get_attribute(attribute))?;
        self.log_element_action(
            "loc.el.attr.value",
            &[attribute, value.as_deref().unwrap_or_default()],
        );
        Ok(value)
    }

    /// Child element relative to this one
    ///
    /// # Errors
    ///
    /// `Configuration` when either locator has no XPath form.
    pub fn find_child_element(
        &self,
        child_locator: &Locator,
        name: Option<&str>,
        state: ElementState,
    ) -> CoreResult<Self> {
        self.factory().find_child_element(self, child_locator, name, state)
    }

    /// Child elements relative to this one
    ///
    /// # Errors
    ///
    /// See [`ElementFactory::find_elements`].
    pub fn find_child_elements(
        &self,
        child_locator: &Locator,
        name: Option<&str>,
        expected_count: ElementsCount,
        state: ElementState,
    ) -> CoreResult<Vec<Self>> {
        self.factory()
            .find_child_elements(self, child_locator, name, expected_count, state)
    }

    fn factory(&self) -> ElementFactory {
        ElementFactory::new(Arc::clone(&self.env))
    }

    fn log_element_action(&self, key: &str, args: &[&str]) {
        self.env
            .logger
            .info_element_action(&self.element_type, &self.name, key, args);
    }

    fn state_logger(&self) -> StateLogger {
        let logger = Arc::clone(&self.env.logger);
        let element_type = self.element_type.clone();
        let name = self.name.clone();
        Arc::new(move |message_key: &str, state_key: &str| {
            let state = logger
                .localization_manager()
                .get_localized_message(state_key, &[]);
            logger.info_element_action(&element_type, &name, message_key, &[state.as_str()]);
        })
    }

    fn log_page_source(&self, error: &CoreError) {
        match self.env.application.driver().page_source() {
            Ok(source) => tracing::debug!(%error, "Page source:{source}"),
            Err(page_error) => {
                tracing::error!(error = %page_error, "{}", page_error.message());
                self.env
                    .logger
                    .debug("loc.page.source.failed", Some(&page_error), &[]);
            }
        }
    }
}
