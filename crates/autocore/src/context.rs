//! Per-session service wiring.
//!
//! [`CoreServices`] is built once per browser session from the settings and
//! the application. Every service it hands out is `Arc`-shared, so elements,
//! finders and waits created from it observe the same configuration.

use std::path::Path;
use std::sync::Arc;

use crate::configuration::{
    ElementCacheConfiguration, JsonSettings, LoggerConfiguration, RetryConfiguration,
    TimeoutConfiguration,
};
use crate::driver::Application;
use crate::elements::{Element, ElementEnvironment, ElementFactory, ElementFinder, ElementState};
use crate::localization::{LocalizationManager, LocalizedLogger};
use crate::locator::Locator;
use crate::result::CoreResult;
use crate::retry::{ActionRetrier, ElementActionRetrier};
use crate::wait::ConditionalWait;

/// Services shared by one browser session
#[derive(Debug, Clone)]
pub struct CoreServices {
    timeouts: TimeoutConfiguration,
    retry: RetryConfiguration,
    action_retrier: ActionRetrier,
    env: Arc<ElementEnvironment>,
}

impl CoreServices {
    /// Wire the services from settings and a started (or startable) session
    ///
    /// # Errors
    ///
    /// `Configuration` when a settings section is malformed or the logger
    /// language is not supported.
    pub fn new(settings: &JsonSettings, application: Arc<dyn Application>) -> CoreResult<Self> {
        let logger_configuration = LoggerConfiguration::from_settings(settings)?;
        let manager = LocalizationManager::from_configuration(&logger_configuration)?;
        Self::assemble(settings, manager, logger_configuration, application)
    }

    /// Load settings and the caller's localization dictionary under `root`
    ///
    /// The settings profile is taken from the `profile` environment variable.
    ///
    /// # Errors
    ///
    /// As [`Self::new`], plus `Io`/`Json` when a dictionary file cannot be read.
    pub fn from_root(
        root: impl AsRef<Path>,
        application: Arc<dyn Application>,
    ) -> CoreResult<Self> {
        let root = root.as_ref();
        let settings = JsonSettings::load(root)?;
        let logger_configuration = LoggerConfiguration::from_settings(&settings)?;
        let manager = LocalizationManager::load(&logger_configuration, root)?;
        Self::assemble(&settings, manager, logger_configuration, application)
    }

    fn assemble(
        settings: &JsonSettings,
        manager: LocalizationManager,
        logger_configuration: LoggerConfiguration,
        application: Arc<dyn Application>,
    ) -> CoreResult<Self> {
        let timeouts = TimeoutConfiguration::from_settings(settings)?;
        let retry = RetryConfiguration::from_settings(settings)?;
        let cache_configuration = ElementCacheConfiguration::from_settings(settings)?;

        let logger = Arc::new(LocalizedLogger::new(Arc::new(manager), logger_configuration));
        let wait = Arc::new(ConditionalWait::new(timeouts, Arc::clone(&application)));
        let finder = Arc::new(ElementFinder::new(Arc::clone(&logger), Arc::clone(&wait)));

        tracing::debug!(
            condition = ?timeouts.condition,
            polling_interval = ?timeouts.polling_interval,
            retries = retry.number,
            cache = cache_configuration.is_enabled,
            "Core services created"
        );

        Ok(Self {
            timeouts,
            retry,
            action_retrier: ActionRetrier::new(retry),
            env: Arc::new(ElementEnvironment {
                application,
                wait,
                finder,
                retrier: ElementActionRetrier::new(retry),
                logger,
                cache_configuration,
            }),
        })
    }

    /// Browser session
    #[must_use]
    pub fn application(&self) -> &Arc<dyn Application> {
        &self.env.application
    }

    /// Whether the session has been started
    #[must_use]
    pub fn is_application_started(&self) -> bool {
        self.env.application.is_started()
    }

    /// Timeouts
    #[must_use]
    pub const fn timeouts(&self) -> &TimeoutConfiguration {
        &self.timeouts
    }

    /// Retry settings
    #[must_use]
    pub const fn retry_configuration(&self) -> &RetryConfiguration {
        &self.retry
    }

    /// Element cache switch
    #[must_use]
    pub fn element_cache_configuration(&self) -> &ElementCacheConfiguration {
        &self.env.cache_configuration
    }

    /// Logger settings
    #[must_use]
    pub fn logger_configuration(&self) -> &LoggerConfiguration {
        self.env.logger.configuration()
    }

    /// Polling engine
    #[must_use]
    pub fn conditional_wait(&self) -> Arc<ConditionalWait> {
        Arc::clone(&self.env.wait)
    }

    /// Element finder
    #[must_use]
    pub fn element_finder(&self) -> Arc<ElementFinder> {
        Arc::clone(&self.env.finder)
    }

    /// Generic action retrier
    #[must_use]
    pub const fn action_retrier(&self) -> &ActionRetrier {
        &self.action_retrier
    }

    /// Element interaction retrier
    #[must_use]
    pub fn element_action_retrier(&self) -> &ElementActionRetrier {
        &self.env.retrier
    }

    /// Localized logger
    #[must_use]
    pub fn logger(&self) -> Arc<LocalizedLogger> {
        Arc::clone(&self.env.logger)
    }

    /// Services shared by elements
    #[must_use]
    pub fn element_environment(&self) -> Arc<ElementEnvironment> {
        Arc::clone(&self.env)
    }

    /// Element factory bound to this session
    #[must_use]
    pub fn element_factory(&self) -> ElementFactory {
        ElementFactory::new(self.element_environment())
    }

    /// Shorthand for [`ElementFactory::get_custom_element`]
    #[must_use]
    pub fn element(&self, locator: Locator, name: &str, state: ElementState) -> Element {
        self.element_factory().get_custom_element(locator, name, state)
    }
}
