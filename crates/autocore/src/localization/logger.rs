//! Logger that resolves message keys before emitting `tracing` events.

use std::sync::Arc;

use super::manager::LocalizationManager;
use crate::configuration::LoggerConfiguration;
use crate::result::CoreError;

/// Localized front-end for `tracing`
#[derive(Debug, Clone)]
pub struct LocalizedLogger {
    manager: Arc<LocalizationManager>,
    configuration: LoggerConfiguration,
}

impl LocalizedLogger {
    /// Create a logger over a localization manager
    #[must_use]
    pub const fn new(
        manager: Arc<LocalizationManager>,
        configuration: LoggerConfiguration,
    ) -> Self {
        Self {
            manager,
            configuration,
        }
    }

    /// Logger configuration
    #[must_use]
    pub const fn configuration(&self) -> &LoggerConfiguration {
        &self.configuration
    }

    /// Underlying localization manager
    #[must_use]
    pub fn localization_manager(&self) -> &LocalizationManager {
        &self.manager
    }

    /// Log an element action as `{type} '{name}' :: {message}`
    pub fn info_element_action(
        &self,
        element_type: &str,
        element_name: &str,
        key: &str,
        args: &[&str],
    ) {
        let message = self.manager.get_localized_message(key, args);
        tracing::info!(
            element_type,
            element_name,
            "{element_type} '{element_name}' :: {message}"
        );
    }

    /// Info-level localized message
    pub fn info(&self, key: &str, args: &[&str]) {
        tracing::info!("{}", self.manager.get_localized_message(key, args));
    }

    /// Debug-level localized message with an optional cause
    pub fn debug(&self, key: &str, error: Option<&CoreError>, args: &[&str]) {
        let message = self.manager.get_localized_message(key, args);
        match error {
            Some(error) => tracing::debug!(error = %error, kind = %error.kind(), "{message}"),
            None => tracing::debug!("{message}"),
        }
    }

    /// Warn-level localized message
    pub fn warn(&self, key: &str, args: &[&str]) {
        tracing::warn!("{}", self.manager.get_localized_message(key, args));
    }

    /// Error-level localized message
    pub fn error(&self, key: &str, args: &[&str]) {
        tracing::error!("{}", self.manager.get_localized_message(key, args));
    }
}
