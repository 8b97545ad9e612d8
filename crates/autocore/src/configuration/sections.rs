//! Typed configuration sections read from [`JsonSettings`].

use std::time::Duration;

use super::settings::JsonSettings;
use crate::result::CoreResult;

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Timeouts shared by every waiting component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfiguration {
    /// Driver-level implicit wait restored after explicit waits
    pub implicit: Duration,
    /// Default wait-for-condition timeout
    pub condition: Duration,
    /// Default polling interval
    pub polling_interval: Duration,
    /// Driver command timeout
    pub command: Duration,
}

impl Default for TimeoutConfiguration {
    fn default() -> Self {
        Self {
            implicit: Duration::ZERO,
            condition: Duration::from_secs(30),
            polling_interval: Duration::from_millis(300),
            command: Duration::from_secs(60),
        }
    }
}

impl TimeoutConfiguration {
    /// Settings section name
    pub const NODE: &'static str = "timeouts";

    /// Read the `timeouts` section
    pub fn from_settings(settings: &JsonSettings) -> CoreResult<Self> {
        let node = settings.node(Self::NODE);
        let defaults = Self::default();
        Ok(Self {
            implicit: node.get_seconds("timeoutImplicit", defaults.implicit)?,
            condition: node.get_seconds("timeoutCondition", defaults.condition)?,
            polling_interval: node
                .get_seconds("timeoutPollingInterval", defaults.polling_interval)?,
            command: node.get_seconds("timeoutCommand", defaults.command)?,
        })
    }

    /// Set the implicit wait
    #[must_use]
    pub const fn with_implicit(mut self, implicit: Duration) -> Self {
        self.implicit = implicit;
        self
    }

    /// Set the condition timeout
    #[must_use]
    pub const fn with_condition(mut self, condition: Duration) -> Self {
        self.condition = condition;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }
}

// =============================================================================
// RETRY
// =============================================================================

/// Retry budget for action retriers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfiguration {
    /// Retries after the first attempt
    pub number: u32,
    /// Sleep between attempts
    pub polling_interval: Duration,
}

impl Default for RetryConfiguration {
    fn default() -> Self {
        Self {
            number: 2,
            polling_interval: Duration::from_millis(300),
        }
    }
}

impl RetryConfiguration {
    /// Settings section name
    pub const NODE: &'static str = "retry";

    /// Create a retry configuration
    #[must_use]
    pub const fn new(number: u32, polling_interval: Duration) -> Self {
        Self {
            number,
            polling_interval,
        }
    }

    /// Read the `retry` section
    pub fn from_settings(settings: &JsonSettings) -> CoreResult<Self> {
        let node = settings.node(Self::NODE);
        let defaults = Self::default();
        Ok(Self {
            number: node.get_or("number", defaults.number)?,
            polling_interval: node.get_seconds("pollingInterval", defaults.polling_interval)?,
        })
    }

    /// Total number of calls an action may receive
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.number.saturating_add(1)
    }
}

// =============================================================================
// ELEMENT CACHE
// =============================================================================

/// Element cache switch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementCacheConfiguration {
    /// Whether elements memoize their resolved handle
    pub is_enabled: bool,
}

impl ElementCacheConfiguration {
    /// Settings section name
    pub const NODE: &'static str = "elementCache";

    /// Read the `elementCache` section
    pub fn from_settings(settings: &JsonSettings) -> CoreResult<Self> {
        Ok(Self {
            is_enabled: settings.node(Self::NODE).get_or("isEnabled", false)?,
        })
    }

    /// Enabled cache
    #[must_use]
    pub const fn enabled() -> Self {
        Self { is_enabled: true }
    }
}

// =============================================================================
// LOGGER
// =============================================================================

/// Logger and localization settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfiguration {
    /// Message language (`en`, `ru`)
    pub language: String,
    /// Log the page source when an element is not found
    pub log_page_source: bool,
}

impl Default for LoggerConfiguration {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            log_page_source: true,
        }
    }
}

impl LoggerConfiguration {
    /// Settings section name
    pub const NODE: &'static str = "logger";

    /// Read the `logger` section
    pub fn from_settings(settings: &JsonSettings) -> CoreResult<Self> {
        let node = settings.node(Self::NODE);
        let defaults = Self::default();
        Ok(Self {
            language: node.get_or("language", defaults.language)?,
            log_page_source: node.get_or("logPageSource", defaults.log_page_source)?,
        })
    }
}
