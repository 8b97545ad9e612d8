//! Result and error types for Autocore.
//!
//! Every failure carries an [`ErrorKind`] from a closed set. Retry and wait
//! policies filter on the kind, never on the concrete error value.

use std::fmt;
use thiserror::Error;

/// Result type for Autocore operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Closed classification of every error the crate can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Element reference no longer points at a live DOM node
    StaleElementReference,
    /// Element is in a state that does not allow the operation
    InvalidElementState,
    /// No element matched the locator in the desired state
    NoSuchElement,
    /// A wait deadline elapsed
    Timeout,
    /// Invalid argument or configuration
    Configuration,
    /// Any other failure reported by the browser driver
    Driver,
    /// I/O failure
    Io,
    /// JSON failure
    Json,
}

impl ErrorKind {
    /// Transient DOM errors: expected while the page is still mutating
    pub const TRANSIENT: [Self; 2] = [Self::StaleElementReference, Self::InvalidElementState];

    /// Get the kind name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StaleElementReference => "stale element reference",
            Self::InvalidElementState => "invalid element state",
            Self::NoSuchElement => "no such element",
            Self::Timeout => "timeout",
            Self::Configuration => "configuration",
            Self::Driver => "driver",
            Self::Io => "io",
            Self::Json => "json",
        }
    }

    /// Check whether this kind is a transient DOM error
    #[must_use]
    pub fn is_transient(self) -> bool {
        Self::TRANSIENT.contains(&self)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in Autocore
#[derive(Debug, Error)]
pub enum CoreError {
    /// Element reference is stale
    #[error("Stale element reference: {message}")]
    StaleElementReference {
        /// Error message
        message: String,
    },

    /// Element is not in a state that allows the operation
    #[error("Invalid element state: {message}")]
    InvalidElementState {
        /// Error message
        message: String,
    },

    /// Element was not found in the desired state
    #[error("{message}")]
    NoSuchElement {
        /// Error message (locator, element name, state label)
        message: String,
    },

    /// Wait timed out
    #[error("{message}")]
    Timeout {
        /// Error message, starts with `Timed out after`
        message: String,
    },

    /// Invalid argument or configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Browser driver failure
    #[error("WebDriver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a stale element reference error
    #[must_use]
    pub fn stale(message: impl Into<String>) -> Self {
        Self::StaleElementReference {
            message: message.into(),
        }
    }

    /// Create an invalid element state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidElementState {
            message: message.into(),
        }
    }

    /// Create a no-such-element error
    #[must_use]
    pub fn no_such_element(message: impl Into<String>) -> Self {
        Self::NoSuchElement {
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Get the closed kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::StaleElementReference { .. } => ErrorKind::StaleElementReference,
            Self::InvalidElementState { .. } => ErrorKind::InvalidElementState,
            Self::NoSuchElement { .. } => ErrorKind::NoSuchElement,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Driver { .. } => ErrorKind::Driver,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Json,
        }
    }

    /// Check the kind of this error
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    /// Raw message without the kind prefix added by `Display`
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::StaleElementReference { message }
            | Self::InvalidElementState { message }
            | Self::NoSuchElement { message }
            | Self::Timeout { message }
            | Self::Configuration { message }
            | Self::Driver { message } => message.clone(),
            Self::Io(e) => e.to_string(),
            Self::Json(e) => e.to_string(),
        }
    }
}
