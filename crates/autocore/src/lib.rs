//! Autocore: element resolution, waiting and retry engine for browser tests
//!
//! The engine sits between test code and a WebDriver-style browser driver. It
//! finds elements in a desired state, polls conditions under a deadline,
//! retries interactions that hit transient DOM errors and memoizes element
//! handles with staleness detection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     AUTOCORE Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Element    │───►│ Element    │───►│ Element    │            │
//! │   │ (actions)  │    │ Cache      │    │ Finder     │            │
//! │   └─────┬──────┘    └────────────┘    └─────┬──────┘            │
//! │         │                                   │                   │
//! │         ▼                                   ▼                   │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Action     │    │ State      │───►│ Conditional│───► Driver │
//! │   │ Retrier    │    │ Provider   │    │ Wait       │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │                                                                 │
//! │   CoreServices: settings ─► configuration ─► shared services    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use autocore::mock::{FakeApplication, FakeElement};
//! use autocore::prelude::*;
//!
//! let app = FakeApplication::shared();
//! app.driver_fake()
//!     .set_elements(Locator::id("submit"), vec![FakeElement::shared()]);
//!
//! let services = CoreServices::new(&JsonSettings::embedded_defaults()?, app)?;
//! let submit = services.element(Locator::id("submit"), "Submit", ElementState::Displayed);
//! submit.click()?;
//! # Ok::<(), autocore::CoreError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Settings documents and typed configuration sections
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
pub mod configuration;

/// Per-session service wiring
pub mod context;

/// Driver traits consumed by the engine
pub mod driver;

/// Element finder, state provider, cache and factory
#[allow(clippy::module_name_repetitions)]
pub mod elements;

/// Localized messages and logging
#[allow(clippy::missing_errors_doc)]
pub mod localization;

/// Element locators and XPath rendering
pub mod locator;

/// Tracing subscriber setup
pub mod logging;

/// In-memory browser for tests
#[cfg(any(test, feature = "mock"))]
#[allow(clippy::missing_panics_doc, clippy::must_use_candidate)]
pub mod mock;

mod result;

/// Retry-on-error wrappers
pub mod retry;

/// Polling waits
pub mod wait;

pub use configuration::{
    ElementCacheConfiguration, JsonSettings, LoggerConfiguration, RetryConfiguration,
    TimeoutConfiguration,
};
pub use context::CoreServices;
pub use driver::{Application, ElementHandle, WebDriver, WebElement};
pub use elements::{
    DesiredState, Element, ElementCacheHandler, ElementEnvironment, ElementFactory, ElementFinder,
    ElementState, ElementStateProvider, ElementsCount, StateCondition, StateLogger, StateSpec,
};
pub use localization::{LocalizationManager, LocalizedLogger};
pub use locator::{By, Locator};
pub use logging::init_logging;
pub use result::{CoreError, CoreResult, ErrorKind};
pub use retry::{ActionRetrier, ElementActionRetrier};
pub use wait::{timeout_message, ConditionalWait, WaitOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::configuration::*;
    pub use super::context::*;
    pub use super::driver::*;
    pub use super::elements::*;
    pub use super::localization::*;
    pub use super::locator::*;
    pub use super::result::*;
    pub use super::retry::*;
    pub use super::wait::*;
}
