//! Driver abstraction
//!
//! The engine never talks to a concrete browser. It consumes three small
//! traits:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Application        one browser session                      │
//! │    ├── driver()                 -> &dyn WebDriver            │
//! │    ├── is_started()                                          │
//! │    └── set_implicit_wait_timeout(Duration)                   │
//! │                                                              │
//! │  WebDriver          find_elements(&Locator), page_source()   │
//! │                                                              │
//! │  WebElement         one resolved DOM node (ElementHandle)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations report failures as [`CoreError`](crate::CoreError) values
//! of the matching kind: a detached node must answer with
//! `StaleElementReference`, an element that rejects an interaction with
//! `InvalidElementState`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::locator::Locator;
use crate::result::CoreResult;

/// A resolved browser element, shared between the finder, caches and actions
pub type ElementHandle = Arc<dyn WebElement>;

/// One DOM node as seen through the browser driver
pub trait WebElement: Send + Sync + fmt::Debug {
    /// Opaque element reference id, stable for the node's lifetime
    fn id(&self) -> &str;

    /// Whether the element is rendered visibly
    fn is_displayed(&self) -> CoreResult<bool>;

    /// Whether the element reports itself enabled
    fn is_enabled(&self) -> CoreResult<bool>;

    /// Attribute or property value, `None` when absent
    fn get_attribute(&self, name: &str) -> CoreResult<Option<String>>;

    /// Visible text
    fn text(&self) -> CoreResult<String>;

    /// Click the element
    fn click(&self) -> CoreResult<()>;

    /// Type text into the element
    fn send_keys(&self, text: &str) -> CoreResult<()>;
}

/// Browser driver operations consumed by the engine
pub trait WebDriver: Send + Sync {
    /// All current matches of `locator`, in document order
    fn find_elements(&self, locator: &Locator) -> CoreResult<Vec<ElementHandle>>;

    /// Current page source
    fn page_source(&self) -> CoreResult<String>;
}

/// The controlled application (one browser session)
pub trait Application: Send + Sync {
    /// Driver bound to this session
    fn driver(&self) -> &dyn WebDriver;

    /// Whether the session has been started
    fn is_started(&self) -> bool;

    /// Set the driver-level implicit wait
    fn set_implicit_wait_timeout(&self, timeout: Duration) -> CoreResult<()>;
}
