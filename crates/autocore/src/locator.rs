//! Locator abstraction for element addressing.
//!
//! A [`Locator`] is an immutable `(strategy, value)` pair. It is the key for
//! every lookup the finder performs and is never mutated after construction.
//!
//! # XPath generation
//!
//! Child and indexed elements are addressed with synthetic XPath locators
//! derived from their parent's locator. Only strategies with an XPath
//! equivalent (`id`, `class name`, `name`, `tag name`, `xpath`) can be
//! converted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{CoreError, CoreResult};

/// Locator strategy (WebDriver "using" values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    /// Element id attribute
    Id,
    /// CSS selector
    CssSelector,
    /// XPath expression
    XPath,
    /// Single class name
    ClassName,
    /// Tag name
    TagName,
    /// Name attribute
    Name,
    /// Exact link text
    LinkText,
    /// Partial link text
    PartialLinkText,
}

impl By {
    /// Get the WebDriver strategy string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CssSelector => "css selector",
            Self::XPath => "xpath",
            Self::ClassName => "class name",
            Self::TagName => "tag name",
            Self::Name => "name",
            Self::LinkText => "link text",
            Self::PartialLinkText => "partial link text",
        }
    }

    /// Constant-style name used in log and error messages (e.g. `CSS_SELECTOR`)
    #[must_use]
    pub const fn constant_name(&self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::CssSelector => "CSS_SELECTOR",
            Self::XPath => "XPATH",
            Self::ClassName => "CLASS_NAME",
            Self::TagName => "TAG_NAME",
            Self::Name => "NAME",
            Self::LinkText => "LINK_TEXT",
            Self::PartialLinkText => "PARTIAL_LINK_TEXT",
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable element locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    by: By,
    value: String,
}

impl Locator {
    /// Create a locator from a strategy and a value
    #[must_use]
    pub fn new(by: By, value: impl Into<String>) -> Self {
        Self {
            by,
            value: value.into(),
        }
    }

    /// Locate by id attribute
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(By::Id, value)
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(By::CssSelector, value)
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(By::XPath, value)
    }

    /// Locate by class name
    #[must_use]
    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(By::ClassName, value)
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag_name(value: impl Into<String>) -> Self {
        Self::new(By::TagName, value)
    }

    /// Locate by name attribute
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(By::Name, value)
    }

    /// Locate by exact link text
    #[must_use]
    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(By::LinkText, value)
    }

    /// Locate by partial link text
    #[must_use]
    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Self::new(By::PartialLinkText, value)
    }

    /// Get the strategy
    #[must_use]
    pub const fn by(&self) -> By {
        self.by
    }

    /// Get the selector value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Convert to an equivalent XPath locator
    ///
    /// # Errors
    ///
    /// Returns a configuration error for strategies without an XPath form
    /// (CSS selector and link texts).
    pub fn to_xpath(&self) -> CoreResult<Self> {
        let value = &self.value;
        let xpath = match self.by {
            By::Id => format!("//*[@id='{value}']"),
            By::ClassName => format!("//*[@class='{value}']"),
            By::Name => format!("//*[@name='{value}']"),
            By::TagName => format!("//{value}"),
            By::XPath => value.clone(),
            other => {
                return Err(CoreError::configuration(format!(
                    "No such expected value: {}",
                    other.constant_name()
                )))
            }
        };
        Ok(Self::xpath(xpath))
    }

    /// XPath locator of the `index`-th (1-based) match of this locator
    pub fn indexed(&self, index: usize) -> CoreResult<Self> {
        let base = self.to_xpath()?;
        Ok(Self::xpath(format!("({})[{index}]", base.value)))
    }

    /// Absolute XPath locator of `child` relative to this locator
    ///
    /// XPath children may be written as `./div`, `/div`, `//div` or bare `div`
    /// (the latter is matched through `//child::`).
    pub fn child(&self, child: &Self) -> CoreResult<Self> {
        let parent = self.to_xpath()?;
        let child_xpath = if child.by == By::XPath {
            let value = child.value.as_str();
            if let Some(rest) = value.strip_prefix('.').filter(|r| r.starts_with('/')) {
                rest.to_string()
            } else if value.starts_with('/') {
                value.to_string()
            } else {
                format!("//child::{value}")
            }
        } else {
            child.to_xpath()?.value
        };
        Ok(Self::xpath(format!("{}{child_xpath}", parent.value)))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}: {}", self.by.constant_name(), self.value)
    }
}
