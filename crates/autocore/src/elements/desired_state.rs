//! Element states and the predicates the finder filters with.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::driver::WebElement;
use crate::result::{CoreError, CoreResult};

/// Predicate deciding whether a resolved element is in the desired state
pub type StateCondition = Arc<dyn Fn(&dyn WebElement) -> CoreResult<bool> + Send + Sync>;

/// Named element states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementState {
    /// Present and visible
    #[default]
    Displayed,
    /// Present in the DOM, visible or not
    ExistsInAnyState,
}

impl ElementState {
    /// State label used in messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Displayed => "Displayed",
            Self::ExistsInAnyState => "ExistsInAnyState",
        }
    }

    /// Fixed predicate for this state
    #[must_use]
    pub fn condition(self) -> StateCondition {
        match self {
            Self::Displayed => Arc::new(|element: &dyn WebElement| element.is_displayed()),
            Self::ExistsInAnyState => Arc::new(|_: &dyn WebElement| Ok(true)),
        }
    }

    /// Desired state with default flags
    #[must_use]
    pub fn desired(self) -> DesiredState {
        DesiredState::from_condition(self.condition(), self.as_str())
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', ' '], "").as_str() {
            "displayed" => Ok(Self::Displayed),
            "existsinanystate" => Ok(Self::ExistsInAnyState),
            _ => Err(CoreError::configuration(format!("{s} state is not recognized"))),
        }
    }
}

/// A state predicate plus the error-handling flags of one search
#[derive(Clone)]
pub struct DesiredState {
    condition: StateCondition,
    state_name: String,
    /// Turn a search timeout into an empty result
    pub catch_timeout: bool,
    /// Raise `NoSuchElement` when nothing was found at all
    pub throw_not_found: bool,
}

impl fmt::Debug for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesiredState")
            .field("state_name", &self.state_name)
            .field("catch_timeout", &self.catch_timeout)
            .field("throw_not_found", &self.throw_not_found)
            .finish_non_exhaustive()
    }
}

impl DesiredState {
    /// Desired state from a closure; both flags start `false`
    #[must_use]
    pub fn new<F>(condition: F, state_name: impl Into<String>) -> Self
    where
        F: Fn(&dyn WebElement) -> CoreResult<bool> + Send + Sync + 'static,
    {
        Self::from_condition(Arc::new(condition), state_name)
    }

    /// Desired state from a shared condition
    #[must_use]
    pub fn from_condition(condition: StateCondition, state_name: impl Into<String>) -> Self {
        Self {
            condition,
            state_name: state_name.into(),
            catch_timeout: false,
            throw_not_found: false,
        }
    }

    /// Set `catch_timeout`
    #[must_use]
    pub const fn with_catch_timeout(mut self, catch_timeout: bool) -> Self {
        self.catch_timeout = catch_timeout;
        self
    }

    /// Set `throw_not_found`
    #[must_use]
    pub const fn with_throw_not_found(mut self, throw_not_found: bool) -> Self {
        self.throw_not_found = throw_not_found;
        self
    }

    /// State label used in messages
    #[must_use]
    pub fn state_name(&self) -> &str {
        &self.state_name
    }

    /// Evaluate the predicate
    pub fn matches(&self, element: &dyn WebElement) -> CoreResult<bool> {
        (self.condition)(element)
    }
}

/// State argument accepted by the finder
#[derive(Clone)]
pub enum StateSpec {
    /// One of the named states
    Named(ElementState),
    /// Ad-hoc predicate with a label for messages
    Predicate {
        /// Element predicate
        condition: StateCondition,
        /// State label
        label: String,
    },
    /// Fully specified desired state (flags included)
    Desired(DesiredState),
}

impl fmt::Debug for StateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(state) => f.debug_tuple("Named").field(state).finish(),
            Self::Predicate { label, .. } => f
                .debug_struct("Predicate")
                .field("label", label)
                .finish_non_exhaustive(),
            Self::Desired(desired) => f.debug_tuple("Desired").field(desired).finish(),
        }
    }
}

impl StateSpec {
    /// Predicate state
    #[must_use]
    pub fn predicate<F>(condition: F, label: impl Into<String>) -> Self
    where
        F: Fn(&dyn WebElement) -> CoreResult<bool> + Send + Sync + 'static,
    {
        Self::Predicate {
            condition: Arc::new(condition),
            label: label.into(),
        }
    }

    /// Desired state for a plural search: named states and predicates
    /// catch the timeout, explicit desired states keep their flags
    #[must_use]
    pub fn for_elements(self) -> DesiredState {
        match self {
            Self::Named(state) => state.desired().with_catch_timeout(true),
            Self::Predicate { condition, label } => {
                DesiredState::from_condition(condition, label).with_catch_timeout(true)
            }
            Self::Desired(desired) => desired,
        }
    }

    /// Desired state for a singular search: never catches the timeout and
    /// always raises `NoSuchElement` when nothing was found
    #[must_use]
    pub fn for_element(self) -> DesiredState {
        let desired = match self {
            Self::Named(state) => state.desired(),
            Self::Predicate { condition, label } => DesiredState::from_condition(condition, label),
            Self::Desired(desired) => desired,
        };
        desired.with_catch_timeout(false).with_throw_not_found(true)
    }
}

impl From<ElementState> for StateSpec {
    fn from(state: ElementState) -> Self {
        Self::Named(state)
    }
}

impl From<DesiredState> for StateSpec {
    fn from(desired: DesiredState) -> Self {
        Self::Desired(desired)
    }
}
