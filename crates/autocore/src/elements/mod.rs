//! Element resolution and state engine
//!
//! ```text
//! Element ──► ElementActionRetrier ──► ElementCacheHandler (optional)
//!    │                                        │
//!    └──► ElementStateProvider ──► ElementFinder ──► ConditionalWait ──► WebDriver
//! ```

mod cache;
mod desired_state;
mod element;
mod factory;
mod finder;
mod state;

pub use cache::ElementCacheHandler;
pub use desired_state::{DesiredState, ElementState, StateCondition, StateSpec};
pub use element::{Element, ElementEnvironment};
pub use factory::{ElementFactory, ElementsCount};
pub use finder::ElementFinder;
pub use state::{ElementStateProvider, StateLogger};
