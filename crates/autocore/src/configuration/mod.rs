//! Settings and typed configuration sections.
//!
//! Settings come from `resources/settings[.{profile}].json` (or the embedded
//! defaults) and every key can be overridden from the environment. Typed
//! sections are read once and shared read-only.

mod sections;
mod settings;

pub use sections::{
    ElementCacheConfiguration, LoggerConfiguration, RetryConfiguration, TimeoutConfiguration,
};
pub use settings::{
    environment_variable, settings_file_name, JsonSettings, PROFILE_VARIABLE, RESOURCE_FOLDER,
};
