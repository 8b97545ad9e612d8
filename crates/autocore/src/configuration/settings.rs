//! JSON settings document with environment-variable overrides.
//!
//! Any key can be overridden by an environment variable of the same name
//! (exact, lower-case or upper-case spelling, checked in that order). The
//! override is parsed as a JSON scalar when possible, so `false`, `2` and
//! `0.5` keep their types; anything else is taken as a plain string.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::result::{CoreError, CoreResult};

/// Default settings shipped with the crate
const DEFAULT_SETTINGS: &str = include_str!("../../resources/settings.json");

/// Folder (under a root path) that holds settings files
pub const RESOURCE_FOLDER: &str = "resources";

/// Environment variable selecting the settings profile
pub const PROFILE_VARIABLE: &str = "profile";

/// Read an environment variable by exact, lower-case or upper-case name
#[must_use]
pub fn environment_variable(key: &str) -> Option<String> {
    [key.to_string(), key.to_lowercase(), key.to_uppercase()]
        .iter()
        .find_map(|name| std::env::var(name).ok())
}

/// Settings file name for a profile: `settings.json` or `settings.{profile}.json`
#[must_use]
pub fn settings_file_name(profile: Option<&str>) -> String {
    match profile.filter(|p| !p.is_empty()) {
        Some(profile) => format!("settings.{profile}.json"),
        None => "settings.json".to_string(),
    }
}

/// A JSON settings document
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSettings {
    root: Value,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }
}

impl JsonSettings {
    /// Wrap a JSON value
    #[must_use]
    pub const fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse settings from JSON text
    pub fn parse(json: &str) -> CoreResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Read settings from a file
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CoreError::configuration(format!(
                "There are not existing files by path '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&text)
    }

    /// Settings shipped with the crate
    pub fn embedded_defaults() -> CoreResult<Self> {
        Self::parse(DEFAULT_SETTINGS)
    }

    /// Load settings for the profile named by the `profile` environment variable
    pub fn load(root: impl AsRef<Path>) -> CoreResult<Self> {
        let profile = environment_variable(PROFILE_VARIABLE);
        Self::load_profile(root, profile.as_deref())
    }

    /// Load `resources/settings[.profile].json` under `root`
    ///
    /// Falls back to the embedded defaults when the file does not exist.
    pub fn load_profile(root: impl AsRef<Path>, profile: Option<&str>) -> CoreResult<Self> {
        let path = Self::resource_path(root.as_ref(), &settings_file_name(profile));
        tracing::debug!(path = %path.display(), "Get settings from file");
        if path.exists() {
            Self::from_file(&path)
        } else {
            tracing::debug!(path = %path.display(), "Settings file not found, using defaults");
            Self::embedded_defaults()
        }
    }

    fn resource_path(root: &Path, file_name: &str) -> PathBuf {
        root.join(RESOURCE_FOLDER).join(file_name)
    }

    /// Nested section; empty when missing
    #[must_use]
    pub fn node(&self, name: &str) -> Self {
        self.root
            .get(name)
            .cloned()
            .map_or_else(Self::default, Self::new)
    }

    /// Raw value, environment override first
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(raw) = environment_variable(key) {
            return Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)));
        }
        self.root.get(key).cloned()
    }

    /// Typed value, `None` when missing
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> CoreResult<Option<T>> {
        self.get(key)
            .map(|value| {
                serde_json::from_value(value).map_err(|e| {
                    CoreError::configuration(format!("Setting '{key}' has unexpected type: {e}"))
                })
            })
            .transpose()
    }

    /// Typed value with a default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> CoreResult<T> {
        Ok(self.get_as(key)?.unwrap_or(default))
    }

    /// Duration stored as (fractional) seconds
    pub fn get_seconds(&self, key: &str, default: Duration) -> CoreResult<Duration> {
        match self.get_as::<f64>(key)? {
            Some(seconds) => Duration::try_from_secs_f64(seconds).map_err(|e| {
                CoreError::configuration(format!("Setting '{key}' is not a valid duration: {e}"))
            }),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_node_and_typed_get() {
            let settings =
                JsonSettings::new(json!({"retry": {"number": 3, "pollingInterval": 0.5}}));
            let retry = settings.node("retry");
            assert_eq!(retry.get_as::<u32>("number").unwrap(), Some(3));
            assert_eq!(
                retry.get_seconds("pollingInterval", Duration::ZERO).unwrap(),
                Duration::from_millis(500)
            );
        }

        #[test]
        fn test_missing_node_is_empty() {
            let settings = JsonSettings::default();
            let node = settings.node("nothing");
            assert_eq!(node.get_as::<bool>("isEnabled").unwrap(), None);
            assert!(node.get_or("isEnabled", true).unwrap());
        }

        #[test]
        fn test_wrong_type_is_configuration_error() {
            let settings = JsonSettings::new(json!({"number": "many"}));
            let err = settings.get_as::<u32>("number").unwrap_err();
            assert!(err.is(crate::result::ErrorKind::Configuration));
        }

        #[test]
        fn test_negative_seconds_rejected() {
            let settings = JsonSettings::new(json!({"timeoutCondition": -1.0}));
            assert!(settings
                .get_seconds("timeoutCondition", Duration::ZERO)
                .is_err());
        }
    }

    mod environment_tests {
        use super::*;

        #[test]
        fn test_environment_overrides_json() {
            std::env::set_var("autocoreSettingsOverrideProbe", "7");
            let settings = JsonSettings::new(json!({"autocoreSettingsOverrideProbe": 1}));
            assert_eq!(
                settings.get_as::<u32>("autocoreSettingsOverrideProbe").unwrap(),
                Some(7)
            );
            std::env::remove_var("autocoreSettingsOverrideProbe");
        }

        #[test]
        fn test_environment_upper_case_spelling() {
            std::env::set_var("AUTOCORESETTINGSUPPERPROBE", "false");
            let settings = JsonSettings::new(json!({"autocoreSettingsUpperProbe": true}));
            assert_eq!(
                settings.get_as::<bool>("autocoreSettingsUpperProbe").unwrap(),
                Some(false)
            );
            std::env::remove_var("AUTOCORESETTINGSUPPERPROBE");
        }

        #[test]
        fn test_environment_plain_string() {
            std::env::set_var("autocoreSettingsLanguageProbe", "ru");
            let settings = JsonSettings::default();
            assert_eq!(
                settings
                    .get_as::<String>("autocoreSettingsLanguageProbe")
                    .unwrap()
                    .as_deref(),
                Some("ru")
            );
            std::env::remove_var("autocoreSettingsLanguageProbe");
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_settings_file_name() {
            assert_eq!(settings_file_name(None), "settings.json");
            assert_eq!(settings_file_name(Some("")), "settings.json");
            assert_eq!(settings_file_name(Some("custom")), "settings.custom.json");
        }

        #[test]
        fn test_load_profile_reads_resource_file() {
            let dir = tempfile::tempdir().unwrap();
            fs::create_dir(dir.path().join(RESOURCE_FOLDER)).unwrap();
            fs::write(
                dir.path().join(RESOURCE_FOLDER).join("settings.custom.json"),
                r#"{"retry": {"number": 5}}"#,
            )
            .unwrap();

            let settings = JsonSettings::load_profile(dir.path(), Some("custom")).unwrap();
            assert_eq!(settings.node("retry").get_as::<u32>("number").unwrap(), Some(5));
        }

        #[test]
        fn test_load_profile_falls_back_to_defaults() {
            let dir = tempfile::tempdir().unwrap();
            let settings = JsonSettings::load_profile(dir.path(), None).unwrap();
            assert_eq!(settings, JsonSettings::embedded_defaults().unwrap());
        }

        #[test]
        fn test_from_file_missing_is_configuration_error() {
            let err = JsonSettings::from_file("/nonexistent/settings.json").unwrap_err();
            assert!(err.to_string().contains("There are not existing files"));
        }

        #[test]
        fn test_invalid_json_is_json_error() {
            let err = JsonSettings::parse("{not json").unwrap_err();
            assert!(err.is(crate::result::ErrorKind::Json));
        }
    }
}
