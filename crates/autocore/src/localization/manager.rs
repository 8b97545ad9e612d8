//! Localized message dictionaries.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;

use crate::configuration::{LoggerConfiguration, RESOURCE_FOLDER};
use crate::result::{CoreError, CoreResult};

const EN: &str = include_str!("../../resources/localization/en.json");
const RU: &str = include_str!("../../resources/localization/ru.json");

/// Folder (under the resource folder) that holds caller dictionaries
pub const LOCALIZATION_FOLDER: &str = "localization";

/// Languages shipped with the crate
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "ru"];

type Dictionary = HashMap<String, String>;

/// Resolves message keys to localized, formatted text
///
/// A caller dictionary, when present, is consulted before the embedded one.
#[derive(Debug, Clone)]
pub struct LocalizationManager {
    language: String,
    core: Dictionary,
    custom: Dictionary,
    placeholder: Regex,
}

impl LocalizationManager {
    /// Create a manager for `language` with an optional caller dictionary
    ///
    /// Region suffixes are ignored, so `en_US.UTF-8` selects `en`.
    pub fn new(language: &str, custom: Option<HashMap<String, String>>) -> CoreResult<Self> {
        let language = normalize_language(language);
        let core_text = match language.as_str() {
            "en" => EN,
            "ru" => RU,
            other => {
                return Err(CoreError::configuration(format!(
                    "Localization for language '{other}' is not supported \
                     (expected one of {SUPPORTED_LANGUAGES:?})"
                )));
            }
        };
        let placeholder = Regex::new(r"\{(\d*)\}")
            .map_err(|e| CoreError::configuration(format!("Invalid placeholder pattern: {e}")))?;
        Ok(Self {
            language,
            core: serde_json::from_str(core_text)?,
            custom: custom.unwrap_or_default(),
            placeholder,
        })
    }

    /// Create a manager from the logger configuration
    pub fn from_configuration(configuration: &LoggerConfiguration) -> CoreResult<Self> {
        Self::new(&configuration.language, None)
    }

    /// Create a manager, reading `resources/localization/{language}.json`
    /// under `root` as the caller dictionary when it exists
    pub fn load(configuration: &LoggerConfiguration, root: impl AsRef<Path>) -> CoreResult<Self> {
        let language = normalize_language(&configuration.language);
        let path = root
            .as_ref()
            .join(RESOURCE_FOLDER)
            .join(LOCALIZATION_FOLDER)
            .join(format!("{language}.json"));
        let custom = if path.exists() {
            tracing::debug!(path = %path.display(), "Loading localization dictionary");
            Some(serde_json::from_str(&std::fs::read_to_string(&path)?)?)
        } else {
            None
        };
        Self::new(&language, custom)
    }

    /// Selected language
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Localized message for `key` with `{}` / `{N}` placeholders filled
    ///
    /// Unknown keys are returned as-is.
    #[must_use]
    pub fn get_localized_message(&self, key: &str, args: &[&str]) -> String {
        match self.custom.get(key).or_else(|| self.core.get(key)) {
            Some(template) => self.format(template, args),
            None => {
                tracing::debug!(key, "Cannot find localized message by key");
                key.to_string()
            }
        }
    }

    fn format(&self, template: &str, args: &[&str]) -> String {
        let mut next = 0;
        self.placeholder
            .replace_all(template, |caps: &Captures<'_>| {
                let index = match caps[1].parse::<usize>() {
                    Ok(index) => index,
                    Err(_) => {
                        next += 1;
                        next - 1
                    }
                };
                args.get(index)
                    .map_or_else(|| caps[0].to_string(), |arg| (*arg).to_string())
            })
            .into_owned()
    }
}

fn normalize_language(language: &str) -> String {
    language
        .split(['_', '-', '.', ':'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
