//! Localized messages and logging.

mod logger;
mod manager;

pub use logger::LocalizedLogger;
pub use manager::{LocalizationManager, LOCALIZATION_FOLDER, SUPPORTED_LANGUAGES};
