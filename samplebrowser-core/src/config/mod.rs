//! Configuration for the sample browser.
//!
//! Settings are stored as JSON in the user's config directory.

mod settings;

pub use settings::{default_settings_path, Settings, DEFAULT_LANGUAGE, MAX_TIMEOUT_SECS};
