//! Browser settings.
//!
//! A `Settings` value is handed to components when they are built. Changing
//! configuration means loading a new value and building new components.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tool::{runner::DEFAULT_TIMEOUT_SECS, CatalogQuery};

/// Language listed when none is configured.
pub const DEFAULT_LANGUAGE: &str = "cpp";

/// Upper bound for a single tool invocation.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// `<config dir>/samplebrowser/settings.json`, if the platform has a
/// config directory.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("samplebrowser").join("settings.json"))
}

// =============================================================================
// Settings
// =============================================================================

/// Browser settings, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Explicit `oneapi-cli` executable. Skips every other lookup.
    pub cli_path: Option<PathBuf>,

    /// Overrides the catalog location the tool reads from.
    pub base_url: Option<String>,

    /// Languages shown, in display order.
    pub languages: Vec<String>,

    /// Create samples without asking the tool about their dependencies.
    pub skip_dependency_checks: bool,

    /// List samples for every OS.
    pub ignore_os_filter: bool,

    /// Timeout for one tool invocation.
    pub process_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cli_path: None,
            base_url: None,
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            skip_dependency_checks: false,
            ignore_os_filter: false,
            process_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// A missing or unparseable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read settings, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&json) {
            Ok(mut settings) => {
                settings.validate();
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse settings, using defaults");
                Self::default()
            }
        }
    }

    /// Writes settings to `path` as pretty JSON.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Normalizes fields to usable values.
    pub fn validate(&mut self) {
        let mut languages: Vec<String> = Vec::with_capacity(self.languages.len());
        for language in self.languages.iter().map(|l| l.trim()) {
            if !language.is_empty() && !languages.iter().any(|l| l == language) {
                languages.push(language.to_string());
            }
        }
        if languages.is_empty() {
            languages.push(DEFAULT_LANGUAGE.to_string());
        }
        self.languages = languages;

        if self
            .cli_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().to_string_lossy().trim().is_empty())
        {
            self.cli_path = None;
        }

        self.base_url = self
            .base_url
            .take()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        self.process_timeout_secs = self.process_timeout_secs.clamp(1, MAX_TIMEOUT_SECS);
    }

    /// Listing options derived from these settings.
    pub fn catalog_query(&self) -> CatalogQuery {
        CatalogQuery {
            base_url: self.base_url.clone(),
            ignore_os: self.ignore_os_filter,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.cli_path.is_none());
        assert!(settings.base_url.is_none());
        assert_eq!(settings.languages, vec!["cpp".to_string()]);
        assert!(!settings.skip_dependency_checks);
        assert!(!settings.ignore_os_filter);
        assert_eq!(settings.process_timeout_secs, 120);
    }

    #[test]
    fn test_settings_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        let original = Settings {
            cli_path: Some(PathBuf::from("/opt/intel/oneapi-cli")),
            base_url: Some("https://samples.example.com".to_string()),
            languages: vec!["python".to_string(), "cpp".to_string()],
            skip_dependency_checks: true,
            ignore_os_filter: true,
            process_timeout_secs: 30,
        };
        original.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), original);
    }

    #[test]
    fn test_settings_load_returns_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp_dir.path().join("absent.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_load_returns_defaults_on_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "not valid json {{").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_settings_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{"ignore_os_filter": true}"#).unwrap();

        let settings = Settings::load_from(&path);
        assert!(settings.ignore_os_filter);
        assert_eq!(settings.languages, vec!["cpp".to_string()]);
        assert_eq!(settings.process_timeout_secs, 120);
    }

    #[test]
    fn test_settings_validate_languages() {
        let mut settings = Settings {
            languages: vec![
                " python ".to_string(),
                "cpp".to_string(),
                "".to_string(),
                "python".to_string(),
            ],
            ..Settings::default()
        };
        settings.validate();
        assert_eq!(settings.languages, vec!["python".to_string(), "cpp".to_string()]);

        settings.languages = vec!["  ".to_string()];
        settings.validate();
        assert_eq!(settings.languages, vec!["cpp".to_string()]);
    }

    #[test]
    fn test_settings_validate_clears_blank_strings() {
        let mut settings = Settings {
            cli_path: Some(PathBuf::from("  ")),
            base_url: Some("   ".to_string()),
            ..Settings::default()
        };
        settings.validate();
        assert!(settings.cli_path.is_none());
        assert!(settings.base_url.is_none());

        settings.base_url = Some(" https://example.com ".to_string());
        settings.validate();
        assert_eq!(settings.base_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_settings_validate_clamps_timeout() {
        let mut settings = Settings::default();

        settings.process_timeout_secs = 0;
        settings.validate();
        assert_eq!(settings.process_timeout_secs, 1);

        settings.process_timeout_secs = 100_000;
        settings.validate();
        assert_eq!(settings.process_timeout_secs, MAX_TIMEOUT_SECS);
    }

    #[test]
    fn test_catalog_query() {
        let settings = Settings {
            base_url: Some("https://example.com".to_string()),
            ignore_os_filter: true,
            ..Settings::default()
        };
        let query = settings.catalog_query();
        assert_eq!(query.base_url.as_deref(), Some("https://example.com"));
        assert!(query.ignore_os);
    }

    #[test]
    fn test_default_settings_path_file_name() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("samplebrowser/settings.json"));
        }
    }
}
