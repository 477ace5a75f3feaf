//! Configuration loading for the roster client.
//!
//! Configuration is loaded from a TOML file (default: `roster.toml`). Every
//! field has a default, so an empty file or a missing section is valid.

use chrono::format::{Item, StrftimeItems};
use chrono::{FixedOffset, Local, Offset};
use roster_core::{ViewOptions, DEFAULT_AVATAR_URL, DEFAULT_DATE_FORMAT, PREVIEW_CHARS};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration for the roster client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Backend configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Presentation configuration.
    #[serde(default)]
    pub view: ViewConfig,
}

/// Backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the chat backend (default: http://localhost:5001).
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Presentation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewConfig {
    /// Maximum preview length in characters (default: 50).
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// strftime format for messages older than a week (default: %-m/%-d/%Y).
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Avatar shown for contacts without one.
    #[serde(default = "default_avatar_url")]
    pub default_avatar_url: String,
    /// Offset in minutes east of UTC for calendar dates (default: the
    /// machine's local offset).
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_preview_chars() -> usize {
    PREVIEW_CHARS
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_avatar_url() -> String {
    DEFAULT_AVATAR_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            date_format: default_date_format(),
            default_avatar_url: default_avatar_url(),
            utc_offset_minutes: None,
        }
    }
}

impl ViewConfig {
    /// Options for view derivation.
    pub fn to_options(&self) -> ViewOptions {
        ViewOptions {
            preview_chars: self.preview_chars,
            date_format: self.date_format.clone(),
            default_avatar_url: self.default_avatar_url.clone(),
            utc_offset: self.utc_offset(),
        }
    }

    /// The configured offset, or the local one if unset or out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(offset_from_minutes)
            .unwrap_or_else(|| Local::now().offset().fix())
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

impl RosterConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// [`validate`](Self::validate).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override the backend base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api.base_url = base_url.to_string();
        self
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.api.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must start with http:// or https://, got {:?}",
                base_url
            )));
        }
        if self.view.preview_chars == 0 {
            return Err(ConfigError::Invalid(
                "view.preview_chars must be at least 1".into(),
            ));
        }
        if StrftimeItems::new(&self.view.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid(format!(
                "view.date_format is not a valid strftime format: {:?}",
                self.view.date_format
            )));
        }
        if let Some(minutes) = self.view.utc_offset_minutes {
            if offset_from_minutes(minutes).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "view.utc_offset_minutes must be within a day of UTC, got {}",
                    minutes
                )));
            }
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },

    /// A value parsed but is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = RosterConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5001");
        assert_eq!(config.view.preview_chars, 50);
        assert_eq!(config.view.date_format, "%-m/%-d/%Y");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[api]
base_url = "https://chat.example.com"

[view]
preview_chars = 30
date_format = "%Y-%m-%d"
"#;
        let config: RosterConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://chat.example.com");
        assert_eq!(config.view.preview_chars, 30);
        assert_eq!(config.view.date_format, "%Y-%m-%d");
        assert_eq!(config.view.default_avatar_url, DEFAULT_AVATAR_URL);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: RosterConfig = toml::from_str("").unwrap();
        assert_eq!(config, RosterConfig::default());
    }

    #[test]
    fn to_options_carries_view_fields() {
        let config: RosterConfig = toml::from_str("[view]\npreview_chars = 10\n").unwrap();
        let options = config.view.to_options();
        assert_eq!(options.preview_chars, 10);
        assert_eq!(options.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn utc_offset_from_config() {
        let config: RosterConfig = toml::from_str("[view]\nutc_offset_minutes = -300\n").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.view.to_options().utc_offset,
            FixedOffset::west_opt(5 * 3600).unwrap()
        );
    }

    #[test]
    fn utc_offset_defaults_to_local() {
        let config = RosterConfig::default();
        assert_eq!(config.view.utc_offset_minutes, None);
        assert_eq!(
            config.view.to_options().utc_offset,
            Local::now().offset().fix()
        );
    }

    #[test]
    fn rejects_offset_beyond_a_day() {
        let config: RosterConfig = toml::from_str("[view]\nutc_offset_minutes = 1440\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = RosterConfig::default().with_base_url("localhost:5001");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_preview() {
        let config: RosterConfig = toml::from_str("[view]\npreview_chars = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_date_format() {
        let config: RosterConfig = toml::from_str("[view]\ndate_format = \"%Q\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn from_file_reads_and_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"http://10.0.0.2:5001\"").unwrap();

        let config = RosterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2:5001");
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RosterConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn from_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[view]\npreview_chars = \"lots\"").unwrap();

        let err = RosterConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
