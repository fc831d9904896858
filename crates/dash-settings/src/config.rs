//! Settings client configuration
//!
//! Declared defaults plus the snapshot the page was served with. Can be
//! built in code or loaded from a TOML or JSON document:
//!
//! ```toml
//! [defaults."dateFormat"]
//! value = "MMM D, YYYY"
//! type = "string"
//!
//! [defaults."timepicker:timeDefaults"]
//! value = '{ "from": "now-15m", "to": "now" }'
//! type = "json"
//!
//! [initial_settings."dateFormat:tz"]
//! userValue = "UTC"
//! ```

use crate::error::ConfigError;
use crate::types::{SettingDefinition, SettingsSnapshot, SnapshotEntry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Configuration for [`SettingsClient`](crate::SettingsClient)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Declared defaults by key
    pub defaults: IndexMap<String, SettingDefinition>,
    /// Snapshot the client starts from
    pub initial_settings: SettingsSnapshot,
}

impl SettingsConfig {
    /// Create empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With full definition for key
    #[must_use]
    pub fn with_definition(mut self, key: impl Into<String>, definition: SettingDefinition) -> Self {
        self.defaults.insert(key.into(), definition);
        self
    }

    /// With untyped default value for key
    #[must_use]
    pub fn with_default(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_definition(key, SettingDefinition::new(value))
    }

    /// With all definitions of a map
    #[must_use]
    pub fn with_defaults(mut self, defaults: IndexMap<String, SettingDefinition>) -> Self {
        self.defaults.extend(defaults);
        self
    }

    /// With initial snapshot entry for key
    #[must_use]
    pub fn with_initial_setting(mut self, key: impl Into<String>, entry: SnapshotEntry) -> Self {
        self.initial_settings.insert(key, entry);
        self
    }

    /// With initial snapshot
    #[must_use]
    pub fn with_initial_settings(mut self, snapshot: SettingsSnapshot) -> Self {
        self.initial_settings = snapshot;
        self
    }

    /// Parse TOML document
    ///
    /// # Errors
    /// - `ConfigError::Toml` if the document is malformed
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Parse JSON document
    ///
    /// # Errors
    /// - `ConfigError::Json` if the document is malformed
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load from file, format chosen by extension
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::UnsupportedFormat` for extensions other than `toml`/`json`
    /// - `ConfigError::Toml`/`ConfigError::Json` if the document is malformed
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let parse: fn(&str) -> Result<Self, ConfigError> =
            match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => Self::from_toml_str,
                Some("json") => Self::from_json_str,
                _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
            };

        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::io_error(path, e))?;

        let config = parse(&source)?;
        tracing::debug!(
            path = %path.display(),
            defaults = config.defaults.len(),
            initial = config.initial_settings.len(),
            "loaded settings config"
        );
        Ok(config)
    }
}
