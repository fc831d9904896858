//! Setting types
//!
//! Every declared key maps to a [`SettingEntry`]: the declared default, the
//! value type and an explicit [`SettingState`]. The server speaks
//! [`SettingsSnapshot`], a camelCase JSON map of `{ userValue, isOverridden }`
//! records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Value type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    /// Plain string
    String,
    /// Floating point number, may be stored as a string
    Number,
    /// Boolean flag
    Boolean,
    /// Arbitrary JSON, stored as a JSON-encoded string
    Json,
    /// Markdown text
    Markdown,
    /// One of a fixed set of options
    Select,
    /// List of strings
    Array,
    /// Image data URL
    Image,
}

impl SettingType {
    /// Lowercase name as used on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Select => "select",
            Self::Array => "array",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared default and metadata for one key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingDefinition {
    /// Declared default value
    pub value: Option<Value>,
    /// Value type
    #[serde(rename = "type")]
    pub value_type: Option<SettingType>,
    /// Human readable name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Categories used for grouping
    pub category: Vec<String>,
    /// A change only takes effect after reloading the page
    pub requires_page_reload: bool,
    /// Not editable from the settings screen
    pub readonly: bool,
    /// Allowed values for `select` settings
    pub options: Vec<Value>,
}

impl SettingDefinition {
    /// Create definition with a default value
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// With value type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, value_type: SettingType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// With human readable name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With page reload requirement
    #[inline]
    #[must_use]
    pub fn requiring_page_reload(mut self) -> Self {
        self.requires_page_reload = true;
        self
    }
}

/// Which layer currently provides a setting's value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SettingState {
    /// No override, the declared default applies
    #[default]
    Default,
    /// The user stored a value
    UserOverridden(Value),
    /// The server locked the value; clients cannot change it
    ServerOverridden(Option<Value>),
}

/// Cached state of one declared key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingEntry {
    /// Declared default, `None` for custom settings
    pub declared_default: Option<Value>,
    /// Value type, if declared
    pub value_type: Option<SettingType>,
    /// Current state
    pub state: SettingState,
}

impl SettingEntry {
    /// Create entry from a definition
    #[must_use]
    pub fn declared(definition: &SettingDefinition) -> Self {
        Self {
            declared_default: definition.value.clone(),
            value_type: definition.value_type,
            state: SettingState::Default,
        }
    }

    /// Stored override, from the user or the server
    #[must_use]
    pub fn user_value(&self) -> Option<&Value> {
        match &self.state {
            SettingState::Default => None,
            SettingState::UserOverridden(value) => Some(value),
            SettingState::ServerOverridden(value) => value.as_ref(),
        }
    }

    /// No override shadows the default
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.user_value().is_none()
    }

    /// Locked by the server
    #[inline]
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        matches!(self.state, SettingState::ServerOverridden(_))
    }

    /// Stored value backing the effective value
    #[must_use]
    pub fn raw_value(&self) -> Option<&Value> {
        self.user_value().or(self.declared_default.as_ref())
    }

    /// Replace the user override; `None` clears it
    pub(crate) fn set_user_value(&mut self, value: Option<Value>) {
        self.state = match value {
            Some(value) => SettingState::UserOverridden(value),
            None => SettingState::Default,
        };
    }
}

/// One key of a server snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotEntry {
    /// Stored override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_value: Option<Value>,
    /// Locked by the server
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_overridden: bool,
    /// Default known to the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Type known to the server
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<SettingType>,
}

impl SnapshotEntry {
    /// Entry carrying a user value
    #[must_use]
    pub fn user(value: impl Into<Value>) -> Self {
        Self {
            user_value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Entry locked by the server
    #[must_use]
    pub fn overridden(value: impl Into<Value>) -> Self {
        Self {
            user_value: Some(value.into()),
            is_overridden: true,
            ..Self::default()
        }
    }

    /// State this entry puts a cached key in
    #[must_use]
    pub fn state(&self) -> SettingState {
        let user_value = self.user_value.clone().filter(|v| !v.is_null());
        match (self.is_overridden, user_value) {
            (true, value) => SettingState::ServerOverridden(value),
            (false, Some(value)) => SettingState::UserOverridden(value),
            (false, None) => SettingState::Default,
        }
    }
}

/// Authoritative settings as returned by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsSnapshot(pub IndexMap<String, SnapshotEntry>);

impl SettingsSnapshot {
    /// Create empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With entry for key
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, entry: SnapshotEntry) -> Self {
        self.0.insert(key.into(), entry);
        self
    }

    /// Insert or replace entry
    pub fn insert(&mut self, key: impl Into<String>, entry: SnapshotEntry) {
        self.0.insert(key.into(), entry);
    }

    /// Get entry for key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SnapshotEntry> {
        self.0.get(key)
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SnapshotEntry)> {
        self.0.iter()
    }

    /// Get number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if snapshot is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Broadcast payload for a value change
#[derive(Debug, Clone, PartialEq)]
pub struct SettingChange {
    /// Changed key
    pub key: String,
    /// Effective value after the change (`Null` when none)
    pub new_value: Value,
    /// Effective value before the change (`Null` when none)
    pub old_value: Value,
}
