//! Error types for the settings cache
//!
//! Two classes of failure:
//! - Programmer errors (unknown key without fallback, writing a
//!   server-locked key) surface immediately as `Err`
//! - Failed saves are reverted locally and reported to the
//!   [`Notifier`](crate::api::Notifier); the caller only sees `Ok(false)`

use crate::types::SettingType;
use std::path::PathBuf;

/// Errors raised by the settings transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Server answered with an error status
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error body
        message: String,
    },

    /// Request never got an answer
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Create status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

/// Settings cache errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    /// `get` on an undeclared key without fallback
    #[error("unexpected get(\"{0}\") call on unrecognized configuration setting \"{0}\"")]
    UnrecognizedSetting(String),

    /// Mutation of a key locked by the server
    #[error("unable to update \"{0}\" because its value is overridden by the server")]
    OverriddenSetting(String),

    /// Stored value does not decode as its declared type
    #[error("stored value for \"{key}\" is not valid {expected}: {value}")]
    InvalidStoredValue {
        /// Setting key
        key: String,
        /// Declared type
        expected: SettingType,
        /// Offending stored value
        value: String,
    },

    /// Server rejected or never answered a save
    #[error("failed to save setting \"{key}\": {source}")]
    Api {
        /// Setting key
        key: String,
        /// Transport failure
        #[source]
        source: ApiError,
    },
}

impl SettingsError {
    /// Create unrecognized setting error
    pub fn unrecognized(key: impl Into<String>) -> Self {
        Self::UnrecognizedSetting(key.into())
    }

    /// Create overridden setting error
    pub fn overridden(key: impl Into<String>) -> Self {
        Self::OverriddenSetting(key.into())
    }

    /// Create invalid stored value error
    pub fn invalid_stored_value(
        key: impl Into<String>,
        expected: SettingType,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidStoredValue {
            key: key.into(),
            expected,
            value: value.into(),
        }
    }

    /// Create save failure
    pub fn api(key: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            key: key.into(),
            source,
        }
    }

    /// Check if error is a caller mistake rather than a runtime condition
    #[inline]
    #[must_use]
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedSetting(_) | Self::OverriddenSetting(_)
        )
    }

    /// Check if calling again could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Key the error is about
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::UnrecognizedSetting(key) | Self::OverriddenSetting(key) => key,
            Self::InvalidStoredValue { key, .. } | Self::Api { key, .. } => key,
        }
    }
}

/// Errors while loading settings configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML document is malformed
    #[error("invalid toml: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON document is malformed
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the file failed
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File extension is neither `toml` nor `json`
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;
