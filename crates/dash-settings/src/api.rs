//! Collaborators of the settings client
//!
//! - [`SettingsApi`]: the remote batch update endpoint
//! - [`Notifier`]: where failed saves are reported to the user

use crate::error::{ApiError, SettingsError};
use crate::types::SettingsSnapshot;
use async_trait::async_trait;
use serde_json::Value;

/// Remote settings endpoint
///
/// A write returns the full, authoritative settings snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsApi: Send + Sync {
    /// Store `value` for `key`; `None` clears the user override
    async fn batch_set(&self, key: &str, value: Option<Value>) -> Result<SettingsSnapshot, ApiError>;
}

/// Sink for errors the user should see
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Report an error
    fn error(&self, error: &SettingsError);
}

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, error: &SettingsError) {
        tracing::error!(key = error.key(), "{}", error);
    }
}
