//! Dashboard user settings cache
//!
//! Client-side mirror of user-overridable configuration, kept in sync with
//! the settings endpoint.
//!
//! # Core Operations
//!
//! - **Read**: `get`/`get_or` resolve override, fallback or declared default
//!   without touching the network
//! - **Write**: `set`/`remove` apply optimistically, broadcast, save, and
//!   revert on failure
//! - **Re-baseline**: `override_local_default` swaps a declared default locally
//! - **Observe**: `subscribe` for every local change, `subscribe_saved` for
//!   server-confirmed ones
//!
//! # Architecture
//!
//! ```text
//! SettingsConfig ──> SettingsClient ──batch_set──> SettingsApi (server)
//!                       │    ^                         │
//!                       │    └──── rebase on snapshot ─┘
//!                       ├──> observers (SettingChange)
//!                       └──> Notifier (failed saves)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use dash_settings::{SettingsClient, SettingsConfig, TracingNotifier};
//! use std::sync::Arc;
//!
//! # async fn example(api: Arc<dyn dash_settings::SettingsApi>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SettingsConfig::from_path("settings.toml").await?;
//! let client = SettingsClient::new(config, api, Arc::new(TracingNotifier));
//!
//! let _sub = client.subscribe(|change| println!("{} -> {}", change.key, change.new_value));
//! if !client.set("dateFormat", "YYYY-MM-DD").await? {
//!     // reverted; the notifier already told the user
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod observer;
pub mod types;

pub use api::{Notifier, SettingsApi, TracingNotifier};
pub use client::SettingsClient;
pub use config::SettingsConfig;
pub use error::{ApiError, ConfigError, SettingsError, SettingsResult};
pub use observer::{Observer, Subscription};
pub use types::{
    SettingChange, SettingDefinition, SettingEntry, SettingState, SettingType, SettingsSnapshot,
    SnapshotEntry,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the settings cache
    pub use crate::api::{Notifier, SettingsApi};
    pub use crate::client::SettingsClient;
    pub use crate::config::SettingsConfig;
    pub use crate::error::{ApiError, SettingsError};
    pub use crate::types::{SettingChange, SettingDefinition, SettingType, SettingsSnapshot};
}
