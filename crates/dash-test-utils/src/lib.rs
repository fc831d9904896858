//! Testing utilities for the dashboard client workspace
//!
//! Shared fakes, fixtures, and tracing setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use dash_menu::{ActionContext, ContextMenuPanel, DeclaredAction, SharedAction};
use dash_settings::{
    ApiError, Notifier, SettingChange, SettingDefinition, SettingType, SettingsApi,
    SettingsClient, SettingsConfig, SettingsError, SettingsSnapshot, SnapshotEntry, Subscription,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

// Settings fakes

#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub key: String,
    pub value: Option<Value>,
}

/// Server fake keeping its own settings store
///
/// Failures and per-call delays are scripted in call order.
#[derive(Debug, Default)]
pub struct InMemorySettingsApi {
    store: Mutex<SettingsSnapshot>,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<VecDeque<Option<ApiError>>>,
    delays: Mutex<VecDeque<Duration>>,
}

impl InMemorySettingsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: SettingsSnapshot) -> Self {
        Self {
            store: Mutex::new(store),
            ..Self::default()
        }
    }

    /// Next call fails with `error`
    pub fn fail_next(&self, error: ApiError) {
        self.failures.lock().push_back(Some(error));
    }

    /// Next call succeeds (used to order scripted failures)
    pub fn succeed_next(&self) {
        self.failures.lock().push_back(None);
    }

    /// Next call waits `delay` before answering
    pub fn delay_next(&self, delay: Duration) {
        self.delays.lock().push_back(delay);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn stored(&self, key: &str) -> Option<SnapshotEntry> {
        self.store.lock().get(key).cloned()
    }
}

#[async_trait]
impl SettingsApi for InMemorySettingsApi {
    async fn batch_set(&self, key: &str, value: Option<Value>) -> Result<SettingsSnapshot, ApiError> {
        self.calls.lock().push(ApiCall {
            key: key.to_string(),
            value: value.clone(),
        });
        let delay = self.delays.lock().pop_front();
        let failure = self.failures.lock().pop_front().flatten();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let mut store = self.store.lock();
        match value {
            Some(value) => store.insert(key, SnapshotEntry::user(value)),
            None => {
                store.0.shift_remove(key);
            }
        }
        Ok(store.clone())
    }
}

/// Notifier keeping every reported error
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    errors: Mutex<Vec<SettingsError>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<SettingsError> {
        self.errors.lock().clone()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, error: &SettingsError) {
        self.errors.lock().push(error.clone());
    }
}

/// Collects broadcast changes
#[derive(Debug, Clone, Default)]
pub struct ChangeRecorder {
    changes: Arc<Mutex<Vec<SettingChange>>>,
}

impl ChangeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every local change of `client`
    pub fn attach(&self, client: &SettingsClient) -> Subscription {
        let changes = Arc::clone(&self.changes);
        client.subscribe(move |change| changes.lock().push(change.clone()))
    }

    /// Subscribe to confirmed changes of `client`
    pub fn attach_saved(&self, client: &SettingsClient) -> Subscription {
        let changes = Arc::clone(&self.changes);
        client.subscribe_saved(move |change| changes.lock().push(change.clone()))
    }

    pub fn changes(&self) -> Vec<SettingChange> {
        self.changes.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.changes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.lock().is_empty()
    }
}

/// Declared defaults resembling a dashboard's advanced settings
pub fn sample_config() -> SettingsConfig {
    SettingsConfig::new()
        .with_definition(
            "dateFormat",
            SettingDefinition::new("MMM D, YYYY, HH:mm:ss.SSS")
                .with_type(SettingType::String)
                .with_name("Date format"),
        )
        .with_definition(
            "dateFormat:tz",
            SettingDefinition::new("Browser").with_type(SettingType::Select),
        )
        .with_definition(
            "discover:sampleSize",
            SettingDefinition::new(500).with_type(SettingType::Number),
        )
        .with_definition(
            "timepicker:timeDefaults",
            SettingDefinition::new(r#"{"from":"now-15m","to":"now"}"#).with_type(SettingType::Json),
        )
        .with_definition(
            "theme:darkMode",
            SettingDefinition::new(false)
                .with_type(SettingType::Boolean)
                .requiring_page_reload(),
        )
        .with_initial_setting("theme:darkMode", SnapshotEntry::overridden(true))
}

/// Client over fresh fakes and [`sample_config`]
pub fn sample_client() -> (SettingsClient, Arc<InMemorySettingsApi>, Arc<RecordingNotifier>) {
    let api = Arc::new(InMemorySettingsApi::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let client = SettingsClient::new(sample_config(), api.clone(), notifier.clone());
    (client, api, notifier)
}

// Menu fixtures

pub type TestContext = ActionContext<String, bool>;

pub fn test_context() -> Arc<TestContext> {
    Arc::new(ActionContext::with_target("panel-1".to_string(), true))
}

pub fn test_panel(id: &str) -> ContextMenuPanel<String, bool> {
    ContextMenuPanel::new(id, format!("{id} options"))
}

/// Plain visible action
pub fn create_action(id: &str, parent: &str) -> SharedAction<String, bool> {
    DeclaredAction::new(id, parent, id).into_shared()
}

/// Action opening `child`
pub fn create_submenu_action(id: &str, parent: &str, child: &str) -> SharedAction<String, bool> {
    DeclaredAction::new(id, parent, id)
        .with_child_panel(test_panel(child))
        .into_shared()
}

/// Action hidden in every context
pub fn create_hidden_action(id: &str, parent: &str, child: Option<&str>) -> SharedAction<String, bool> {
    let action = DeclaredAction::new(id, parent, id).with_visibility(|_: &TestContext| false);
    match child {
        Some(child) => action.with_child_panel(test_panel(child)).into_shared(),
        None => action.into_shared(),
    }
}

/// Action counting its clicks
pub fn create_counting_action(id: &str, parent: &str) -> (SharedAction<String, bool>, Arc<AtomicUsize>) {
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&clicks);
    let action = DeclaredAction::new(id, parent, id)
        .with_click(move |_: &TestContext| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .into_shared();
    (action, clicks)
}
