//! Settings client
//!
//! Caches every declared setting locally and keeps it in sync with the
//! server:
//! - Reads never touch the network
//! - Writes apply optimistically, broadcast, then call the server
//! - A successful write rebases the whole cache on the returned snapshot
//! - A failed write reverts the key, broadcasts again and reports to the
//!   [`Notifier`]
//!
//! # Concurrency
//!
//! The cache lives behind a mutex that is never held across the network
//! call or while observers run. Overlapping writes to the same key are not
//! serialized: each applies and broadcasts immediately, and whichever
//! response arrives last decides the rebased state.
//!
//! Rebasing is silent. Keys whose effective value changes only because the
//! server snapshot differs from the cache are not broadcast. A failed write
//! does not revert a key the server locked in the meantime.

use crate::api::{Notifier, SettingsApi};
use crate::config::SettingsConfig;
use crate::error::SettingsError;
use crate::observer::{Observer, ObserverList, Subscription};
use crate::types::{
    SettingChange, SettingDefinition, SettingEntry, SettingType, SettingsSnapshot,
};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Local mirror of the user's settings
pub struct SettingsClient {
    state: Mutex<CacheState>,
    api: Arc<dyn SettingsApi>,
    notifier: Arc<dyn Notifier>,
    updates: Arc<ObserverList>,
    saved: Arc<ObserverList>,
}

#[derive(Debug, Default)]
struct CacheState {
    defaults: IndexMap<String, SettingDefinition>,
    cache: IndexMap<String, SettingEntry>,
}

impl SettingsClient {
    /// Create client from declared defaults and the initial snapshot
    #[must_use]
    pub fn new(
        config: SettingsConfig,
        api: Arc<dyn SettingsApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = merge(&config.defaults, &config.initial_settings);
        tracing::debug!(
            declared = cache.len(),
            defaults = config.defaults.len(),
            "settings client initialized"
        );
        Self {
            state: Mutex::new(CacheState {
                defaults: config.defaults,
                cache,
            }),
            api,
            notifier,
            updates: Arc::new(ObserverList::default()),
            saved: Arc::new(ObserverList::default()),
        }
    }

    /// Effective value of a declared key
    ///
    /// # Errors
    /// - `SettingsError::UnrecognizedSetting` if the key is not declared
    /// - `SettingsError::InvalidStoredValue` if a json/number value does not decode
    pub fn get(&self, key: &str) -> Result<Value, SettingsError> {
        self.read(key, None)
    }

    /// Effective value, or `fallback` when the key is undeclared or has no override
    ///
    /// # Errors
    /// - `SettingsError::InvalidStoredValue` if a json/number override does not decode
    pub fn get_or(&self, key: &str, fallback: impl Into<Value>) -> Result<Value, SettingsError> {
        self.read(key, Some(fallback.into()))
    }

    /// Effective value deserialized into `T`
    ///
    /// # Errors
    /// - Same as [`SettingsClient::get`]
    /// - `SettingsError::InvalidStoredValue` if the value does not fit `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, SettingsError> {
        let value = self.get(key)?;
        serde_json::from_value(value.clone()).map_err(|_| {
            let expected = self.value_type(key).unwrap_or(SettingType::Json);
            SettingsError::invalid_stored_value(key, expected, value.to_string())
        })
    }

    fn read(&self, key: &str, fallback: Option<Value>) -> Result<Value, SettingsError> {
        let state = self.state.lock();
        let Some(entry) = state.cache.get(key) else {
            return fallback.ok_or_else(|| SettingsError::unrecognized(key));
        };

        match (entry.user_value(), fallback) {
            (Some(stored), _) => decode(key, entry.value_type, stored),
            (None, Some(fallback)) => Ok(fallback),
            (None, None) => match &entry.declared_default {
                Some(default) => decode(key, entry.value_type, default),
                None => Ok(Value::Null),
            },
        }
    }

    /// Copy of every cached entry
    #[must_use]
    pub fn get_all(&self) -> IndexMap<String, SettingEntry> {
        self.state.lock().cache.clone()
    }

    /// Declared defaults, including local re-baselines
    #[must_use]
    pub fn defaults(&self) -> IndexMap<String, SettingDefinition> {
        self.state.lock().defaults.clone()
    }

    /// Key is known to the client
    #[must_use]
    pub fn is_declared(&self, key: &str) -> bool {
        self.state.lock().cache.contains_key(key)
    }

    /// Key is undeclared or carries no override
    #[must_use]
    pub fn is_default(&self, key: &str) -> bool {
        self.state
            .lock()
            .cache
            .get(key)
            .map_or(true, SettingEntry::is_default)
    }

    /// Key is declared but has no declared default
    #[must_use]
    pub fn is_custom(&self, key: &str) -> bool {
        self.state
            .lock()
            .cache
            .get(key)
            .is_some_and(|e| e.declared_default.is_none())
    }

    /// Key is locked by the server
    #[must_use]
    pub fn is_overridden(&self, key: &str) -> bool {
        self.state
            .lock()
            .cache
            .get(key)
            .is_some_and(SettingEntry::is_overridden)
    }

    /// Declared value type of a key
    #[must_use]
    pub fn value_type(&self, key: &str) -> Option<SettingType> {
        self.state.lock().cache.get(key).and_then(|e| e.value_type)
    }

    /// Store a user value and save it
    ///
    /// Equality with the current value is checked on the stored form, so
    /// a number the server stored as `"50"` is not equal to `50` and the
    /// write goes through.
    ///
    /// # Returns
    /// `Ok(true)` when saved or nothing changed, `Ok(false)` when the server
    /// call failed and the change was reverted
    ///
    /// # Errors
    /// - `SettingsError::OverriddenSetting` if the server locked the key;
    ///   nothing is sent
    pub async fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool, SettingsError> {
        self.update(key, Some(value.into())).await
    }

    /// Clear the user value and save
    ///
    /// # Errors
    /// - `SettingsError::OverriddenSetting` if the server locked the key
    pub async fn remove(&self, key: &str) -> Result<bool, SettingsError> {
        self.update(key, None).await
    }

    async fn update(&self, key: &str, value: Option<Value>) -> Result<bool, SettingsError> {
        let value = value.filter(|v| !v.is_null());

        let (pending, previous) = {
            let mut state = self.state.lock();
            state.assert_update_allowed(key)?;

            let next = state.stored_form(key, value);
            let was_declared = state.cache.contains_key(key);
            let previous = state.cache.get(key).and_then(|e| e.user_value().cloned());

            if previous == next {
                tracing::debug!(key, "setting unchanged, skipping save");
                return Ok(true);
            }

            let change = state.apply_local(key, next.clone());
            (Pending { next, change }, Previous { was_declared, value: previous })
        };

        tracing::debug!(key, "applied setting locally");
        self.updates.notify(&pending.change);

        match self.api.batch_set(key, pending.next).await {
            Ok(snapshot) => {
                self.state.lock().rebase(&snapshot);
                tracing::debug!(key, "setting saved");
                self.saved.notify(&pending.change);
                Ok(true)
            }
            Err(source) => {
                tracing::warn!(key, error = %source, "saving setting failed, reverting");
                let revert = self.state.lock().revert(key, previous);
                if let Some(revert) = revert {
                    self.updates.notify(&revert);
                }
                self.notifier.error(&SettingsError::api(key, source));
                Ok(false)
            }
        }
    }

    /// Replace the declared default of a key without contacting the server
    ///
    /// Observers are told only when no user override shadows the key.
    pub fn override_local_default(&self, key: &str, new_default: impl Into<Value>) {
        let new_default = new_default.into();
        let change = {
            let mut state = self.state.lock();
            let definition = state.defaults.entry(key.to_string()).or_default();
            let previous_default = definition.value.replace(new_default.clone());
            let value_type = definition.value_type;

            let entry = state.cache.entry(key.to_string()).or_default();
            entry.declared_default = Some(new_default.clone());
            if entry.value_type.is_none() {
                entry.value_type = value_type;
            }

            entry.is_default().then(|| SettingChange {
                key: key.to_string(),
                new_value: decode_lenient(key, entry.value_type, &new_default),
                old_value: previous_default
                    .map(|v| decode_lenient(key, entry.value_type, &v))
                    .unwrap_or(Value::Null),
            })
        };

        tracing::info!(key, broadcast = change.is_some(), "overrode local default");
        if let Some(change) = change {
            self.updates.notify(&change);
            self.saved.notify(&change);
        }
    }

    /// Observe every local value change, reverts included
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&SettingChange) + Send + Sync + 'static,
    {
        self.updates.subscribe(Arc::new(observer))
    }

    /// Observe local value changes with a shared callback
    ///
    /// Subscribing the same `Arc` twice yields a single registration.
    pub fn subscribe_observer(&self, observer: Observer) -> Subscription {
        self.updates.subscribe(observer)
    }

    /// Observe changes once the server confirmed them
    pub fn subscribe_saved<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&SettingChange) + Send + Sync + 'static,
    {
        self.saved.subscribe(Arc::new(observer))
    }

    /// Number of registered change observers
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.updates.len()
    }
}

impl fmt::Debug for SettingsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsClient")
            .field("state", &*self.state.lock())
            .field("updates", &self.updates)
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}

struct Pending {
    next: Option<Value>,
    change: SettingChange,
}

struct Previous {
    was_declared: bool,
    value: Option<Value>,
}

impl CacheState {
    fn assert_update_allowed(&self, key: &str) -> Result<(), SettingsError> {
        if self.cache.get(key).is_some_and(SettingEntry::is_overridden) {
            return Err(SettingsError::overridden(key));
        }
        Ok(())
    }

    /// Stored form of a requested value: `None` when it equals the declared
    /// default, json-typed values as encoded strings.
    fn stored_form(&self, key: &str, value: Option<Value>) -> Option<Value> {
        let value = value?;
        let Some(entry) = self.cache.get(key) else {
            return Some(value);
        };
        let stored = encode(entry.value_type, value);

        let matches_default = entry.declared_default.as_ref().is_some_and(|default| {
            *default == stored
                || decode(key, entry.value_type, default)
                    .is_ok_and(|d| d == decode_lenient(key, entry.value_type, &stored))
        });
        (!matches_default).then_some(stored)
    }

    fn effective(&self, key: &str) -> Value {
        self.cache
            .get(key)
            .and_then(|e| e.raw_value().map(|raw| decode_lenient(key, e.value_type, raw)))
            .unwrap_or(Value::Null)
    }

    fn apply_local(&mut self, key: &str, stored: Option<Value>) -> SettingChange {
        let old_value = self.effective(key);
        self.cache
            .entry(key.to_string())
            .or_default()
            .set_user_value(stored);
        SettingChange {
            key: key.to_string(),
            new_value: self.effective(key),
            old_value,
        }
    }

    /// Restore the pre-write stored state. A key the server locked while
    /// the write was in flight keeps the lock.
    fn revert(&mut self, key: &str, previous: Previous) -> Option<SettingChange> {
        if self.cache.get(key).is_some_and(SettingEntry::is_overridden) {
            return None;
        }
        if previous.was_declared {
            return Some(self.apply_local(key, previous.value));
        }
        let old_value = self.effective(key);
        self.cache.shift_remove(key)?;
        Some(SettingChange {
            key: key.to_string(),
            new_value: Value::Null,
            old_value,
        })
    }

    fn rebase(&mut self, snapshot: &SettingsSnapshot) {
        self.cache = merge(&self.defaults, snapshot);
    }
}

/// Deep merge of declared defaults and a server snapshot
///
/// Declared defaults win over defaults the server reports; overrides and
/// server locks come from the snapshot. Keys only the server knows become
/// custom settings.
fn merge(
    defaults: &IndexMap<String, SettingDefinition>,
    snapshot: &SettingsSnapshot,
) -> IndexMap<String, SettingEntry> {
    let mut cache: IndexMap<String, SettingEntry> = defaults
        .iter()
        .map(|(key, definition)| (key.clone(), SettingEntry::declared(definition)))
        .collect();

    for (key, remote) in snapshot.iter() {
        let entry = cache.entry(key.clone()).or_default();
        if entry.declared_default.is_none() {
            entry.declared_default.clone_from(&remote.value);
        }
        if entry.value_type.is_none() {
            entry.value_type = remote.value_type;
        }
        entry.state = remote.state();
    }

    cache
}

fn encode(value_type: Option<SettingType>, value: Value) -> Value {
    match (value_type, value) {
        (Some(SettingType::Json), value) if !value.is_string() => Value::String(value.to_string()),
        (_, value) => value,
    }
}

fn decode(key: &str, value_type: Option<SettingType>, stored: &Value) -> Result<Value, SettingsError> {
    match (value_type, stored) {
        (Some(SettingType::Json), Value::String(raw)) => serde_json::from_str(raw)
            .map_err(|_| SettingsError::invalid_stored_value(key, SettingType::Json, raw.as_str())),
        (Some(SettingType::Number), Value::String(raw)) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| SettingsError::invalid_stored_value(key, SettingType::Number, raw.as_str())),
        (_, stored) => Ok(stored.clone()),
    }
}

fn decode_lenient(key: &str, value_type: Option<SettingType>, stored: &Value) -> Value {
    decode(key, value_type, stored).unwrap_or_else(|_| stored.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockNotifier, MockSettingsApi};
    use crate::error::ApiError;
    use crate::types::{SettingState, SnapshotEntry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> SettingsConfig {
        SettingsConfig::new()
            .with_default("dateFormat", "MMM D, YYYY")
            .with_definition(
                "timepicker:timeDefaults",
                SettingDefinition::new(r#"{"from":"now-15m","to":"now"}"#).with_type(SettingType::Json),
            )
            .with_definition(
                "discover:sampleSize",
                SettingDefinition::new(500).with_type(SettingType::Number),
            )
            .with_default("theme:darkMode", false)
            .with_initial_setting("theme:darkMode", SnapshotEntry::overridden(true))
            .with_initial_setting("dateFormat:tz", SnapshotEntry::user("UTC"))
    }

    fn client(api: MockSettingsApi) -> SettingsClient {
        let mut notifier = MockNotifier::new();
        notifier.expect_error().never();
        SettingsClient::new(config(), Arc::new(api), Arc::new(notifier))
    }

    fn echo_api() -> MockSettingsApi {
        let mut api = MockSettingsApi::new();
        api.expect_batch_set().returning(|key, value| {
            Ok(SettingsSnapshot::new().with(
                key,
                SnapshotEntry {
                    user_value: value,
                    ..SnapshotEntry::default()
                },
            ))
        });
        api
    }

    #[test]
    fn get_declared_default() {
        let client = client(MockSettingsApi::new());
        assert_eq!(client.get("dateFormat").unwrap(), json!("MMM D, YYYY"));
        assert!(client.is_default("dateFormat"));
    }

    #[test]
    fn get_decodes_json_and_number() {
        let client = client(MockSettingsApi::new());
        assert_eq!(
            client.get("timepicker:timeDefaults").unwrap(),
            json!({ "from": "now-15m", "to": "now" })
        );
        assert_eq!(client.get("discover:sampleSize").unwrap(), json!(500));
    }

    #[test]
    fn get_unrecognized() {
        let client = client(MockSettingsApi::new());
        assert_eq!(
            client.get("missing").unwrap_err(),
            SettingsError::unrecognized("missing")
        );
        assert_eq!(client.get_or("missing", 7).unwrap(), json!(7));
    }

    #[test]
    fn get_or_prefers_override_over_fallback() {
        let client = client(MockSettingsApi::new());
        assert_eq!(client.get_or("dateFormat", "fallback").unwrap(), json!("fallback"));
        assert_eq!(client.get_or("dateFormat:tz", "fallback").unwrap(), json!("UTC"));
    }

    #[test]
    fn initial_snapshot_states() {
        let client = client(MockSettingsApi::new());

        assert!(client.is_overridden("theme:darkMode"));
        assert_eq!(client.get("theme:darkMode").unwrap(), json!(true));

        assert!(client.is_declared("dateFormat:tz"));
        assert!(client.is_custom("dateFormat:tz"));
        assert!(!client.is_custom("dateFormat"));
        assert!(client.is_default("never-declared"));
    }

    #[test]
    fn get_as_typed() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct TimeDefaults {
            from: String,
            to: String,
        }

        let client = client(MockSettingsApi::new());
        let defaults: TimeDefaults = client.get_as("timepicker:timeDefaults").unwrap();
        assert_eq!(defaults.from, "now-15m");

        let err = client.get_as::<u32>("dateFormat").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidStoredValue { .. }));
    }

    #[tokio::test]
    async fn set_saves_and_rebases() {
        let client = client(echo_api());

        assert!(client.set("dateFormat", "YYYY").await.unwrap());
        assert_eq!(client.get("dateFormat").unwrap(), json!("YYYY"));
        assert!(!client.is_default("dateFormat"));

        // keys missing from the returned snapshot fall back to their defaults
        assert!(!client.is_declared("dateFormat:tz"));
        assert!(!client.is_overridden("theme:darkMode"));
    }

    #[tokio::test]
    async fn set_to_default_collapses_override() {
        let mut api = MockSettingsApi::new();
        api.expect_batch_set()
            .withf(|key, value| key == "dateFormat" && value.is_none())
            .times(1)
            .returning(|_, _| Ok(SettingsSnapshot::new()));

        let client = SettingsClient::new(
            config().with_initial_setting("dateFormat", SnapshotEntry::user("YYYY")),
            Arc::new(api),
            Arc::new(crate::api::TracingNotifier),
        );

        assert!(client.set("dateFormat", "MMM D, YYYY").await.unwrap());
        assert_eq!(client.get_all()["dateFormat"].state, SettingState::Default);
        assert_eq!(client.get("dateFormat").unwrap(), json!("MMM D, YYYY"));
    }

    #[tokio::test]
    async fn set_json_value_matching_default_collapses() {
        let mut api = MockSettingsApi::new();
        api.expect_batch_set().never();

        let client = client(api);
        let ok = client
            .set("timepicker:timeDefaults", json!({ "from": "now-15m", "to": "now" }))
            .await
            .unwrap();
        assert!(ok);
        assert!(client.is_default("timepicker:timeDefaults"));
    }

    #[tokio::test]
    async fn set_json_value_stored_encoded() {
        let mut api = MockSettingsApi::new();
        api.expect_batch_set()
            .withf(|_, value| value.as_ref() == Some(&json!(r#"{"from":"now-1h","to":"now"}"#)))
            .times(1)
            .returning(|_, _| Err(ApiError::Transport("offline".to_string())));

        let mut notifier = MockNotifier::new();
        notifier.expect_error().times(1).return_const(());

        let client = SettingsClient::new(config(), Arc::new(api), Arc::new(notifier));
        let ok = client
            .set("timepicker:timeDefaults", json!({ "from": "now-1h", "to": "now" }))
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn unchanged_value_is_a_no_op() {
        let mut api = MockSettingsApi::new();
        api.expect_batch_set().never();
        let client = client(api);

        let calls = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&calls);
        let _sub = client.subscribe(move |_| *seen.lock() += 1);

        assert!(client.set("dateFormat:tz", "UTC").await.unwrap());
        assert!(client.remove("dateFormat").await.unwrap());
        assert_eq!(*calls.lock(), 0);
    }

    #[tokio::test]
    async fn overridden_key_rejected_before_network() {
        let mut api = MockSettingsApi::new();
        api.expect_batch_set().never();
        let client = client(api);

        let err = client.set("theme:darkMode", false).await.unwrap_err();
        assert_eq!(err, SettingsError::overridden("theme:darkMode"));
        assert!(client.remove("theme:darkMode").await.is_err());
    }

    #[tokio::test]
    async fn failure_reverts_and_notifies_once() {
        let mut api = MockSettingsApi::new();
        api.expect_batch_set()
            .times(1)
            .returning(|_, _| Err(ApiError::status(500, "internal")));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .withf(|err| err.key() == "dateFormat" && err.is_retryable())
            .times(1)
            .return_const(());

        let client = SettingsClient::new(config(), Arc::new(api), Arc::new(notifier));
        let changes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&changes);
        let _sub = client.subscribe(move |c| seen.lock().push(c.clone()));

        assert!(!client.set("dateFormat", "YYYY").await.unwrap());
        assert_eq!(client.get("dateFormat").unwrap(), json!("MMM D, YYYY"));
        assert!(client.is_default("dateFormat"));

        let changes = changes.lock();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].new_value, json!("YYYY"));
        assert_eq!(changes[0].old_value, json!("MMM D, YYYY"));
        assert_eq!(changes[1].new_value, json!("MMM D, YYYY"));
        assert_eq!(changes[1].old_value, json!("YYYY"));
    }

    #[tokio::test]
    async fn failed_set_of_undeclared_key_leaves_it_undeclared() {
        let mut api = MockSettingsApi::new();
        api.expect_batch_set()
            .returning(|_, _| Err(ApiError::Transport("offline".to_string())));
        let mut notifier = MockNotifier::new();
        notifier.expect_error().times(1).return_const(());

        let client = SettingsClient::new(config(), Arc::new(api), Arc::new(notifier));
        assert!(!client.set("brand:new", 1).await.unwrap());
        assert!(!client.is_declared("brand:new"));
    }

    #[tokio::test]
    async fn set_undeclared_key_declares_custom_setting() {
        let client = client(echo_api());
        assert!(client.set("brand:new", 1).await.unwrap());
        assert!(client.is_declared("brand:new"));
        assert!(client.is_custom("brand:new"));
        assert_eq!(client.get("brand:new").unwrap(), json!(1));
    }

    #[tokio::test]
    async fn saved_observers_only_see_confirmed_changes() {
        let mut api = MockSettingsApi::new();
        let mut calls = 0;
        api.expect_batch_set().times(2).returning(move |key, value| {
            calls += 1;
            if calls == 1 {
                Ok(SettingsSnapshot::new().with(
                    key,
                    SnapshotEntry {
                        user_value: value,
                        ..SnapshotEntry::default()
                    },
                ))
            } else {
                Err(ApiError::Transport("offline".to_string()))
            }
        });

        let client = SettingsClient::new(config(), Arc::new(api), Arc::new(crate::api::TracingNotifier));
        let saved = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&saved);
        let _sub = client.subscribe_saved(move |c| seen.lock().push(c.key.clone()));

        assert!(client.set("dateFormat", "YYYY").await.unwrap());
        assert!(!client.set("dateFormat", "DD").await.unwrap());
        assert_eq!(*saved.lock(), vec!["dateFormat".to_string()]);
    }

    #[test]
    fn override_local_default_broadcasts_when_not_shadowed() {
        let client = client(MockSettingsApi::new());
        let changes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&changes);
        let _sub = client.subscribe(move |c| seen.lock().push(c.clone()));

        client.override_local_default("dateFormat", "DD/MM");
        client.override_local_default("dateFormat:tz", "Europe/Paris");

        assert_eq!(client.get("dateFormat").unwrap(), json!("DD/MM"));
        assert_eq!(client.get("dateFormat:tz").unwrap(), json!("UTC"));
        assert_eq!(client.defaults()["dateFormat"].value, Some(json!("DD/MM")));

        let changes = changes.lock();
        assert_eq!(
            *changes,
            vec![SettingChange {
                key: "dateFormat".to_string(),
                new_value: json!("DD/MM"),
                old_value: json!("MMM D, YYYY"),
            }]
        );
    }

    #[test]
    fn override_local_default_declares_unknown_key() {
        let client = client(MockSettingsApi::new());
        client.override_local_default("injected:flag", true);

        assert!(client.is_declared("injected:flag"));
        assert!(!client.is_custom("injected:flag"));
        assert_eq!(client.get("injected:flag").unwrap(), json!(true));
    }

    #[tokio::test]
    async fn local_default_survives_rebase() {
        let client = client(echo_api());
        client.override_local_default("dateFormat", "DD/MM");

        assert!(client.set("discover:sampleSize", 100).await.unwrap());
        assert_eq!(client.get("dateFormat").unwrap(), json!("DD/MM"));
    }

    #[test]
    fn number_stored_as_string_is_parsed() {
        let client = SettingsClient::new(
            config().with_initial_setting("discover:sampleSize", SnapshotEntry::user("250")),
            Arc::new(MockSettingsApi::new()),
            Arc::new(crate::api::TracingNotifier),
        );
        assert_eq!(client.get("discover:sampleSize").unwrap(), json!(250.0));
    }

    #[test]
    fn invalid_number_reported() {
        let client = SettingsClient::new(
            config().with_initial_setting("discover:sampleSize", SnapshotEntry::user("lots")),
            Arc::new(MockSettingsApi::new()),
            Arc::new(crate::api::TracingNotifier),
        );
        assert!(matches!(
            client.get("discover:sampleSize").unwrap_err(),
            SettingsError::InvalidStoredValue { expected: SettingType::Number, .. }
        ));
    }

    #[test]
    fn merge_keeps_declared_defaults() {
        let mut defaults = IndexMap::new();
        defaults.insert("a".to_string(), SettingDefinition::new(1));
        let snapshot = SettingsSnapshot::new()
            .with(
                "a",
                SnapshotEntry {
                    value: Some(json!(99)),
                    user_value: Some(json!(2)),
                    ..SnapshotEntry::default()
                },
            )
            .with(
                "b",
                SnapshotEntry {
                    value: Some(json!("server")),
                    ..SnapshotEntry::default()
                },
            );

        let cache = merge(&defaults, &snapshot);
        assert_eq!(cache["a"].declared_default, Some(json!(1)));
        assert_eq!(cache["a"].state, SettingState::UserOverridden(json!(2)));
        assert_eq!(cache["b"].declared_default, Some(json!("server")));
        assert_eq!(cache["b"].state, SettingState::Default);
    }
}
