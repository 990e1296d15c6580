use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::store::KeyValueStore;

/// A typed value mirrored into a [`KeyValueStore`].
///
/// The in-memory value is authoritative for the session. Store access is
/// best-effort: failures are logged and never reach the caller, and a
/// preference built without a store (pre-render or server context) simply
/// holds its default.
pub struct PersistedPreference<T> {
    key: String,
    default_value: T,
    value: T,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl<T> PersistedPreference<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn load(store: Option<Arc<dyn KeyValueStore>>, key: impl Into<String>, default_value: T) -> Self {
        let key = key.into();
        let value = store
            .as_deref()
            .and_then(|store| read_entry(store, &key))
            .unwrap_or_else(|| default_value.clone());
        Self {
            key,
            default_value,
            value,
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Replace the value with one computed from the current value.
    pub fn update(&mut self, next: impl FnOnce(&T) -> T) {
        self.value = next(&self.value);
        self.persist();
    }

    pub fn reset(&mut self) {
        self.value = self.default_value.clone();
        let Some(store) = &self.store else {
            return;
        };
        if let Err(error) = store.remove(&self.key) {
            warn!(key = %self.key, %error, "preference: failed to remove stored value");
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let encoded = match serde_json::to_string(&self.value) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(key = %self.key, %error, "preference: failed to encode value");
                return;
            }
        };
        if let Err(error) = store.set(&self.key, &encoded) {
            warn!(key = %self.key, %error, "preference: failed to persist value");
        }
    }
}

fn read_entry<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(error) => {
            warn!(key, %error, "preference: failed to read stored value");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "preference: stored value could not be decoded");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/preference_tests.rs"]
mod tests;
