use crate::storage::Storage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// A single JSON-serializable value mirrored into durable storage.
///
/// The value is read once on construction and written back after every
/// change. Storage failures never reach the caller: a bad document falls
/// back to the initial value and a failed write leaves the cell in-memory only.
pub struct PersistedCell<T> {
    key: String,
    value: T,
    storage: Arc<dyn Storage>,
}

impl<T> PersistedCell<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(initial: T, key: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        let key = key.into();
        let value = match storage.get_item(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    debug!("Restored persisted value for '{}'", key);
                    value
                }
                Err(e) => {
                    warn!("Persisted value for '{}' is malformed ({}); using initial value", key, e);
                    initial
                }
            },
            Ok(None) => initial,
            Err(e) => {
                warn!("Failed to read persisted value for '{}': {}; using initial value", key, e);
                initial
            }
        };

        Self { key, value, storage }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and persist it
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Derive the next value from the latest one and persist it
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }

    /// Returns whether the write reached storage
    fn persist(&self) -> bool {
        let json = match serde_json::to_string(&self.value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize value for '{}': {}", self.key, e);
                return false;
            }
        };

        match self.storage.set_item(&self.key, &json) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist '{}', keeping in-memory value only: {}", self.key, e);
                false
            }
        }
    }
}
