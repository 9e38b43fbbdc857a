//! # Credential Store
//!
//! Key/value access to provider secrets. The engine reads the new provider's
//! application id and key, retires the legacy provider's key, and seeds empty
//! entries for the new keys so operators can find and fill them.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::env;

use crate::config::CredentialKeysConfig;

pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn remove(&self, key: &str);

    /// Store `value` only when `key` has no entry yet. Returns whether it wrote.
    fn set_if_absent(&self, key: &str, value: &str) -> bool;
}

/// Process-local credential store
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.entries.write();
            for (key, value) in entries {
                map.insert(key.into(), value.into());
            }
        }
        store
    }

    /// Seed from environment variables named after the upper-cased keys,
    /// e.g. `EDAMAM_APP_ID`.
    pub fn from_env(keys: &CredentialKeysConfig) -> Self {
        let store = Self::new();
        let mut names = vec![
            keys.app_id_key.as_str(),
            keys.app_key_key.as_str(),
            keys.translation_key.as_str(),
        ];
        if let Some(legacy) = keys.legacy_key.as_deref() {
            names.push(legacy);
        }

        for key in names {
            if let Ok(value) = env::var(key.to_uppercase()) {
                store.set(key, value);
            }
        }
        store
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn set_if_absent(&self, key: &str, value: &str) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(key) {
            return false;
        }
        entries.insert(key.to_string(), value.to_string());
        true
    }
}
