//! # Credential Gate
//!
//! First phase of every batch. Nothing else runs until both new-provider
//! credentials are present and non-blank.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::CredentialKeysConfig;
use crate::credentials::CredentialStore;
use crate::orchestration::errors::ConfigError;

/// Application id and key for the new nutrition provider
#[derive(Clone, PartialEq, Eq)]
pub struct NutritionCredentials {
    pub app_id: String,
    pub app_key: String,
}

impl std::fmt::Debug for NutritionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NutritionCredentials")
            .field("app_id", &self.app_id)
            .field("app_key", &"[MASKED]")
            .finish()
    }
}

pub struct CredentialGate {
    store: Arc<dyn CredentialStore>,
    keys: CredentialKeysConfig,
}

impl CredentialGate {
    pub fn new(store: Arc<dyn CredentialStore>, keys: CredentialKeysConfig) -> Self {
        Self { store, keys }
    }

    /// Remove the legacy provider's key and seed empty entries for the new
    /// provider's keys. Existing values are never overwritten.
    pub fn retire_legacy_credentials(&self) {
        if let Some(legacy_key) = self.keys.legacy_key.as_deref() {
            if self.store.get(legacy_key).is_some() {
                info!(key = legacy_key, "🔑 Removing retired provider credential");
            }
            self.store.remove(legacy_key);
        }

        for key in [&self.keys.app_id_key, &self.keys.app_key_key] {
            if self.store.set_if_absent(key, "") {
                debug!(key = %key, "Seeded empty credential entry");
            }
        }
    }

    /// Read both credentials. Side-effect free.
    pub fn check_credentials(&self) -> Result<NutritionCredentials, ConfigError> {
        let app_id = self.require(&self.keys.app_id_key)?;
        let app_key = self.require(&self.keys.app_key_key)?;
        Ok(NutritionCredentials { app_id, app_key })
    }

    fn require(&self, key: &str) -> Result<String, ConfigError> {
        match self.store.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => {
                warn!(key = key, "❌ Required provider credential is missing");
                Err(ConfigError::missing(key))
            }
        }
    }
}
