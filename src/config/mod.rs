//! # Migrator Configuration System
//!
//! YAML-based configuration for the provider migration engine. A single file
//! holds the base configuration plus optional `development`/`test`/`production`
//! sections that are deep-merged over it for the detected environment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nutrition_migrator::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let timeout = manager.config().translation.timeout();
//! let legacy_tag = &manager.config().providers.legacy_tag;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants;
use crate::models::ServingBasis;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring migrator-config.yaml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MigratorConfig {
    /// Provenance tags for the legacy and new nutrition providers
    pub providers: ProvidersConfig,

    /// Key names looked up in the credential store
    pub credentials: CredentialKeysConfig,

    /// Label translation endpoint settings
    pub translation: TranslationConfig,

    /// Nutrition endpoint settings
    pub nutrition: NutritionConfig,

    /// Batch execution settings
    pub migration: MigrationConfig,

    /// Record store connection
    pub database: DatabaseConfig,

    /// Active environment, set by the loader
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "development".to_string()
}

/// Provenance tags as stored on each food record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    pub legacy_tag: String,
    pub new_tag: String,
}

/// Credential store key names
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialKeysConfig {
    pub app_id_key: String,
    pub app_key_key: String,
    pub translation_key: String,
    /// Key of the legacy provider credential, removed when a migration starts
    pub legacy_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    pub endpoint: String,
    pub source_locale: String,
    pub target_locale: String,
    pub timeout_seconds: u64,
    /// Used when the credential store holds no translation key
    #[serde(default)]
    pub fallback_api_key: Option<String>,
}

impl TranslationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NutritionConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub default_serving_amount: f64,
    pub default_serving_unit: String,
}

impl NutritionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Serving basis used when a stored record carries none
    pub fn default_serving(&self) -> ServingBasis {
        ServingBasis::new(self.default_serving_amount, &self.default_serving_unit)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MigrationConfig {
    pub max_concurrent_workers: usize,
    pub watchdog_enabled: bool,
    /// Overrides the computed watchdog deadline when set
    #[serde(default)]
    pub batch_timeout_seconds: Option<u64>,
    pub event_channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig {
                legacy_tag: constants::providers::LEGACY_TAG.to_string(),
                new_tag: constants::providers::NEW_TAG.to_string(),
            },
            credentials: CredentialKeysConfig {
                app_id_key: constants::credential_keys::APP_ID.to_string(),
                app_key_key: constants::credential_keys::APP_KEY.to_string(),
                translation_key: constants::credential_keys::TRANSLATION_KEY.to_string(),
                legacy_key: Some(constants::credential_keys::LEGACY_KEY.to_string()),
            },
            translation: TranslationConfig {
                endpoint: constants::endpoints::TRANSLATION.to_string(),
                source_locale: "ru".to_string(),
                target_locale: "en".to_string(),
                timeout_seconds: constants::DEFAULT_TRANSLATION_TIMEOUT_SECS,
                fallback_api_key: None,
            },
            nutrition: NutritionConfig {
                endpoint: constants::endpoints::NUTRITION.to_string(),
                timeout_seconds: constants::DEFAULT_NUTRITION_TIMEOUT_SECS,
                default_serving_amount: constants::DEFAULT_SERVING_AMOUNT,
                default_serving_unit: constants::DEFAULT_SERVING_UNIT.to_string(),
            },
            migration: MigrationConfig {
                max_concurrent_workers: 8,
                watchdog_enabled: true,
                batch_timeout_seconds: None,
                event_channel_capacity: 1000,
            },
            database: DatabaseConfig {
                url: "sqlite://nutrition.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            environment: default_environment(),
        }
    }
}

impl MigratorConfig {
    /// Validate configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.providers.legacy_tag.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "providers.legacy_tag",
                "provider configuration",
            ));
        }

        if self.providers.new_tag.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "providers.new_tag",
                "provider configuration",
            ));
        }

        if self
            .providers
            .legacy_tag
            .eq_ignore_ascii_case(&self.providers.new_tag)
        {
            return Err(ConfigurationError::invalid_value(
                "providers.new_tag",
                self.providers.new_tag.clone(),
                "new provider tag must differ from the legacy tag",
            ));
        }

        if self.credentials.app_id_key.is_empty() || self.credentials.app_key_key.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "credentials.app_id_key / credentials.app_key_key",
                "credential key names",
            ));
        }

        for (field, url) in [
            ("translation.endpoint", &self.translation.endpoint),
            ("nutrition.endpoint", &self.nutrition.endpoint),
        ] {
            if url.is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    field,
                    "endpoint configuration",
                ));
            }
            if url::Url::parse(url).is_err() {
                return Err(ConfigurationError::invalid_value(
                    field,
                    url.clone(),
                    "endpoint must be an absolute URL",
                ));
            }
        }

        if self.translation.timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "translation.timeout_seconds",
                "0",
                "timeout must be greater than 0",
            ));
        }

        if self.nutrition.timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "nutrition.timeout_seconds",
                "0",
                "timeout must be greater than 0",
            ));
        }

        if !(self.nutrition.default_serving_amount.is_finite()
            && self.nutrition.default_serving_amount > 0.0)
        {
            return Err(ConfigurationError::invalid_value(
                "nutrition.default_serving_amount",
                self.nutrition.default_serving_amount.to_string(),
                "serving amount must be a positive number",
            ));
        }

        if self.migration.max_concurrent_workers == 0 {
            return Err(ConfigurationError::invalid_value(
                "migration.max_concurrent_workers",
                "0",
                "at least one worker is required",
            ));
        }

        if self.migration.event_channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "migration.event_channel_capacity",
                "0",
                "broadcast capacity must be greater than 0",
            ));
        }

        if self.migration.batch_timeout_seconds == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "migration.batch_timeout_seconds",
                "0",
                "omit the value to use the computed deadline",
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                "0",
                "pool size must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Longest single network call a worker can make
    pub fn per_call_timeout(&self) -> Duration {
        self.translation.timeout().max(self.nutrition.timeout())
    }

    /// Watchdog deadline for a batch of `total` candidates, if enabled
    pub fn batch_deadline(&self, total: usize) -> Option<Duration> {
        if !self.migration.watchdog_enabled {
            return None;
        }

        if let Some(seconds) = self.migration.batch_timeout_seconds {
            return Some(Duration::from_secs(seconds));
        }

        let factor = u32::try_from(total.saturating_mul(2)).unwrap_or(u32::MAX);
        Some(self.per_call_timeout().saturating_mul(factor))
    }

    pub fn is_production_environment(&self) -> bool {
        self.environment == "production"
    }
}
