//! # Migration Bootstrap
//!
//! Wires a [`ReconciliationCoordinator`] from configuration: SQLite record
//! store, environment-backed credentials and the two HTTP provider clients.
//! Embedders that bring their own stores construct the coordinator directly.

use std::sync::Arc;
use tracing::{info, warn};

use crate::client::{HttpNutritionClient, HttpTranslationClient};
use crate::config::{ConfigManager, MigratorConfig};
use crate::credentials::{CredentialStore, InMemoryCredentialStore};
use crate::error::{MigratorError, Result};
use crate::orchestration::reconciliation_coordinator::ReconciliationCoordinator;
use crate::store::SqliteRecordStore;

/// Everything a one-shot migration run needs
pub struct MigrationBootstrap {
    pub coordinator: ReconciliationCoordinator,
    pub record_store: Arc<SqliteRecordStore>,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub config_manager: Arc<ConfigManager>,
}

impl MigrationBootstrap {
    /// Bootstrap from `config/` with the detected environment
    pub async fn from_default_config() -> Result<Self> {
        let config_manager = ConfigManager::load()?;
        Self::from_config_manager(config_manager).await
    }

    pub async fn from_config_manager(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let config = Arc::new(config_manager.config().clone());
        config.validate()?;

        info!(
            environment = config_manager.environment(),
            database = %config.database.url,
            "🚀 Bootstrapping nutrition migration"
        );

        let record_store = Arc::new(SqliteRecordStore::from_config(&config.database).await?);
        record_store.ensure_schema().await?;

        let credentials = Arc::new(InMemoryCredentialStore::from_env(&config.credentials));
        let coordinator =
            Self::build_coordinator(config, record_store.clone(), credentials.clone())?;

        Ok(Self {
            coordinator,
            record_store,
            credentials,
            config_manager,
        })
    }

    fn build_coordinator(
        config: Arc<MigratorConfig>,
        record_store: Arc<SqliteRecordStore>,
        credentials: Arc<InMemoryCredentialStore>,
    ) -> Result<ReconciliationCoordinator> {
        let translation_key = resolve_translation_key(&config, credentials.as_ref());

        let translation = HttpTranslationClient::new(&config.translation, translation_key)
            .map_err(|e| MigratorError::ConfigurationError(format!("translation client: {e}")))?;
        let nutrition = HttpNutritionClient::new(&config.nutrition)
            .map_err(|e| MigratorError::ConfigurationError(format!("nutrition client: {e}")))?;

        Ok(ReconciliationCoordinator::new(
            config,
            record_store,
            credentials,
            Arc::new(translation),
            Arc::new(nutrition),
        ))
    }
}

/// Translation API key from the credential store, then the configured
/// fallback. A missing key only degrades translation, so it is not fatal.
pub fn resolve_translation_key(
    config: &MigratorConfig,
    credentials: &dyn CredentialStore,
) -> String {
    credentials
        .get(&config.credentials.translation_key)
        .filter(|key| !key.trim().is_empty())
        .or_else(|| config.translation.fallback_api_key.clone())
        .unwrap_or_else(|| {
            warn!("⚠️ No translation API key configured; labels will not be translated");
            String::new()
        })
}
