//! Builders for stored records and fully wired coordinators

use std::sync::Arc;

use nutrition_migrator::{
    InMemoryCredentialStore, InMemoryRecordStore, MigratorConfig, RecordId,
    ReconciliationCoordinator, StoredRecord,
};

use super::fakes::{FakeNutrition, FakeTranslation};

/// Record computed by the legacy provider, with a 100 g serving
pub fn legacy_record(id: &str, name: &str) -> StoredRecord {
    StoredRecord {
        id: Some(RecordId::new(id)),
        name: Some(name.to_string()),
        calories: Some(40.0),
        protein: Some(0.5),
        fat: Some(0.1),
        carbs: Some(10.0),
        sugar: Some(7.5),
        fiber: Some(1.0),
        sodium: None,
        cholesterol: None,
        serving_size: Some(100.0),
        serving_unit: Some("g".to_string()),
        nutrition_source: Some("spoonacular".to_string()),
    }
}

pub fn migrated_record(id: &str, name: &str) -> StoredRecord {
    StoredRecord {
        nutrition_source: Some("edamam".to_string()),
        ..legacy_record(id, name)
    }
}

pub fn test_config() -> MigratorConfig {
    let mut config = MigratorConfig::default();
    config.environment = "test".to_string();
    config.migration.max_concurrent_workers = 4;
    config.migration.event_channel_capacity = 256;
    config
}

pub fn valid_credentials() -> Arc<InMemoryCredentialStore> {
    Arc::new(InMemoryCredentialStore::with_entries([
        ("edamam_app_id", "test-app-id"),
        ("edamam_app_key", "test-app-key"),
        ("spoonacular_api_key", "retired-key"),
    ]))
}

/// Coordinator over in-memory stores and fake providers, with handles kept
/// for assertions
pub struct Harness {
    pub store: Arc<InMemoryRecordStore>,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub translation: Arc<FakeTranslation>,
    pub nutrition: Arc<FakeNutrition>,
    pub coordinator: ReconciliationCoordinator,
}

impl Harness {
    pub fn new(
        store: Arc<InMemoryRecordStore>,
        translation: FakeTranslation,
        nutrition: FakeNutrition,
    ) -> Self {
        Self::with_config(store, valid_credentials(), translation, nutrition, test_config())
    }

    pub fn with_config(
        store: Arc<InMemoryRecordStore>,
        credentials: Arc<InMemoryCredentialStore>,
        translation: FakeTranslation,
        nutrition: FakeNutrition,
        config: MigratorConfig,
    ) -> Self {
        let translation = Arc::new(translation);
        let nutrition = Arc::new(nutrition);
        let coordinator = ReconciliationCoordinator::new(
            Arc::new(config),
            store.clone(),
            credentials.clone(),
            translation.clone(),
            nutrition.clone(),
        );

        Self {
            store,
            credentials,
            translation,
            nutrition,
            coordinator,
        }
    }
}
