//! # System Constants
//!
//! Provider tags, credential key names, endpoint defaults and lifecycle event
//! names shared across the migration engine.

/// Lifecycle events published while a batch runs
pub mod events {
    pub const BATCH_STARTED: &str = "migration.batch.started";
    pub const BATCH_COMPLETED: &str = "migration.batch.completed";
    pub const CANDIDATE_MIGRATED: &str = "migration.candidate.migrated";
    pub const CANDIDATE_SKIPPED: &str = "migration.candidate.skipped";
    pub const CANDIDATE_NOT_FOUND: &str = "migration.candidate.not_found";
    pub const BATCH_PROGRESS: &str = "migration.batch.progress";
}

/// Provenance tags as written on stored food records
pub mod providers {
    pub const LEGACY_TAG: &str = "spoonacular";
    pub const NEW_TAG: &str = "edamam";
}

/// Default credential store keys
pub mod credential_keys {
    pub const APP_ID: &str = "edamam_app_id";
    pub const APP_KEY: &str = "edamam_app_key";
    pub const TRANSLATION_KEY: &str = "google_translate_api_key";
    pub const LEGACY_KEY: &str = "spoonacular_api_key";
}

pub mod endpoints {
    pub const TRANSLATION: &str = "https://translation.googleapis.com/language/translate/v2";
    pub const NUTRITION: &str = "https://api.edamam.com/api/nutrition-data";
}

/// Nutrient codes in the new provider's `totalNutrients` map
pub mod nutrient_codes {
    pub const ENERGY: &str = "ENERC_KCAL";
    pub const PROTEIN: &str = "PROCNT";
    pub const FAT: &str = "FAT";
    pub const CARBOHYDRATE: &str = "CHOCDF";
    pub const SUGAR: &str = "SUGAR";
    pub const FIBER: &str = "FIBTG";
    pub const SODIUM: &str = "NA";
    pub const CHOLESTEROL: &str = "CHOLE";
}

pub const DEFAULT_TRANSLATION_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_NUTRITION_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SERVING_AMOUNT: f64 = 100.0;
pub const DEFAULT_SERVING_UNIT: &str = "g";
/// Stored servings above this are treated as corrupt and replaced by the default
pub const MAX_SERVING_AMOUNT: f64 = 1_000_000.0;
