//! # Nutrition Lookup
//!
//! Queries the new provider for one ingredient and turns its nutrient map into
//! a [`NutrientSet`]. Required nutrients must be present and finite; a missing
//! one fails the lookup instead of being stored as zero. Each request is
//! bounded by the configured nutrition timeout, whatever the provider does.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::{NutritionProvider, NutritionResponse};
use crate::constants::nutrient_codes;
use crate::models::{NutrientSet, Provenance, ServingBasis};
use crate::orchestration::credential_gate::NutritionCredentials;
use crate::orchestration::errors::LookupError;

pub struct NutritionLookup {
    provider: Arc<dyn NutritionProvider>,
    credentials: NutritionCredentials,
    timeout: Duration,
}

impl NutritionLookup {
    pub fn new(
        provider: Arc<dyn NutritionProvider>,
        credentials: NutritionCredentials,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            credentials,
            timeout,
        }
    }

    /// Ingredient query for a label and serving, e.g. `100g apple`
    pub fn ingredient_query(translated_label: &str, serving: &ServingBasis) -> String {
        format!("{} {}", serving.query_prefix(), translated_label.trim())
    }

    pub async fn fetch(
        &self,
        translated_label: &str,
        serving: &ServingBasis,
    ) -> Result<NutrientSet, LookupError> {
        let query = Self::ingredient_query(translated_label, serving);
        let request = self.provider.nutrition_data(&self.credentials, &query);
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(response) => response?,
            Err(_) => {
                warn!(
                    query = %query,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "⏰ Nutrition lookup timed out"
                );
                return Err(LookupError::Network(format!(
                    "timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };
        let nutrients = decode_nutrients(&response, serving)?;

        debug!(
            query = %query,
            calories = nutrients.calories,
            optional = nutrients.optional_count(),
            "Decoded nutrient set"
        );
        Ok(nutrients)
    }
}

/// Map provider nutrient codes onto a nutrient set for `serving`
pub fn decode_nutrients(
    response: &NutritionResponse,
    serving: &ServingBasis,
) -> Result<NutrientSet, LookupError> {
    let required = |code: &str| {
        response
            .quantity(code)
            .filter(|value| value.is_finite())
            .ok_or_else(|| LookupError::missing_nutrient(code))
    };
    let optional = |code: &str| response.quantity(code).filter(|value| value.is_finite());

    Ok(NutrientSet {
        calories: required(nutrient_codes::ENERGY)?,
        protein: required(nutrient_codes::PROTEIN)?,
        fat: required(nutrient_codes::FAT)?,
        carbs: required(nutrient_codes::CARBOHYDRATE)?,
        sugar: optional(nutrient_codes::SUGAR),
        fiber: optional(nutrient_codes::FIBER),
        sodium: optional(nutrient_codes::SODIUM),
        cholesterol: optional(nutrient_codes::CHOLESTEROL),
        serving: serving.clone(),
        provenance: Provenance::NewProvider,
    })
}
