//! # Candidate Selector
//!
//! Reads every record still tagged with the legacy provider and keeps the ones
//! the engine can actually migrate. A usable record has a non-blank label and
//! four finite required nutrients; anything else is left untouched and counted
//! nowhere. A record without an identity still takes part in the batch under a
//! generated one, so it is counted and its write resolves to not-found.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ProvidersConfig;
use crate::constants::MAX_SERVING_AMOUNT;
use crate::models::{
    MigrationCandidate, NutrientSet, Provenance, RecordId, ServingBasis, StoredRecord,
};
use crate::store::{RecordStore, StoreError};

pub struct CandidateSelector {
    store: Arc<dyn RecordStore>,
    providers: ProvidersConfig,
    default_serving: ServingBasis,
}

impl CandidateSelector {
    pub fn new(
        store: Arc<dyn RecordStore>,
        providers: ProvidersConfig,
        default_serving: ServingBasis,
    ) -> Self {
        Self {
            store,
            providers,
            default_serving,
        }
    }

    pub async fn select_candidates(&self) -> Result<Vec<MigrationCandidate>, StoreError> {
        let records = self
            .store
            .query_by_provenance(&self.providers.legacy_tag)
            .await?;
        let matched = records.len();

        let candidates: Vec<MigrationCandidate> = records
            .into_iter()
            .filter_map(|record| self.to_candidate(record))
            .collect();

        info!(
            legacy_tag = %self.providers.legacy_tag,
            matched = matched,
            candidates = candidates.len(),
            skipped = matched - candidates.len(),
            "🔍 Selected migration candidates"
        );

        Ok(candidates)
    }

    fn to_candidate(&self, record: StoredRecord) -> Option<MigrationCandidate> {
        let id = match record.id.clone() {
            Some(id) => id,
            None => {
                let generated = RecordId::generate();
                debug!(
                    name = ?record.name,
                    record_id = %generated,
                    "Legacy record has no identity, generated one"
                );
                generated
            }
        };

        let label = match record.name.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => {
                debug!(record_id = %id, "Skipping legacy record without label");
                return None;
            }
        };

        let (Some(calories), Some(protein), Some(fat), Some(carbs)) = (
            finite(record.calories),
            finite(record.protein),
            finite(record.fat),
            finite(record.carbs),
        ) else {
            debug!(record_id = %id, "Skipping legacy record with incomplete nutrients");
            return None;
        };

        let serving = match (finite(record.serving_size), record.serving_unit.as_deref()) {
            (Some(amount), Some(unit))
                if amount > 0.0 && amount <= MAX_SERVING_AMOUNT && !unit.trim().is_empty() =>
            {
                ServingBasis::new(amount, unit.trim())
            }
            _ => self.default_serving.clone(),
        };

        let legacy_nutrients = NutrientSet {
            calories,
            protein,
            fat,
            carbs,
            sugar: finite(record.sugar),
            fiber: finite(record.fiber),
            sodium: finite(record.sodium),
            cholesterol: finite(record.cholesterol),
            serving,
            provenance: Provenance::LegacyProvider,
        };

        Some(MigrationCandidate {
            id,
            display_label: label,
            legacy_nutrients,
        })
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
