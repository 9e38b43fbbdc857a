//! # Record Reconciler
//!
//! The only code path that mutates stored records. A record deleted after
//! selection is a quiet no-op, never an error.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::{NutrientPatch, NutrientSet, RecordId};
use crate::store::{RecordStore, StoreError};

/// What happened to the stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied,
    NotFound,
}

pub struct RecordReconciler {
    store: Arc<dyn RecordStore>,
    new_tag: String,
}

impl RecordReconciler {
    pub fn new(store: Arc<dyn RecordStore>, new_tag: impl Into<String>) -> Self {
        Self {
            store,
            new_tag: new_tag.into(),
        }
    }

    pub async fn apply(
        &self,
        id: &RecordId,
        nutrients: &NutrientSet,
    ) -> Result<ApplyOutcome, StoreError> {
        if self.store.get(id).await?.is_none() {
            debug!(record_id = %id, "Record disappeared before write");
            return Ok(ApplyOutcome::NotFound);
        }

        let patch = NutrientPatch::from_nutrients(nutrients, self.new_tag.as_str());
        match self.store.update(id, &patch).await {
            Ok(()) => {
                info!(
                    record_id = %id,
                    calories = patch.calories,
                    provenance = %self.new_tag,
                    "✅ Record re-derived"
                );
                Ok(ApplyOutcome::Applied)
            }
            Err(StoreError::NotFound(_)) => {
                debug!(record_id = %id, "Record deleted during write");
                Ok(ApplyOutcome::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}
