use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::nutrients::NutrientSet;

/// Stable identity of a stored food record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A stored record selected for re-derivation by the new provider.
///
/// Candidates are never mutated after selection; workers share them read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationCandidate {
    pub id: RecordId,
    pub display_label: String,
    pub legacy_nutrients: NutrientSet,
}
