use serde::{Deserialize, Serialize};
use std::fmt;

/// Which provider last computed a nutrient set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    LegacyProvider,
    NewProvider,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegacyProvider => write!(f, "legacy_provider"),
            Self::NewProvider => write!(f, "new_provider"),
        }
    }
}

/// Reference quantity a nutrient set was computed for, e.g. `100 g`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingBasis {
    pub amount: f64,
    pub unit: String,
}

impl ServingBasis {
    pub fn new(amount: f64, unit: impl Into<String>) -> Self {
        Self {
            amount,
            unit: unit.into(),
        }
    }

    /// Prefix for a provider ingredient query: `100g`, `2.5oz`
    pub fn query_prefix(&self) -> String {
        if self.amount.fract() == 0.0 && self.amount.abs() < 1e15 {
            format!("{}{}", self.amount as i64, self.unit)
        } else {
            format!("{}{}", self.amount, self.unit)
        }
    }
}

/// Nutrition facts for one serving basis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientSet {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
    pub cholesterol: Option<f64>,
    pub serving: ServingBasis,
    pub provenance: Provenance,
}

impl NutrientSet {
    /// Nutrient set with only the required fields
    pub fn required(
        calories: f64,
        protein: f64,
        fat: f64,
        carbs: f64,
        serving: ServingBasis,
        provenance: Provenance,
    ) -> Self {
        Self {
            calories,
            protein,
            fat,
            carbs,
            sugar: None,
            fiber: None,
            sodium: None,
            cholesterol: None,
            serving,
            provenance,
        }
    }

    /// Number of optional nutrients the provider reported
    pub fn optional_count(&self) -> usize {
        [self.sugar, self.fiber, self.sodium, self.cholesterol]
            .iter()
            .filter(|value| value.is_some())
            .count()
    }
}
