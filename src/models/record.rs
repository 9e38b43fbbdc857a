use serde::{Deserialize, Serialize};

use super::candidate::RecordId;
use super::nutrients::NutrientSet;

/// Food record as a store hands it back.
///
/// Every field is optional because stores hold rows written by older app
/// versions; callers decide which records are usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
    pub cholesterol: Option<f64>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub nutrition_source: Option<String>,
}

/// Partial update for one record.
///
/// Required nutrients are always written; optional ones only when `Some`, so
/// a provider that omits a nutrient never zeroes the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientPatch {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
    pub cholesterol: Option<f64>,
    pub nutrition_source: String,
}

impl NutrientPatch {
    pub fn from_nutrients(nutrients: &NutrientSet, source_tag: impl Into<String>) -> Self {
        Self {
            calories: nutrients.calories,
            protein: nutrients.protein,
            fat: nutrients.fat,
            carbs: nutrients.carbs,
            sugar: nutrients.sugar,
            fiber: nutrients.fiber,
            sodium: nutrients.sodium,
            cholesterol: nutrients.cholesterol,
            nutrition_source: source_tag.into(),
        }
    }

    pub fn apply_to(&self, record: &mut StoredRecord) {
        record.calories = Some(self.calories);
        record.protein = Some(self.protein);
        record.fat = Some(self.fat);
        record.carbs = Some(self.carbs);

        if let Some(sugar) = self.sugar {
            record.sugar = Some(sugar);
        }
        if let Some(fiber) = self.fiber {
            record.fiber = Some(fiber);
        }
        if let Some(sodium) = self.sodium {
            record.sodium = Some(sodium);
        }
        if let Some(cholesterol) = self.cholesterol {
            record.cholesterol = Some(cholesterol);
        }

        record.nutrition_source = Some(self.nutrition_source.clone());
    }
}
