//! # Provider Clients
//!
//! HTTP clients for the two external services a migration worker talks to.
//!
//! - [`TranslationService`]: turns a label in the legacy locale into the new
//!   provider's input language.
//! - [`NutritionProvider`]: returns the raw nutrient map for an ingredient
//!   query such as `100g apple`.
//!
//! Both are traits so the coordinator can be driven by in-process fakes. The
//! `Http*` implementations use a shared `reqwest::Client` with a per-request
//! timeout taken from configuration.

pub mod nutrition;
pub mod translation;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::orchestration::credential_gate::NutritionCredentials;
use crate::orchestration::errors::LookupError;

pub use nutrition::HttpNutritionClient;
pub use translation::{decode_html_entities, HttpTranslationClient};

/// One translation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Transport(String),

    #[error("Translation request timed out")]
    Timeout,

    #[error("Translation service returned status {status}")]
    Status { status: u16 },

    #[error("Translation response could not be decoded: {0}")]
    Decode(String),

    #[error("Translation response contained no translations")]
    Empty,
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError>;
}

/// One entry of the provider's `totalNutrients` map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientQuantity {
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

/// Nutrition endpoint response body, restricted to the fields we read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionResponse {
    #[serde(rename = "totalNutrients", default)]
    pub total_nutrients: HashMap<String, NutrientQuantity>,
}

impl NutritionResponse {
    pub fn quantity(&self, code: &str) -> Option<f64> {
        self.total_nutrients.get(code).map(|entry| entry.quantity)
    }
}

#[async_trait]
pub trait NutritionProvider: Send + Sync {
    /// Raw nutrient data for `ingredient`. Transport failures, timeouts and
    /// non-success statuses are `LookupError::Network`; an unreadable body is
    /// `LookupError::Decode`.
    async fn nutrition_data(
        &self,
        credentials: &NutritionCredentials,
        ingredient: &str,
    ) -> Result<NutritionResponse, LookupError>;
}
