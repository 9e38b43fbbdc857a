//! Error types raised inside a migration batch.
//!
//! `ConfigError` is fatal and stops a batch before any work. `LookupError`
//! only ever skips the candidate it belongs to.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing credentials: '{key}' is absent or empty")]
    MissingCredentials { key: String },
}

impl ConfigError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingCredentials { key: key.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Nutrition request failed: {0}")]
    Network(String),

    #[error("Nutrition response could not be decoded: {0}")]
    Decode(String),

    #[error("Nutrition response is missing required nutrient {nutrient}")]
    MissingKeyNutrient { nutrient: String },
}

impl LookupError {
    pub fn missing_nutrient(nutrient: impl Into<String>) -> Self {
        Self::MissingKeyNutrient {
            nutrient: nutrient.into(),
        }
    }

    /// Short label used in log fields and event payloads
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::MissingKeyNutrient { .. } => "missing_key_nutrient",
        }
    }
}
