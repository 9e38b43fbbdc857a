use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{NutritionProvider, NutritionResponse};
use crate::config::NutritionConfig;
use crate::orchestration::credential_gate::NutritionCredentials;
use crate::orchestration::errors::LookupError;

/// Client for an Edamam-style `nutrition-data` endpoint
#[derive(Debug, Clone)]
pub struct HttpNutritionClient {
    http: Client,
    endpoint: String,
}

impl HttpNutritionClient {
    pub fn new(config: &NutritionConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(http, config.endpoint.clone()))
    }

    pub fn with_client(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NutritionProvider for HttpNutritionClient {
    async fn nutrition_data(
        &self,
        credentials: &NutritionCredentials,
        ingredient: &str,
    ) -> Result<NutritionResponse, LookupError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("app_id", credentials.app_id.as_str()),
                ("app_key", credentials.app_key.as_str()),
                ("ingr", ingredient),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Network(format!(
                "nutrition endpoint returned status {}",
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let parsed = parse_nutrition_body(&body)?;
        debug!(
            ingredient = ingredient,
            nutrients = parsed.total_nutrients.len(),
            "🥗 Nutrition data received"
        );
        Ok(parsed)
    }
}

fn map_transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Network("nutrition request timed out".to_string())
    } else {
        LookupError::Network(err.to_string())
    }
}

pub(crate) fn parse_nutrition_body(body: &str) -> Result<NutritionResponse, LookupError> {
    serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))
}
