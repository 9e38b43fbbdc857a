use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{TranslationError, TranslationRequest, TranslationService};
use crate::config::TranslationConfig;

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for a Google-Translate-v2 style endpoint
#[derive(Debug, Clone)]
pub struct HttpTranslationClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTranslationClient {
    pub fn new(config: &TranslationConfig, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(http, config.endpoint.clone(), api_key))
    }

    pub fn with_client(http: Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TranslationService for HttpTranslationClient {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError> {
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", request.text.as_str()),
                ("source", request.source.as_str()),
                ("target", request.target.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let translated = parse_translation_body(&body)?;
        debug!(source = %request.text, translated = %translated, "🌐 Translation received");
        Ok(translated)
    }
}

fn map_transport_error(err: reqwest::Error) -> TranslationError {
    if err.is_timeout() {
        TranslationError::Timeout
    } else {
        TranslationError::Transport(err.to_string())
    }
}

/// Extract the first translation from a response body and decode any HTML
/// entities the service escaped into it.
pub(crate) fn parse_translation_body(body: &str) -> Result<String, TranslationError> {
    let parsed: TranslateResponse =
        serde_json::from_str(body).map_err(|e| TranslationError::Decode(e.to_string()))?;

    parsed
        .data
        .translations
        .into_iter()
        .next()
        .map(|t| decode_html_entities(&t.translated_text))
        .ok_or(TranslationError::Empty)
}

/// Decode the named and numeric HTML entities translation services emit,
/// e.g. `&#39;` or `&amp;`. Unknown entities are left as written.
pub fn decode_html_entities(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let decoded = candidate
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&candidate[1..end]).map(|c| (c, end)));

        match decoded {
            Some((character, end)) => {
                output.push(character);
                rest = &candidate[end + 1..];
            }
            None => {
                output.push('&');
                rest = &candidate[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
