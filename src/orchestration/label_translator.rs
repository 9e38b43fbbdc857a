//! # Label Translator
//!
//! Best-effort translation of a record label into the new provider's input
//! language. Translation never fails a candidate: on any error the original
//! label is used as-is.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::{TranslationRequest, TranslationService};
use crate::config::TranslationConfig;

pub struct LabelTranslator {
    service: Arc<dyn TranslationService>,
    source_locale: String,
    target_locale: String,
    timeout: Duration,
}

impl LabelTranslator {
    pub fn new(service: Arc<dyn TranslationService>, config: &TranslationConfig) -> Self {
        Self {
            service,
            source_locale: config.source_locale.clone(),
            target_locale: config.target_locale.clone(),
            timeout: config.timeout(),
        }
    }

    /// Translate `label`, falling back to it unchanged. Blank labels are
    /// returned without a request.
    pub async fn translate(&self, label: &str) -> String {
        if label.trim().is_empty() {
            return label.to_string();
        }

        let request = TranslationRequest {
            text: label.to_string(),
            source: self.source_locale.clone(),
            target: self.target_locale.clone(),
        };

        match tokio::time::timeout(self.timeout, self.service.translate(&request)).await {
            Ok(Ok(translated)) if !translated.trim().is_empty() => {
                debug!(label = label, translated = %translated, "Translated label");
                translated.trim().to_string()
            }
            Ok(Ok(_)) => {
                warn!(label = label, "⚠️ Empty translation, using original label");
                label.to_string()
            }
            Ok(Err(e)) => {
                warn!(label = label, error = %e, "⚠️ Translation failed, using original label");
                label.to_string()
            }
            Err(_) => {
                warn!(
                    label = label,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "⚠️ Translation timed out, using original label"
                );
                label.to_string()
            }
        }
    }
}
