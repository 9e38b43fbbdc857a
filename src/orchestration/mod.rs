//! # Migration Orchestration
//!
//! Components of a provider-migration batch, leaves first:
//!
//! - **CredentialGate**: requires the new provider's credentials
//! - **CandidateSelector**: turns legacy-tagged records into candidates
//! - **LabelTranslator**: best-effort label translation with timeout fallback
//! - **NutritionLookup**: new-provider query and nutrient decoding
//! - **RecordReconciler**: the single write path for stored records
//! - **ReconciliationCoordinator**: fan-out, fan-in and the batch outcome
//!
//! `bootstrap` wires the production implementations from configuration.

pub mod bootstrap;
pub mod candidate_selector;
pub mod completion;
pub mod credential_gate;
pub mod errors;
pub mod label_translator;
pub mod nutrition_lookup;
pub mod reconciliation_coordinator;
pub mod record_reconciler;

pub use bootstrap::{resolve_translation_key, MigrationBootstrap};
pub use candidate_selector::CandidateSelector;
pub use completion::{CandidateReport, CandidateResult, CompletionCounter};
pub use credential_gate::{CredentialGate, NutritionCredentials};
pub use errors::{ConfigError, LookupError};
pub use label_translator::LabelTranslator;
pub use nutrition_lookup::{decode_nutrients, NutritionLookup};
pub use reconciliation_coordinator::ReconciliationCoordinator;
pub use record_reconciler::{ApplyOutcome, RecordReconciler};
