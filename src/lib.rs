#![allow(clippy::doc_markdown)] // Allow technical terms like SQLite, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Nutrition Migrator
//!
//! Provider-migration reconciliation engine for stored food records.
//!
//! ## Overview
//!
//! Food records whose nutrition facts came from a retired provider are
//! re-derived from a new provider. For each record the engine translates the
//! label into the new provider's input language, fetches fresh nutrients and
//! writes them back under the same identity with updated provenance. The
//! whole batch reports back exactly once.
//!
//! ## Architecture
//!
//! - [`orchestration`] - gate, selection, per-candidate pipeline and the
//!   fan-out/fan-in coordinator
//! - [`client`] - translation and nutrition provider clients
//! - [`store`] - record store trait with in-memory and SQLite backends
//! - [`credentials`] - credential store trait and in-memory implementation
//! - [`state_machine`] - batch lifecycle states and transitions
//! - [`events`] - broadcast lifecycle events
//! - [`config`] - YAML configuration with environment overrides
//! - [`models`] - records, candidates, nutrient sets and batch outcomes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nutrition_migrator::orchestration::MigrationBootstrap;
//!
//! # async fn example() -> nutrition_migrator::Result<()> {
//! let bootstrap = MigrationBootstrap::from_default_config().await?;
//! let outcome = bootstrap
//!     .coordinator
//!     .reconcile_with_callback(|succeeded, message| {
//!         println!("finished (succeeded = {succeeded}): {message}");
//!     })
//!     .await;
//! assert_eq!(outcome.processed_count, outcome.candidates_found);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod state_machine;
pub mod store;

pub use config::{ConfigManager, MigratorConfig};
pub use credentials::{CredentialStore, InMemoryCredentialStore};
pub use error::{MigratorError, Result};
pub use events::{EventPublisher, PublishedEvent};
pub use models::{
    BatchOutcome, MigrationCandidate, NutrientPatch, NutrientSet, Provenance, RecordId,
    ServingBasis, StoredRecord,
};
pub use orchestration::{ConfigError, LookupError, ReconciliationCoordinator};
pub use state_machine::{BatchEvent, BatchState, BatchStateMachine};
pub use store::{InMemoryRecordStore, RecordStore, SqliteRecordStore, StoreError};
