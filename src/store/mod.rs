//! # Record Store
//!
//! The persistent food-record store is an external collaborator. The engine
//! only needs three operations from it, captured by [`RecordStore`]:
//!
//! - `query_by_provenance(tag)` for candidate selection
//! - `get(id)` to confirm a record still exists before writing
//! - `update(id, patch)` as the single mutation point
//!
//! Two implementations ship with the crate: [`InMemoryRecordStore`] for tests
//! and embedding, and [`SqliteRecordStore`] backed by an SQLx pool.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::models::{NutrientPatch, RecordId, StoredRecord};

pub use memory::InMemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// Errors raised by record store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records whose provenance tag contains `tag`, ignoring case
    async fn query_by_provenance(&self, tag: &str) -> Result<Vec<StoredRecord>, StoreError>;

    /// Record by identity, `None` when it no longer exists
    async fn get(&self, id: &RecordId) -> Result<Option<StoredRecord>, StoreError>;

    /// Apply a partial nutrient update. Returns `StoreError::NotFound` when no
    /// record carries `id`.
    async fn update(&self, id: &RecordId, patch: &NutrientPatch) -> Result<(), StoreError>;
}

/// Case-insensitive substring match used for provenance filtering
pub(crate) fn provenance_matches(source: Option<&str>, tag: &str) -> bool {
    source
        .map(|source| source.to_lowercase().contains(&tag.to_lowercase()))
        .unwrap_or(false)
}
