use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{provenance_matches, RecordStore, StoreError};
use crate::models::{NutrientPatch, RecordId, StoredRecord};

/// Concurrent in-memory record store.
///
/// Records without an identity are kept apart: they can be selected but never
/// addressed by `get` or `update`, which is how legacy rows written before ids
/// existed behave in the real store.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: DashMap<RecordId, StoredRecord>,
    unkeyed: Mutex<Vec<StoredRecord>>,
    update_count: AtomicUsize,
    query_count: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = StoredRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&self, record: StoredRecord) {
        match record.id.clone() {
            Some(id) => {
                self.records.insert(id, record);
            }
            None => self.unkeyed.lock().push(record),
        }
    }

    /// Delete a record, e.g. to mimic a user removing it mid-migration
    pub fn remove(&self, id: &RecordId) -> Option<StoredRecord> {
        self.records.remove(id).map(|(_, record)| record)
    }

    pub fn snapshot(&self, id: &RecordId) -> Option<StoredRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len() + self.unkeyed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful updates applied
    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    /// Number of provenance queries served
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    /// Make every subsequent query fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn query_by_provenance(&self, tag: &str) -> Result<Vec<StoredRecord>, StoreError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }

        let mut matches: Vec<StoredRecord> = self
            .records
            .iter()
            .filter(|entry| provenance_matches(entry.nutrition_source.as_deref(), tag))
            .map(|entry| entry.value().clone())
            .collect();

        matches.extend(
            self.unkeyed
                .lock()
                .iter()
                .filter(|record| provenance_matches(record.nutrition_source.as_deref(), tag))
                .cloned(),
        );

        Ok(matches)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.snapshot(id))
    }

    async fn update(&self, id: &RecordId, patch: &NutrientPatch) -> Result<(), StoreError> {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        patch.apply_to(entry.value_mut());
        self.update_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
