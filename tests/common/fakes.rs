//! In-process stand-ins for the translation and nutrition services

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nutrition_migrator::client::{
    NutrientQuantity, NutritionProvider, NutritionResponse, TranslationError, TranslationRequest,
    TranslationService,
};
use nutrition_migrator::orchestration::{LookupError, NutritionCredentials};
use nutrition_migrator::{InMemoryRecordStore, RecordId};

/// Dictionary-backed translation with optional per-label delays and failures
#[derive(Default)]
pub struct FakeTranslation {
    dictionary: DashMap<String, String>,
    delays: DashMap<String, Duration>,
    failing: DashMap<String, TranslationError>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl FakeTranslation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dictionary(entries: &[(&str, &str)]) -> Self {
        let fake = Self::new();
        for (source, target) in entries {
            fake.dictionary.insert(source.to_string(), target.to_string());
        }
        fake
    }

    pub fn delay(self, label: &str, delay: Duration) -> Self {
        self.delays.insert(label.to_string(), delay);
        self
    }

    pub fn fail(self, label: &str, error: TranslationError) -> Self {
        self.failing.insert(label.to_string(), error);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of translations observed running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Labels in the order their translation finished
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().clone()
    }
}

#[async_trait]
impl TranslationService for FakeTranslation {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = self.delays.get(&request.text).map(|d| *d);
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().push(request.text.clone());

        if let Some(error) = self.failing.get(&request.text) {
            return Err(error.clone());
        }

        Ok(self
            .dictionary
            .get(&request.text)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| request.text.clone()))
    }
}

enum ScriptedLookup {
    Reply(NutritionResponse),
    Fail(LookupError),
    Panic,
}

/// Nutrition provider answering from a script keyed by ingredient query
#[derive(Default)]
pub struct FakeNutrition {
    script: DashMap<String, ScriptedLookup>,
    deletions: DashMap<String, (Arc<InMemoryRecordStore>, RecordId)>,
    delays: DashMap<String, Duration>,
    queries: Mutex<Vec<String>>,
    last_credentials: Mutex<Option<NutritionCredentials>>,
    calls: AtomicUsize,
}

impl FakeNutrition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, ingredient: &str, response: NutritionResponse) -> Self {
        self.script
            .insert(ingredient.to_string(), ScriptedLookup::Reply(response));
        self
    }

    pub fn fail(self, ingredient: &str, error: LookupError) -> Self {
        self.script
            .insert(ingredient.to_string(), ScriptedLookup::Fail(error));
        self
    }

    pub fn panic_on(self, ingredient: &str) -> Self {
        self.script
            .insert(ingredient.to_string(), ScriptedLookup::Panic);
        self
    }

    /// Hold the answer for `ingredient` back by `delay`
    pub fn delay(self, ingredient: &str, delay: Duration) -> Self {
        self.delays.insert(ingredient.to_string(), delay);
        self
    }

    /// Delete `id` from `store` while answering `ingredient`, mimicking a user
    /// removing the record mid-batch
    pub fn delete_during(
        self,
        ingredient: &str,
        store: Arc<InMemoryRecordStore>,
        id: RecordId,
    ) -> Self {
        self.deletions.insert(ingredient.to_string(), (store, id));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        let mut queries = self.queries.lock().clone();
        queries.sort();
        queries
    }

    pub fn last_credentials(&self) -> Option<NutritionCredentials> {
        self.last_credentials.lock().clone()
    }
}

#[async_trait]
impl NutritionProvider for FakeNutrition {
    async fn nutrition_data(
        &self,
        credentials: &NutritionCredentials,
        ingredient: &str,
    ) -> Result<NutritionResponse, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(ingredient.to_string());
        *self.last_credentials.lock() = Some(credentials.clone());

        let delay = self.delays.get(ingredient).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(entry) = self.deletions.get(ingredient) {
            let (store, id) = entry.value();
            store.remove(id);
        }

        let scripted = self.script.get(ingredient);
        match scripted.as_deref() {
            Some(ScriptedLookup::Reply(response)) => Ok(response.clone()),
            Some(ScriptedLookup::Fail(error)) => Err(error.clone()),
            Some(ScriptedLookup::Panic) => panic!("scripted panic for {ingredient}"),
            None => Err(LookupError::Network(format!("no script for {ingredient}"))),
        }
    }
}

/// Provider response with the four required nutrients plus the given extras
pub fn nutrition_response(
    calories: f64,
    protein: f64,
    fat: f64,
    carbs: f64,
    extras: &[(&str, f64)],
) -> NutritionResponse {
    let mut total_nutrients = HashMap::new();
    for (code, quantity) in [
        ("ENERC_KCAL", calories),
        ("PROCNT", protein),
        ("FAT", fat),
        ("CHOCDF", carbs),
    ]
    .into_iter()
    .chain(extras.iter().copied())
    {
        total_nutrients.insert(
            code.to_string(),
            NutrientQuantity {
                quantity,
                unit: "g".to_string(),
            },
        );
    }
    NutritionResponse { total_nutrients }
}
