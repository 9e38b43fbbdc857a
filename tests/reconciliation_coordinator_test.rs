//! Batch-level behaviour of the reconciliation coordinator

mod common;

use common::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use nutrition_migrator::client::TranslationError;
use nutrition_migrator::constants::events;
use nutrition_migrator::orchestration::LookupError;
use nutrition_migrator::{
    BatchOutcome, BatchState, CredentialStore, InMemoryCredentialStore, InMemoryRecordStore,
    RecordId,
};

fn apple() -> nutrition_migrator::client::NutritionResponse {
    nutrition_response(52.0, 0.26, 0.17, 13.81, &[("SUGAR", 10.39), ("FIBTG", 2.4)])
}

fn banana() -> nutrition_migrator::client::NutritionResponse {
    nutrition_response(89.0, 1.09, 0.33, 22.84, &[])
}

fn fruit_store() -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::with_records(vec![
        legacy_record("1", "яблоко"),
        legacy_record("2", "банан"),
    ]))
}

fn fruit_translation() -> FakeTranslation {
    FakeTranslation::with_dictionary(&[("яблоко", "apple"), ("банан", "banana")])
}

fn fruit_nutrition() -> FakeNutrition {
    FakeNutrition::new()
        .reply("100g apple", apple())
        .reply("100g banana", banana())
}

#[tokio::test]
async fn test_translated_records_are_migrated() {
    let harness = Harness::new(fruit_store(), fruit_translation(), fruit_nutrition());

    let outcome = harness.coordinator.reconcile().await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.processed_count, 2);
    assert_eq!(outcome.candidates_found, 2);
    assert_eq!(outcome.migrated_count, 2);
    assert_eq!(outcome.failed_count, 0);
    assert_eq!(outcome.state, BatchState::Completed);
    assert_eq!(
        outcome.message,
        "Migration completed. Processed 2 of 2 records (2 updated, 0 skipped, 0 not found)."
    );
    assert_eq!(
        harness.nutrition.queries(),
        vec!["100g apple".to_string(), "100g banana".to_string()]
    );

    let apple = harness.store.snapshot(&RecordId::new("1")).unwrap();
    assert_eq!(apple.calories, Some(52.0));
    assert_eq!(apple.sugar, Some(10.39));
    assert_eq!(apple.fiber, Some(2.4));
    assert_eq!(apple.name.as_deref(), Some("яблоко"));
    assert_eq!(apple.nutrition_source.as_deref(), Some("edamam"));

    let banana = harness.store.snapshot(&RecordId::new("2")).unwrap();
    assert_eq!(banana.calories, Some(89.0));
    // Provider omitted sugar: the stored value survives instead of becoming 0
    assert_eq!(banana.sugar, Some(7.5));
    assert_eq!(banana.nutrition_source.as_deref(), Some("edamam"));
}

#[tokio::test]
async fn test_callback_runs_exactly_once() {
    let harness = Harness::new(fruit_store(), fruit_translation(), fruit_nutrition());
    let calls: Arc<Mutex<Vec<(bool, String)>>> = Arc::new(Mutex::new(Vec::new()));

    let recorded = calls.clone();
    let outcome = harness
        .coordinator
        .reconcile_with_callback(move |succeeded, message| {
            recorded.lock().push((succeeded, message));
        })
        .await;

    let calls = calls.lock();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0);
    assert_eq!(calls[0].1, outcome.message);
}

#[tokio::test]
async fn test_empty_batch_completes_without_network_calls() {
    let store = Arc::new(InMemoryRecordStore::with_records(vec![migrated_record(
        "1", "яблоко",
    )]));
    let harness = Harness::new(store, fruit_translation(), fruit_nutrition());

    let outcome = harness.coordinator.reconcile().await;

    assert_eq!(outcome, BatchOutcome::nothing_to_migrate());
    assert_eq!(harness.translation.calls(), 0);
    assert_eq!(harness.nutrition.calls(), 0);
}

#[tokio::test]
async fn test_missing_credentials_never_reads_the_store() {
    let credentials = Arc::new(InMemoryCredentialStore::with_entries([(
        "edamam_app_id",
        "test-app-id",
    )]));
    let harness = Harness::with_config(
        fruit_store(),
        credentials,
        fruit_translation(),
        fruit_nutrition(),
        test_config(),
    );

    let outcome = harness.coordinator.reconcile().await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.processed_count, 0);
    assert_eq!(outcome.state, BatchState::Completed);
    assert!(outcome.message.contains("edamam_app_key"));
    assert_eq!(harness.store.query_count(), 0);
    assert_eq!(harness.translation.calls(), 0);
    assert_eq!(harness.store.update_count(), 0);
}

#[tokio::test]
async fn test_legacy_credential_is_retired() {
    let harness = Harness::new(fruit_store(), fruit_translation(), fruit_nutrition());

    harness.coordinator.reconcile().await;

    assert_eq!(harness.credentials.get("spoonacular_api_key"), None);
    assert_eq!(
        harness.nutrition.last_credentials().map(|c| c.app_id),
        Some("test-app-id".to_string())
    );
}

#[tokio::test]
async fn test_failed_lookup_is_counted_but_not_written() {
    let store = Arc::new(InMemoryRecordStore::with_records(vec![
        legacy_record("1", "яблоко"),
        legacy_record("2", "банан"),
        legacy_record("3", "груша"),
    ]));
    let translation = FakeTranslation::with_dictionary(&[
        ("яблоко", "apple"),
        ("банан", "banana"),
        ("груша", "pear"),
    ]);
    let nutrition = fruit_nutrition().fail("100g pear", LookupError::missing_nutrient("PROCNT"));
    let harness = Harness::new(store, translation, nutrition);

    let outcome = harness.coordinator.reconcile().await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.processed_count, 3);
    assert_eq!(outcome.migrated_count, 2);
    assert_eq!(outcome.failed_count, 1);
    assert_eq!(outcome.skipped_count, 1);

    let pear = harness.store.snapshot(&RecordId::new("3")).unwrap();
    assert_eq!(pear, legacy_record("3", "груша"));
}

#[tokio::test]
async fn test_all_failed_batch_still_succeeds() {
    let nutrition = FakeNutrition::new()
        .fail("100g apple", LookupError::Network("503".into()))
        .fail("100g banana", LookupError::Decode("not json".into()));
    let harness = Harness::new(fruit_store(), fruit_translation(), nutrition);

    let outcome = harness.coordinator.reconcile().await;

    assert!(outcome.succeeded);
    assert!(outcome.all_failed());
    assert_eq!(outcome.processed_count, 2);
    assert_eq!(harness.store.update_count(), 0);
}

#[tokio::test]
async fn test_record_deleted_mid_batch_is_a_noop() {
    let store = fruit_store();
    let nutrition =
        fruit_nutrition().delete_during("100g banana", store.clone(), RecordId::new("2"));
    let harness = Harness::new(store, fruit_translation(), nutrition);

    let outcome = harness.coordinator.reconcile().await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.processed_count, 2);
    assert_eq!(outcome.migrated_count, 1);
    assert_eq!(outcome.not_found_count, 1);
    assert_eq!(outcome.failed_count, 0);
    assert!(harness.store.snapshot(&RecordId::new("2")).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_delayed_translation_completes_once_after_all_workers() {
    let store = Arc::new(InMemoryRecordStore::with_records(vec![
        legacy_record("a", "яблоко"),
        legacy_record("b", "банан"),
        legacy_record("c", "груша"),
    ]));
    let translation = FakeTranslation::with_dictionary(&[
        ("яблоко", "apple"),
        ("банан", "banana"),
        ("груша", "pear"),
    ])
    .delay("банан", Duration::from_secs(3));
    let nutrition =
        fruit_nutrition().reply("100g pear", nutrition_response(57.0, 0.36, 0.14, 15.23, &[]));
    let harness = Harness::new(store, translation, nutrition);

    let callbacks = Arc::new(Mutex::new(0usize));
    let counter = callbacks.clone();
    let outcome = harness
        .coordinator
        .reconcile_with_callback(move |_, _| *counter.lock() += 1)
        .await;

    assert_eq!(*callbacks.lock(), 1);
    assert_eq!(outcome.processed_count, 3);
    assert_eq!(outcome.migrated_count, 3);
    assert_eq!(
        harness.translation.completion_order().last().map(String::as_str),
        Some("банан")
    );
}

#[tokio::test]
async fn test_second_run_is_the_empty_case() {
    let harness = Harness::new(fruit_store(), fruit_translation(), fruit_nutrition());

    let first = harness.coordinator.reconcile().await;
    let calls_after_first = harness.nutrition.calls();
    let second = harness.coordinator.reconcile().await;

    assert_eq!(first.migrated_count, 2);
    assert_eq!(second, BatchOutcome::nothing_to_migrate());
    assert_eq!(harness.nutrition.calls(), calls_after_first);
}

#[tokio::test]
async fn test_panicking_worker_still_reports() {
    let nutrition = FakeNutrition::new()
        .reply("100g apple", apple())
        .panic_on("100g banana");
    let harness = Harness::new(fruit_store(), fruit_translation(), nutrition);

    let outcome = harness.coordinator.reconcile().await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.processed_count, 2);
    assert_eq!(outcome.migrated_count, 1);
    assert_eq!(outcome.failed_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_ends_stuck_batch() {
    let mut config = test_config();
    config.migration.batch_timeout_seconds = Some(1);
    let translation = fruit_translation().delay("банан", Duration::from_secs(4));
    let harness = Harness::with_config(
        fruit_store(),
        valid_credentials(),
        translation,
        fruit_nutrition(),
        config,
    );

    let outcome = harness.coordinator.reconcile().await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.processed_count, 1);
    assert_eq!(outcome.candidates_found, 2);
    assert_eq!(outcome.state, BatchState::Completed);
    assert!(outcome.message.starts_with("Migration timed out"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_nutrition_lookup_is_bounded_without_watchdog() {
    let mut config = test_config();
    config.migration.watchdog_enabled = false;
    config.nutrition.timeout_seconds = 2;
    let nutrition = fruit_nutrition().delay("100g banana", Duration::from_secs(3600));
    let harness = Harness::with_config(
        fruit_store(),
        valid_credentials(),
        fruit_translation(),
        nutrition,
        config,
    );

    let started = tokio::time::Instant::now();
    let outcome = harness.coordinator.reconcile().await;

    assert!(started.elapsed() < Duration::from_secs(60));
    assert!(outcome.succeeded);
    assert_eq!(outcome.processed_count, 2);
    assert_eq!(outcome.migrated_count, 1);
    assert_eq!(outcome.failed_count, 1);

    let banana = harness.store.snapshot(&RecordId::new("2")).unwrap();
    assert_eq!(banana.nutrition_source.as_deref(), Some("spoonacular"));
}

#[tokio::test]
async fn test_selection_failure_fails_the_batch() {
    let store = fruit_store();
    store.set_unavailable(true);
    let harness = Harness::new(store, fruit_translation(), fruit_nutrition());

    let outcome = harness.coordinator.reconcile().await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.processed_count, 0);
    assert!(outcome.message.contains("could not read legacy records"));
    assert_eq!(harness.translation.calls(), 0);
}

#[tokio::test]
async fn test_translation_failure_uses_original_label() {
    let store = Arc::new(InMemoryRecordStore::with_records(vec![legacy_record(
        "1", "сыр",
    )]));
    let translation =
        FakeTranslation::new().fail("сыр", TranslationError::Status { status: 403 });
    let nutrition =
        FakeNutrition::new().reply("100g сыр", nutrition_response(350.0, 25.0, 27.0, 1.3, &[]));
    let harness = Harness::new(store, translation, nutrition);

    let outcome = harness.coordinator.reconcile().await;

    assert_eq!(outcome.migrated_count, 1);
    assert_eq!(harness.nutrition.queries(), vec!["100g сыр".to_string()]);
}

#[tokio::test]
async fn test_record_serving_basis_is_used_in_query() {
    let mut milk = legacy_record("1", "молоко");
    milk.serving_size = Some(250.0);
    milk.serving_unit = Some("ml".to_string());
    let store = Arc::new(InMemoryRecordStore::with_records(vec![milk]));
    let translation = FakeTranslation::with_dictionary(&[("молоко", "milk")]);
    let nutrition =
        FakeNutrition::new().reply("250ml milk", nutrition_response(150.0, 8.0, 8.0, 12.0, &[]));
    let harness = Harness::new(store, translation, nutrition);

    let outcome = harness.coordinator.reconcile().await;

    assert_eq!(outcome.migrated_count, 1);
}

#[tokio::test]
async fn test_malformed_records_are_not_candidates() {
    let mut unnamed = legacy_record("3", "");
    unnamed.name = None;
    let mut no_carbs = legacy_record("4", "хлеб");
    no_carbs.carbs = None;
    let store = Arc::new(InMemoryRecordStore::with_records(vec![
        legacy_record("1", "яблоко"),
        unnamed,
        no_carbs,
    ]));
    let harness = Harness::new(store, fruit_translation(), fruit_nutrition());

    let outcome = harness.coordinator.reconcile().await;

    assert_eq!(outcome.candidates_found, 1);
    assert_eq!(outcome.processed_count, 1);
    assert_eq!(harness.translation.calls(), 1);
}

#[tokio::test]
async fn test_record_without_identity_is_processed_as_not_found() {
    let mut no_id = legacy_record("unused", "хлеб");
    no_id.id = None;
    let store = Arc::new(InMemoryRecordStore::with_records(vec![
        legacy_record("1", "яблоко"),
        no_id,
    ]));
    let nutrition = fruit_nutrition().reply(
        "100g хлеб",
        nutrition_response(265.0, 9.0, 3.2, 49.0, &[]),
    );
    let harness = Harness::new(store.clone(), fruit_translation(), nutrition);

    let outcome = harness.coordinator.reconcile().await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.candidates_found, 2);
    assert_eq!(outcome.processed_count, 2);
    assert_eq!(outcome.migrated_count, 1);
    assert_eq!(outcome.not_found_count, 1);
    assert_eq!(
        outcome.message,
        "Migration completed. Processed 2 of 2 records (1 updated, 0 skipped, 1 not found)."
    );
    assert_eq!(store.update_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_worker_concurrency_is_bounded() {
    let records: Vec<_> = (0..10)
        .map(|i| legacy_record(&format!("r{i}"), &format!("label-{i}")))
        .collect();
    let mut translation = FakeTranslation::new();
    let mut nutrition = FakeNutrition::new();
    for i in 0..10 {
        let label = format!("label-{i}");
        translation = translation.delay(&label, Duration::from_millis(50));
        nutrition = nutrition.reply(
            &format!("100g {label}"),
            nutrition_response(1.0, 1.0, 1.0, 1.0, &[]),
        );
    }

    let mut config = test_config();
    config.migration.max_concurrent_workers = 3;
    let harness = Harness::with_config(
        Arc::new(InMemoryRecordStore::with_records(records)),
        valid_credentials(),
        translation,
        nutrition,
        config,
    );

    let outcome = harness.coordinator.reconcile().await;

    assert_eq!(outcome.migrated_count, 10);
    assert!(harness.translation.max_in_flight() <= 3);
    assert!(harness.translation.max_in_flight() >= 1);
}

#[tokio::test]
async fn test_lifecycle_events_are_published() {
    let harness = Harness::new(fruit_store(), fruit_translation(), fruit_nutrition());
    let mut receiver = harness.coordinator.event_publisher().subscribe();

    let outcome = harness.coordinator.reconcile().await;

    let mut names = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        names.push(event.name);
    }

    assert_eq!(names.first().map(String::as_str), Some(events::BATCH_STARTED));
    assert_eq!(names.last().map(String::as_str), Some(events::BATCH_COMPLETED));
    assert_eq!(
        names.iter().filter(|n| *n == events::CANDIDATE_MIGRATED).count(),
        outcome.migrated_count
    );
    assert_eq!(
        names.iter().filter(|n| *n == events::BATCH_PROGRESS).count(),
        outcome.processed_count
    );
}
