//! # Reconciliation Coordinator
//!
//! Runs one migration batch end to end and produces exactly one
//! [`BatchOutcome`].
//!
//! ## Phases
//!
//! 1. **Gate**: retire the legacy credential, then require both new-provider
//!    credentials. Failure ends the batch before the store is touched.
//! 2. **Select**: read legacy-tagged records. An empty result completes the
//!    batch successfully without any network traffic.
//! 3. **Fan out**: one tokio task per candidate, bounded by a semaphore. Each
//!    task runs translate, lookup and write in that order.
//! 4. **Fan in**: every task sends one [`CandidateReport`] over an mpsc
//!    channel. The collector loop below owns the [`CompletionCounter`] and
//!    finishes when `finished == total`, or when the watchdog deadline passes.
//!
//! Per-candidate failures never fail the batch; they are counted in
//! `failed_count`. Only the gate, the selection query and the watchdog set
//! `succeeded = false`.

use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::client::{NutritionProvider, TranslationService};
use crate::config::MigratorConfig;
use crate::constants::events;
use crate::credentials::CredentialStore;
use crate::events::EventPublisher;
use crate::logging::{log_batch_operation, log_candidate_operation, log_error};
use crate::models::{BatchOutcome, MigrationCandidate};
use crate::orchestration::candidate_selector::CandidateSelector;
use crate::orchestration::completion::{CandidateReport, CandidateResult, CompletionCounter};
use crate::orchestration::credential_gate::CredentialGate;
use crate::orchestration::label_translator::LabelTranslator;
use crate::orchestration::nutrition_lookup::NutritionLookup;
use crate::orchestration::record_reconciler::{ApplyOutcome, RecordReconciler};
use crate::state_machine::{BatchEvent, BatchState, BatchStateMachine};
use crate::store::RecordStore;

/// How the fan-in loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionEnd {
    AllReported,
    DeadlineExceeded(Duration),
    WorkersGone,
}

pub struct ReconciliationCoordinator {
    config: Arc<MigratorConfig>,
    records: Arc<dyn RecordStore>,
    credentials: Arc<dyn CredentialStore>,
    translation: Arc<dyn TranslationService>,
    nutrition: Arc<dyn NutritionProvider>,
    event_publisher: EventPublisher,
}

impl ReconciliationCoordinator {
    pub fn new(
        config: Arc<MigratorConfig>,
        records: Arc<dyn RecordStore>,
        credentials: Arc<dyn CredentialStore>,
        translation: Arc<dyn TranslationService>,
        nutrition: Arc<dyn NutritionProvider>,
    ) -> Self {
        let event_publisher = EventPublisher::new(config.migration.event_channel_capacity);
        Self::with_event_publisher(
            config,
            records,
            credentials,
            translation,
            nutrition,
            event_publisher,
        )
    }

    pub fn with_event_publisher(
        config: Arc<MigratorConfig>,
        records: Arc<dyn RecordStore>,
        credentials: Arc<dyn CredentialStore>,
        translation: Arc<dyn TranslationService>,
        nutrition: Arc<dyn NutritionProvider>,
        event_publisher: EventPublisher,
    ) -> Self {
        Self {
            config,
            records,
            credentials,
            translation,
            nutrition,
            event_publisher,
        }
    }

    pub fn event_publisher(&self) -> &EventPublisher {
        &self.event_publisher
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Run one batch and hand the result to `on_complete` on the calling
    /// task. The callback runs exactly once, after the outcome is final.
    pub async fn reconcile_with_callback<F>(&self, on_complete: F) -> BatchOutcome
    where
        F: FnOnce(bool, String),
    {
        let outcome = self.reconcile().await;
        on_complete(outcome.succeeded, outcome.message.clone());
        outcome
    }

    /// Run one batch
    pub async fn reconcile(&self) -> BatchOutcome {
        let batch_id = Uuid::new_v4().to_string();
        self.run_batch(&batch_id).await
    }

    #[instrument(skip_all, fields(batch_id = %batch_id))]
    async fn run_batch(&self, batch_id: &str) -> BatchOutcome {
        let mut machine = BatchStateMachine::new(batch_id);
        log_batch_operation("reconcile", batch_id, None, "starting", None);

        // Phase 1: credentials
        let gate = CredentialGate::new(self.credentials.clone(), self.config.credentials.clone());
        gate.retire_legacy_credentials();
        let credentials = match gate.check_credentials() {
            Ok(credentials) => credentials,
            Err(e) => {
                return self.abort(&mut machine, format!("Migration failed: {e}"));
            }
        };
        self.advance(&mut machine, BatchEvent::CredentialsVerified);

        // Phase 2: candidate selection
        let selector = CandidateSelector::new(
            self.records.clone(),
            self.config.providers.clone(),
            self.config.nutrition.default_serving(),
        );
        let candidates = match selector.select_candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                log_error("coordinator", "select_candidates", &e.to_string(), Some(batch_id));
                return self.abort(
                    &mut machine,
                    format!("Migration failed: could not read legacy records: {e}"),
                );
            }
        };

        if candidates.is_empty() {
            self.advance(&mut machine, BatchEvent::Complete);
            let outcome = BatchOutcome::nothing_to_migrate();
            self.publish_completed(batch_id, &outcome);
            return outcome;
        }

        // Phase 3: fan out
        let total = candidates.len();
        self.advance(&mut machine, BatchEvent::Start(total));
        log_batch_operation("reconcile", batch_id, Some(total), "running", None);
        self.event_publisher.publish(
            events::BATCH_STARTED,
            batch_id,
            json!({
                "total": total,
                "max_concurrent_workers": self.config.migration.max_concurrent_workers,
            }),
        );

        let worker = Arc::new(CandidateWorker {
            translator: LabelTranslator::new(self.translation.clone(), &self.config.translation),
            lookup: NutritionLookup::new(
                self.nutrition.clone(),
                credentials,
                self.config.nutrition.timeout(),
            ),
            reconciler: RecordReconciler::new(
                self.records.clone(),
                self.config.providers.new_tag.clone(),
            ),
        });
        let (report_tx, report_rx) = mpsc::channel::<CandidateReport>(total);
        let handles = self.spawn_workers(worker, candidates, report_tx);

        // Phase 4: fan in
        let mut counter = CompletionCounter::new(total);
        let end = self.collect_reports(batch_id, report_rx, &mut counter).await;

        let (succeeded, message) = match end {
            CollectionEnd::AllReported => {
                (true, format!("Migration completed. {}", counter.summary()))
            }
            CollectionEnd::DeadlineExceeded(deadline) => {
                for handle in &handles {
                    handle.abort();
                }
                warn!(
                    batch_id = batch_id,
                    outstanding = counter.remaining(),
                    deadline_secs = deadline.as_secs(),
                    "⏰ Batch watchdog fired, aborting outstanding workers"
                );
                (
                    false,
                    format!(
                        "Migration timed out after {}s. {}",
                        deadline.as_secs(),
                        counter.summary()
                    ),
                )
            }
            CollectionEnd::WorkersGone => (
                false,
                format!(
                    "Migration interrupted: workers exited without reporting. {}",
                    counter.summary()
                ),
            ),
        };

        let event = if succeeded {
            BatchEvent::Complete
        } else {
            BatchEvent::abort_with(message.clone())
        };
        let state = self.advance(&mut machine, event);

        let outcome = BatchOutcome {
            succeeded,
            processed_count: counter.finished,
            message,
            candidates_found: total,
            migrated_count: counter.migrated,
            not_found_count: counter.not_found,
            skipped_count: counter.skipped,
            failed_count: counter.skipped,
            state,
        };

        if outcome.all_failed() {
            warn!(
                batch_id = batch_id,
                failed = outcome.failed_count,
                "⚠️ Every candidate failed"
            );
        }
        self.publish_completed(batch_id, &outcome);
        outcome
    }

    fn spawn_workers(
        &self,
        worker: Arc<CandidateWorker>,
        candidates: Vec<MigrationCandidate>,
        report_tx: mpsc::Sender<CandidateReport>,
    ) -> Vec<JoinHandle<()>> {
        let permits = self.config.migration.max_concurrent_workers.max(1);
        let semaphore = Arc::new(Semaphore::new(permits));

        candidates
            .into_iter()
            .map(|candidate| {
                let worker = worker.clone();
                let semaphore = semaphore.clone();
                let report_tx = report_tx.clone();

                tokio::spawn(async move {
                    let record_id = candidate.id.clone();
                    let report = match semaphore.acquire_owned().await {
                        Ok(_permit) => {
                            match AssertUnwindSafe(worker.process(&candidate))
                                .catch_unwind()
                                .await
                            {
                                Ok(report) => report,
                                Err(_) => {
                                    log_error(
                                        "coordinator",
                                        "process_candidate",
                                        "worker panicked",
                                        Some(record_id.as_str()),
                                    );
                                    CandidateReport {
                                        record_id,
                                        translated_label: None,
                                        result: CandidateResult::skipped("worker panicked"),
                                    }
                                }
                            }
                        }
                        Err(_) => CandidateReport {
                            record_id,
                            translated_label: None,
                            result: CandidateResult::skipped("worker pool closed"),
                        },
                    };

                    if report_tx.send(report).await.is_err() {
                        debug!("Collector already finished, dropping candidate report");
                    }
                })
            })
            .collect()
    }

    async fn collect_reports(
        &self,
        batch_id: &str,
        mut report_rx: mpsc::Receiver<CandidateReport>,
        counter: &mut CompletionCounter,
    ) -> CollectionEnd {
        let watchdog = self
            .config
            .batch_deadline(counter.total)
            .and_then(|d| Instant::now().checked_add(d).map(|at| (at, d)));

        loop {
            let next = match watchdog {
                Some((expires_at, deadline)) => tokio::select! {
                    report = report_rx.recv() => report,
                    _ = tokio::time::sleep_until(expires_at) => {
                        return CollectionEnd::DeadlineExceeded(deadline);
                    }
                },
                None => report_rx.recv().await,
            };

            let Some(report) = next else {
                return CollectionEnd::WorkersGone;
            };

            let complete = counter.record(&report.result);
            self.publish_report(batch_id, &report, counter);

            if complete {
                return CollectionEnd::AllReported;
            }
        }
    }

    fn advance(&self, machine: &mut BatchStateMachine, event: BatchEvent) -> BatchState {
        if let Err(e) = machine.transition(event) {
            log_error(
                "coordinator",
                "state_transition",
                &e.to_string(),
                Some(machine.batch_id()),
            );
        }
        machine.current_state()
    }

    fn abort(&self, machine: &mut BatchStateMachine, message: String) -> BatchOutcome {
        warn!(batch_id = machine.batch_id(), reason = %message, "🛑 Batch aborted");
        let state = self.advance(machine, BatchEvent::abort_with(message.clone()));

        let mut outcome = BatchOutcome::aborted(message);
        outcome.state = state;
        self.publish_completed(machine.batch_id(), &outcome);
        outcome
    }

    fn publish_report(
        &self,
        batch_id: &str,
        report: &CandidateReport,
        counter: &CompletionCounter,
    ) {
        let name = match report.result {
            CandidateResult::Migrated => events::CANDIDATE_MIGRATED,
            CandidateResult::NotFound => events::CANDIDATE_NOT_FOUND,
            CandidateResult::Skipped { .. } => events::CANDIDATE_SKIPPED,
        };
        if let Err(e) = self.event_publisher.publish_serialized(name, batch_id, report) {
            debug!(error = %e, "Could not encode candidate report");
        }

        info!(
            batch_id = batch_id,
            finished = counter.finished,
            total = counter.total,
            "📈 Processed {} of {} records",
            counter.finished,
            counter.total
        );
        self.event_publisher.publish(
            events::BATCH_PROGRESS,
            batch_id,
            json!({ "finished": counter.finished, "total": counter.total }),
        );
    }

    fn publish_completed(&self, batch_id: &str, outcome: &BatchOutcome) {
        let status = if outcome.succeeded { "completed" } else { "failed" };
        log_batch_operation(
            "reconcile",
            batch_id,
            Some(outcome.candidates_found),
            status,
            Some(&outcome.message),
        );

        if let Err(e) = self
            .event_publisher
            .publish_serialized(events::BATCH_COMPLETED, batch_id, outcome)
        {
            debug!(error = %e, "Could not encode batch outcome");
        }
    }
}

/// Per-candidate pipeline shared read-only by every worker task
struct CandidateWorker {
    translator: LabelTranslator,
    lookup: NutritionLookup,
    reconciler: RecordReconciler,
}

impl CandidateWorker {
    async fn process(&self, candidate: &MigrationCandidate) -> CandidateReport {
        let record_id = candidate.id.clone();
        let translated = self.translator.translate(&candidate.display_label).await;

        let nutrients = match self
            .lookup
            .fetch(&translated, &candidate.legacy_nutrients.serving)
            .await
        {
            Ok(nutrients) => nutrients,
            Err(e) => {
                warn!(
                    record_id = %record_id,
                    label = %translated,
                    kind = e.kind(),
                    error = %e,
                    "⚠️ Nutrition lookup failed, leaving record untouched"
                );
                return CandidateReport {
                    record_id,
                    translated_label: Some(translated),
                    result: CandidateResult::skipped(e.to_string()),
                };
            }
        };

        let result = match self.reconciler.apply(&record_id, &nutrients).await {
            Ok(ApplyOutcome::Applied) => CandidateResult::Migrated,
            Ok(ApplyOutcome::NotFound) => CandidateResult::NotFound,
            Err(e) => {
                log_error(
                    "record_reconciler",
                    "apply",
                    &e.to_string(),
                    Some(record_id.as_str()),
                );
                CandidateResult::skipped(e.to_string())
            }
        };

        log_candidate_operation(
            "reconcile",
            record_id.as_str(),
            Some(&translated),
            result.status(),
            None,
        );

        CandidateReport {
            record_id,
            translated_label: Some(translated),
            result,
        }
    }
}
