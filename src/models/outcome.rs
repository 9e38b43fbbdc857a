use serde::{Deserialize, Serialize};

use crate::state_machine::BatchState;

/// The single value a batch invocation hands back to its caller.
///
/// `succeeded` is false only when the credential gate, candidate selection or
/// the batch watchdog ended the run. Per-record failures show up in
/// `failed_count` and leave `succeeded` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub succeeded: bool,
    pub processed_count: usize,
    pub message: String,
    pub candidates_found: usize,
    pub migrated_count: usize,
    pub not_found_count: usize,
    /// Candidates whose lookup or write failed
    pub skipped_count: usize,
    /// Same as `skipped_count`; kept under the name callers check for failures
    pub failed_count: usize,
    pub state: BatchState,
}

impl BatchOutcome {
    /// Gate or selection failure before any worker ran
    pub fn aborted(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            processed_count: 0,
            message: message.into(),
            candidates_found: 0,
            migrated_count: 0,
            not_found_count: 0,
            skipped_count: 0,
            failed_count: 0,
            state: BatchState::Completed,
        }
    }

    /// Nothing carried the legacy tag
    pub fn nothing_to_migrate() -> Self {
        Self {
            succeeded: true,
            processed_count: 0,
            message: "Migration not required. No records from the legacy provider.".to_string(),
            candidates_found: 0,
            migrated_count: 0,
            not_found_count: 0,
            skipped_count: 0,
            failed_count: 0,
            state: BatchState::Completed,
        }
    }

    /// True when every processed candidate failed its lookup or write
    pub fn all_failed(&self) -> bool {
        self.processed_count > 0 && self.failed_count == self.processed_count
    }
}
