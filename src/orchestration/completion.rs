//! # Completion Tracking
//!
//! Fan-in side of a batch. Each worker sends exactly one [`CandidateReport`];
//! a single collector owns the [`CompletionCounter`] and is the only party
//! that can observe `finished == total`.

use serde::{Deserialize, Serialize};

use crate::models::RecordId;

/// Terminal result of one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CandidateResult {
    /// Nutrients re-derived and written under the new provenance
    Migrated,
    /// Record deleted between selection and write
    NotFound,
    /// Lookup or write failed; the record was left untouched
    Skipped { reason: String },
}

impl CandidateResult {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Migrated => "migrated",
            Self::NotFound => "not_found",
            Self::Skipped { .. } => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    pub record_id: RecordId,
    /// Label actually sent to the nutrition provider, when one was computed
    pub translated_label: Option<String>,
    pub result: CandidateResult,
}

/// Batch-scoped completion state. Not shared; owned by the collector loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCounter {
    pub finished: usize,
    pub total: usize,
    pub migrated: usize,
    pub not_found: usize,
    pub skipped: usize,
}

impl CompletionCounter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Record one finished candidate. Returns `true` only on the report that
    /// makes the batch complete; reports past `total` are ignored.
    pub fn record(&mut self, result: &CandidateResult) -> bool {
        if self.is_complete() {
            return false;
        }

        self.finished += 1;
        match result {
            CandidateResult::Migrated => self.migrated += 1,
            CandidateResult::NotFound => self.not_found += 1,
            CandidateResult::Skipped { .. } => self.skipped += 1,
        }

        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.finished >= self.total
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.finished)
    }

    /// Human-readable batch summary used as the outcome message
    pub fn summary(&self) -> String {
        format!(
            "Processed {} of {} records ({} updated, {} skipped, {} not found).",
            self.finished, self.total, self.migrated, self.skipped, self.not_found
        )
    }
}
