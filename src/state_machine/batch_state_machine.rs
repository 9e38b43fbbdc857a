use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::events::BatchEvent;
use super::states::BatchState;

/// Rejected batch transition
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateTransitionError {
    #[error("Invalid transition from {from} on event {event}")]
    InvalidTransition { from: BatchState, event: String },

    #[error("Batch {batch_id} already completed")]
    AlreadyCompleted { batch_id: String },
}

/// One applied transition, kept for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: BatchState,
    pub to: BatchState,
    pub event: String,
    pub at: DateTime<Utc>,
}

/// In-memory state machine for a single batch invocation
#[derive(Debug)]
pub struct BatchStateMachine {
    batch_id: String,
    state: BatchState,
    history: Vec<StateTransition>,
}

impl BatchStateMachine {
    pub fn new(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            state: BatchState::default(),
            history: Vec::new(),
        }
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn current_state(&self) -> BatchState {
        self.state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Apply an event and return the new state
    pub fn transition(&mut self, event: BatchEvent) -> Result<BatchState, StateTransitionError> {
        let target = self.determine_target_state(&event)?;

        debug!(
            batch_id = %self.batch_id,
            from = %self.state,
            to = %target,
            event = event.event_type(),
            "🔀 Batch state transition"
        );

        self.history.push(StateTransition {
            from: self.state,
            to: target,
            event: event.event_type().to_string(),
            at: Utc::now(),
        });
        self.state = target;

        Ok(target)
    }

    fn determine_target_state(
        &self,
        event: &BatchEvent,
    ) -> Result<BatchState, StateTransitionError> {
        let target = match (self.state, event) {
            (BatchState::Completed, _) => {
                return Err(StateTransitionError::AlreadyCompleted {
                    batch_id: self.batch_id.clone(),
                })
            }

            (BatchState::Idle, BatchEvent::CredentialsVerified) => BatchState::CredentialsChecked,
            (BatchState::CredentialsChecked, BatchEvent::Start(_)) => BatchState::Running,

            // Empty candidate set completes without entering Running
            (BatchState::CredentialsChecked, BatchEvent::Complete) => BatchState::Completed,
            (BatchState::Running, BatchEvent::Complete) => BatchState::Completed,

            (_, BatchEvent::Abort(_)) => BatchState::Completed,

            (from, event) => {
                return Err(StateTransitionError::InvalidTransition {
                    from,
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }
}
