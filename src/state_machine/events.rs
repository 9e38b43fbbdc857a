use serde::{Deserialize, Serialize};

/// Events that drive a batch through its lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BatchEvent {
    /// Credential gate passed
    CredentialsVerified,
    /// Fan-out started for this many candidates
    Start(usize),
    /// Every candidate reported, or there was nothing to do
    Complete,
    /// Gate, selection or watchdog ended the batch early
    Abort(String),
}

impl BatchEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CredentialsVerified => "credentials_verified",
            Self::Start(_) => "start",
            Self::Complete => "complete",
            Self::Abort(_) => "abort",
        }
    }

    pub fn abort_with(reason: impl Into<String>) -> Self {
        Self::Abort(reason.into())
    }
}
