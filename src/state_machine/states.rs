use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one migration batch invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// Batch created, nothing checked yet
    #[default]
    Idle,
    /// New provider credentials verified
    CredentialsChecked,
    /// Workers are processing candidates
    Running,
    /// Outcome produced; reached exactly once
    Completed,
}

impl BatchState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::CredentialsChecked => write!(f, "credentials_checked"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for BatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "credentials_checked" => Ok(Self::CredentialsChecked),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid batch state: {s}")),
        }
    }
}
