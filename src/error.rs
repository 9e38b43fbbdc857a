use std::fmt;

use crate::config::ConfigurationError;
use crate::orchestration::errors::{ConfigError, LookupError};
use crate::state_machine::StateTransitionError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum MigratorError {
    ConfigurationError(String),
    CredentialError(String),
    StoreError(String),
    LookupError(String),
    StateTransitionError(String),
}

impl fmt::Display for MigratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigratorError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            MigratorError::CredentialError(msg) => write!(f, "Credential error: {msg}"),
            MigratorError::StoreError(msg) => write!(f, "Store error: {msg}"),
            MigratorError::LookupError(msg) => write!(f, "Lookup error: {msg}"),
            MigratorError::StateTransitionError(msg) => write!(f, "State transition error: {msg}"),
        }
    }
}

impl std::error::Error for MigratorError {}

impl From<ConfigurationError> for MigratorError {
    fn from(err: ConfigurationError) -> Self {
        MigratorError::ConfigurationError(err.to_string())
    }
}

impl From<ConfigError> for MigratorError {
    fn from(err: ConfigError) -> Self {
        MigratorError::CredentialError(err.to_string())
    }
}

impl From<StoreError> for MigratorError {
    fn from(err: StoreError) -> Self {
        MigratorError::StoreError(err.to_string())
    }
}

impl From<LookupError> for MigratorError {
    fn from(err: LookupError) -> Self {
        MigratorError::LookupError(err.to_string())
    }
}

impl From<StateTransitionError> for MigratorError {
    fn from(err: StateTransitionError) -> Self {
        MigratorError::StateTransitionError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MigratorError>;
