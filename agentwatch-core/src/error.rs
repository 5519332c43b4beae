//! Error types for AGENTWATCH core operations

use thiserror::Error;

/// Errors parsing run-configuration keys.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseKeyError {
    #[error("Unknown analyst key: {0}")]
    UnknownAnalyst(String),

    #[error("Unknown advisor key: {0}")]
    UnknownAdvisor(String),
}

/// Validation errors for run configurations and identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for AGENTWATCH core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WatchError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseKeyError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for AGENTWATCH core operations.
pub type WatchResult<T> = Result<T, WatchError>;
