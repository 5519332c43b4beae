//! Ingestion errors.

use agentwatch_core::JobId;
use thiserror::Error;

/// Reasons a pushed event is not added to the session log.
///
/// None of these are fatal: the caller drops the event and carries on.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Event payload is not a JSON object")]
    NotAnObject,

    #[error("Session is closed and no longer accepts pushed events")]
    SessionClosed,

    #[error("Event for job {got} delivered to session for job {expected}")]
    WrongJob { expected: JobId, got: JobId },
}

pub type IngestResult<T> = Result<T, IngestError>;
