//! Event types for the TUI event loop.

use crate::api_client::ArchiveListing;
use crate::realtime::FileContent;
use agentwatch_core::{JobId, JobSummary, RawEvent};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Resize { width: u16, height: u16 },
    /// One pushed event for `job_id`.
    Event { job_id: JobId, event: Box<RawEvent> },
    /// The push stream for `job_id` ended or failed.
    StreamClosed { job_id: JobId, reason: String },
    /// Result of one summary pull for `job_id`.
    Summary {
        job_id: JobId,
        result: Result<JobSummary, String>,
    },
    /// A file requested from the Reports view.
    FileLoaded {
        job_id: JobId,
        name: String,
        result: Result<FileContent, String>,
    },
    /// Result of listing the archive directory of `job_id`.
    ArchiveListed {
        job_id: JobId,
        result: Result<ArchiveListing, String>,
    },
}
