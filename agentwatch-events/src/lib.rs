//! AgentWatch Events - Event Log, Monitor Session and Summary Reconciliation
//!
//! This crate owns the mutable side of live telemetry: the append-only event
//! log of one job, the latest authoritative summary, and the session object
//! that ties them to a cached progress snapshot.
//!
//! # Architecture
//!
//! Two asynchronous sources feed one session:
//!
//! ```text
//! push (SSE)  ─► MonitorSession::ingest ─► EventLog ─┐
//!                                                     ├─► derive ─► ProgressSnapshot
//! pull (REST) ─► MonitorSession::apply_summary ─► merge ┘
//! ```
//!
//! # Traits
//!
//! - `EventLog`: ordered, de-duplicating event storage
//! - `EventLogExt`: derived views over any log
//! - `SummaryMerge`: monotonic summary merge

mod error;
mod log;
mod reconcile;
mod session;

pub use error::{IngestError, IngestResult};
pub use log::{AppendOutcome, EventLog, EventLogExt, InMemoryEventLog};
pub use reconcile::{advance_status, SummaryMerge};
pub use session::{parse_event, IngestOutcome, MonitorSession, SessionPhase};

// Re-export core types for convenience
pub use agentwatch_core::{
    ActivityRecord, JobId, JobStatus, JobSummary, ProgressSnapshot, RawEvent, RunConfiguration,
    Topology,
};
