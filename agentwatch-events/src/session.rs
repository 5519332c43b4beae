//! Monitor session: one job's log, summary and derived progress.

use crate::error::{IngestError, IngestResult};
use crate::log::{AppendOutcome, EventLog, EventLogExt, InMemoryEventLog};
use crate::reconcile::SummaryMerge;
use agentwatch_core::{
    derive, ActivityRecord, JobId, JobStatus, JobSummary, ProgressSnapshot, RawEvent,
    RunConfiguration, Topology,
};
use serde_json::Value;

/// Whether the session still accepts pushed events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Streaming,
    Closed { reason: String },
}

/// Result of ingesting one pushed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    pub append: AppendOutcome,
    /// The event signals new artifacts or a terminal state; pull the summary.
    pub pull_summary: bool,
}

/// Owned state of one monitoring session.
///
/// Holds the event log and the latest merged summary, and caches the timeline
/// and progress snapshot derived from them. Every accepted event or summary
/// re-derives both caches from scratch.
#[derive(Debug)]
pub struct MonitorSession<L: EventLog = InMemoryEventLog> {
    job_id: JobId,
    config: RunConfiguration,
    topology: Topology,
    log: L,
    summary: JobSummary,
    timeline: Vec<ActivityRecord>,
    snapshot: ProgressSnapshot,
    phase: SessionPhase,
    last_summary_error: Option<String>,
}

impl MonitorSession<InMemoryEventLog> {
    pub fn new(job_id: JobId, config: RunConfiguration) -> Self {
        Self::with_log(job_id, config, InMemoryEventLog::new())
    }
}

impl<L: EventLog> MonitorSession<L> {
    pub fn with_log(job_id: JobId, config: RunConfiguration, mut log: L) -> Self {
        log.reset();
        let topology = Topology::build(&config);
        let snapshot = ProgressSnapshot::pending(&topology);
        tracing::info!(job_id = %job_id, nodes = topology.len(), "Monitor session started");
        Self {
            job_id,
            config,
            topology,
            log,
            summary: JobSummary::default(),
            timeline: Vec::new(),
            snapshot,
            phase: SessionPhase::Streaming,
            last_summary_error: None,
        }
    }

    /// Start monitoring a different job, discarding all state of the current one.
    pub fn reset(&mut self, job_id: JobId, config: RunConfiguration) {
        tracing::info!(
            previous = %self.job_id,
            job_id = %job_id,
            events = self.log.len(),
            "Monitor session reset"
        );
        self.log.reset();
        self.job_id = job_id;
        self.topology = Topology::build(&config);
        self.config = config;
        self.summary = JobSummary::default();
        self.timeline.clear();
        self.snapshot = ProgressSnapshot::pending(&self.topology);
        self.phase = SessionPhase::Streaming;
        self.last_summary_error = None;
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn summary(&self) -> &JobSummary {
        &self.summary
    }

    pub fn timeline(&self) -> &[ActivityRecord] {
        &self.timeline
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, SessionPhase::Closed { .. })
    }

    pub fn last_summary_error(&self) -> Option<&str> {
        self.last_summary_error.as_deref()
    }

    /// Resume point for a re-subscription.
    pub fn last_seq(&self) -> Option<u64> {
        self.log.last_seq()
    }

    /// Ingest a pushed event.
    pub fn ingest(&mut self, event: RawEvent) -> IngestResult<IngestOutcome> {
        if self.is_closed() {
            tracing::debug!(job_id = %self.job_id, seq = event.seq, "Dropping event after close");
            return Err(IngestError::SessionClosed);
        }

        let pull_summary = wants_pull(&event);
        let append = self.log.append(event);
        if append.is_new() {
            self.rederive();
        }
        Ok(IngestOutcome {
            append,
            pull_summary: pull_summary && append.is_new(),
        })
    }

    /// Ingest an event tagged with the job it was received for.
    pub fn ingest_for(&mut self, job_id: JobId, event: RawEvent) -> IngestResult<IngestOutcome> {
        if job_id != self.job_id {
            tracing::debug!(expected = %self.job_id, got = %job_id, "Dropping event for another job");
            return Err(IngestError::WrongJob {
                expected: self.job_id,
                got: job_id,
            });
        }
        self.ingest(event)
    }

    /// Parse and ingest one wire payload (the JSON of an SSE `data:` block).
    pub fn ingest_json(&mut self, payload: &str) -> IngestResult<IngestOutcome> {
        let event = parse_event(payload).map_err(|e| {
            tracing::debug!(job_id = %self.job_id, error = %e, "Dropping malformed event");
            e
        })?;
        self.ingest(event)
    }

    /// Merge a pulled summary and re-derive.
    pub fn apply_summary(&mut self, summary: JobSummary) -> &ProgressSnapshot {
        self.summary.merge(summary);
        self.last_summary_error = None;
        self.rederive();
        &self.snapshot
    }

    /// Record a failed pull. The previous summary stays in effect.
    pub fn summary_failed(&mut self, error: impl Into<String>) {
        let error = error.into();
        tracing::warn!(job_id = %self.job_id, error = %error, "Summary fetch failed");
        self.last_summary_error = Some(error);
    }

    /// Close the push side.
    ///
    /// Returns `true` on the first call only; the caller issues the final
    /// summary pull exactly when this returns `true`.
    pub fn close(&mut self, reason: impl Into<String>) -> bool {
        if self.is_closed() {
            return false;
        }
        let reason = reason.into();
        tracing::info!(job_id = %self.job_id, reason = %reason, events = self.log.len(), "Stream closed");
        self.phase = SessionPhase::Closed { reason };
        true
    }

    fn rederive(&mut self) {
        self.timeline = self.log.timeline();
        self.snapshot = derive(&self.timeline, &self.topology, &self.summary);
    }
}

/// Decode one wire payload into a RawEvent.
pub fn parse_event(payload: &str) -> IngestResult<RawEvent> {
    let value: Value = serde_json::from_str(payload)?;
    if !value.is_object() {
        return Err(IngestError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

fn wants_pull(event: &RawEvent) -> bool {
    match event.event_type.as_str() {
        "report_ready" | "completed" | "error" => true,
        "status" => event
            .data_str("status")
            .map(|s| JobStatus::parse_lenient(s).is_terminal())
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentwatch_core::{AgentRole, NodeStatus};
    use serde_json::json;
    use std::str::FromStr;

    fn job() -> JobId {
        JobId::from_str("0f8fad5bd9cb469fa16570867728950e").unwrap()
    }

    fn other_job() -> JobId {
        JobId::from_str("7c9e6679742540de944be07fc1f90ae7").unwrap()
    }

    fn message(seq: u64, agent: &str) -> RawEvent {
        RawEvent::new(seq, "message", 1.0, json!({"agent": agent, "content": "working"}))
    }

    #[test]
    fn test_new_session_is_pending() {
        let session = MonitorSession::new(job(), RunConfiguration::default());
        assert!(session.timeline().is_empty());
        assert_eq!(session.snapshot().completed_count(), 0);
        assert_eq!(session.phase(), &SessionPhase::Streaming);
    }

    #[test]
    fn test_ingest_rederives_snapshot() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        let outcome = session.ingest(message(1, "market")).unwrap();
        assert_eq!(outcome.append, AppendOutcome::Appended);
        assert!(!outcome.pull_summary);
        assert_eq!(
            session.snapshot().status_of(AgentRole::MarketAnalyst),
            Some(NodeStatus::InProgress)
        );
        assert_eq!(session.timeline().len(), 1);
    }

    #[test]
    fn test_duplicate_ingest_is_idempotent() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        session.ingest(message(1, "market")).unwrap();
        let before = session.snapshot().clone();
        let outcome = session.ingest(message(1, "news")).unwrap();
        assert_eq!(outcome.append, AppendOutcome::Duplicate);
        assert_eq!(session.snapshot(), &before);
        assert_eq!(session.log().len(), 1);
    }

    #[test]
    fn test_report_ready_requests_pull() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        let report = RawEvent::new(2, "report_ready", 1.0, json!({"report_key": "news_report"}));
        assert!(session.ingest(report).unwrap().pull_summary);
        let terminal = RawEvent::new(3, "status", 1.0, json!({"status": "succeeded"}));
        assert!(session.ingest(terminal).unwrap().pull_summary);
        let running = RawEvent::new(4, "status", 1.0, json!({"status": "running"}));
        assert!(!session.ingest(running).unwrap().pull_summary);
    }

    #[test]
    fn test_closed_session_rejects_events() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        assert!(session.close("eof"));
        assert!(!session.close("eof again"));
        assert!(matches!(
            session.ingest(message(1, "market")),
            Err(IngestError::SessionClosed)
        ));
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_summary_still_applies_after_close() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        session.close("eof");
        let summary = JobSummary {
            status: JobStatus::Succeeded,
            ..JobSummary::default()
        };
        let snapshot = session.apply_summary(summary);
        assert_eq!(snapshot.fraction_complete(), 1.0);
    }

    #[test]
    fn test_wrong_job_is_rejected() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        let result = session.ingest_for(other_job(), message(1, "market"));
        assert!(matches!(result, Err(IngestError::WrongJob { .. })));
        assert!(session.ingest_for(job(), message(1, "market")).is_ok());
    }

    #[test]
    fn test_ingest_json_rejects_malformed() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        assert!(matches!(session.ingest_json("{not json"), Err(IngestError::Malformed(_))));
        assert!(matches!(session.ingest_json("[1, 2]"), Err(IngestError::NotAnObject)));
        assert!(matches!(
            session.ingest_json(r#"{"seq": 1, "type": "status", "data": "x"}"#),
            Err(IngestError::Malformed(_))
        ));
        let ok = session.ingest_json(r#"{"seq": 1, "type": "status", "timestamp": 1.0, "data": {"status": "running"}}"#);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_summary_failure_keeps_previous_summary() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        session.apply_summary(JobSummary {
            status: JobStatus::Running,
            reports: ["market_report.md".to_string()].into_iter().collect(),
            ..JobSummary::default()
        });
        session.summary_failed("connection refused");
        assert_eq!(session.last_summary_error(), Some("connection refused"));
        assert!(session.summary().has_report("market_report.md"));
        assert_eq!(
            session.snapshot().status_of(AgentRole::MarketAnalyst),
            Some(NodeStatus::Completed)
        );
    }

    #[test]
    fn test_reset_starts_clean_session() {
        let mut session = MonitorSession::new(job(), RunConfiguration::default());
        session.ingest(message(1, "market")).unwrap();
        session.close("eof");
        session.reset(other_job(), RunConfiguration::default());
        assert_eq!(session.job_id(), other_job());
        assert!(session.log().is_empty());
        assert!(!session.is_closed());
        assert_eq!(session.snapshot().active(), None);
        assert_eq!(session.summary(), &JobSummary::default());
    }
}
