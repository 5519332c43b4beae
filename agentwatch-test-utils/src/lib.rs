//! AgentWatch Test Utilities
//!
//! Shared test infrastructure for the AgentWatch workspace:
//! - Proptest generators for telemetry types
//! - Fixtures for common event and summary shapes
//! - Assertions over derived progress

pub use agentwatch_core::{
    progress::ARTIFACTS, ActivityKind, ActivityRecord, AdvisorKey, AgentRole, AnalystKey,
    JobCounters, JobId, JobStatus, JobSummary, NodeStatus, ProgressSnapshot, RawEvent,
    RunConfiguration, Topology,
};

use serde_json::{json, Value};
use uuid::Uuid;

/// Report file names the backend can list in a summary.
pub fn report_files() -> Vec<&'static str> {
    ARTIFACTS.iter().map(|(_, _, file)| *file).collect()
}

/// Artifact keys carried by `report_ready` events.
pub fn report_keys() -> Vec<&'static str> {
    ARTIFACTS.iter().map(|(_, key, _)| *key).collect()
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating AgentWatch telemetry.

    use super::*;
    use proptest::prelude::*;

    /// Generate a random JobId.
    pub fn arb_job_id() -> impl Strategy<Value = JobId> {
        any::<[u8; 16]>().prop_map(|bytes| JobId::new(Uuid::from_bytes(bytes)))
    }

    /// Generate a JobStatus variant.
    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Unknown),
            Just(JobStatus::Queued),
            Just(JobStatus::Running),
            Just(JobStatus::Succeeded),
            Just(JobStatus::Failed),
            Just(JobStatus::Cancelled),
        ]
    }

    /// Generate an agent label as the backend might send it: canonical names,
    /// selection keys, backend aliases, or arbitrary text.
    pub fn arb_agent_label() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(AgentRole::all().to_vec())
                .prop_map(|role| role.display_name().to_string()),
            prop::sample::select(AnalystKey::all().to_vec()).prop_map(|k| k.as_str().to_string()),
            prop::sample::select(AdvisorKey::all().to_vec()).prop_map(|k| k.as_str().to_string()),
            prop::sample::select(vec!["Risky Analyst", "Safe Analyst", "portfolio_manager"])
                .prop_map(str::to_string),
            "[A-Za-z ]{0,24}",
        ]
    }

    /// Generate free text, sometimes carrying a tool marker or an artifact key.
    pub fn arb_content() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => "[a-zA-Z0-9 .,]{0,120}",
            1 => "[a-z ]{0,20}".prop_map(|s| format!("invoking tool {}", s)),
            1 => prop::sample::select(report_keys()).prop_map(|k| format!("{} written", k)),
        ]
    }

    /// Generate a backend event payload for the given event type.
    pub fn arb_payload(event_type: &'static str) -> BoxedStrategy<Value> {
        match event_type {
            "message" => (prop::option::of(arb_agent_label()), arb_content())
                .prop_map(|(agent, content)| json!({"agent": agent, "content": content}))
                .boxed(),
            "report_ready" => (prop::sample::select(report_keys()), 0u64..20_000)
                .prop_map(|(key, length)| json!({"report_key": key, "length": length}))
                .boxed(),
            "status" => arb_job_status()
                .prop_map(|status| json!({"status": status.as_str()}))
                .boxed(),
            "completed" => prop::sample::subsequence(report_files(), 0..=ARTIFACTS.len())
                .prop_map(|reports| json!({"reports": reports}))
                .boxed(),
            _ => "[a-zA-Z ]{0,60}".prop_map(|error| json!({"error": error})).boxed(),
        }
    }

    /// Generate an event type and matching payload.
    pub fn arb_event_body() -> impl Strategy<Value = (&'static str, Value)> {
        prop::sample::select(vec!["status", "message", "message", "report_ready", "completed", "error"])
            .prop_flat_map(|event_type| (Just(event_type), arb_payload(event_type)))
    }

    /// Generate one RawEvent with the given sequence number.
    pub fn arb_raw_event_with_seq(seq: u64) -> impl Strategy<Value = RawEvent> {
        (arb_event_body(), 1_700_000_000.0f64..1_800_000_000.0f64).prop_map(
            move |((event_type, data), timestamp)| RawEvent::new(seq, event_type, timestamp, data),
        )
    }

    /// Generate one RawEvent with an arbitrary sequence number.
    pub fn arb_raw_event() -> impl Strategy<Value = RawEvent> {
        (0u64..500).prop_flat_map(arb_raw_event_with_seq)
    }

    /// Generate a timeline with strictly increasing sequence numbers starting at 1.
    pub fn arb_timeline(max_len: usize) -> impl Strategy<Value = Vec<RawEvent>> {
        prop::collection::vec(
            (arb_event_body(), 1_700_000_000.0f64..1_800_000_000.0f64),
            0..=max_len,
        )
        .prop_map(|bodies| {
            bodies
                .into_iter()
                .enumerate()
                .map(|(i, ((event_type, data), ts))| RawEvent::new(i as u64 + 1, event_type, ts, data))
                .collect()
        })
    }

    /// Generate a valid RunConfiguration.
    pub fn arb_run_configuration() -> impl Strategy<Value = RunConfiguration> {
        (
            prop::sample::subsequence(AnalystKey::all().to_vec(), 1..=AnalystKey::all().len())
                .prop_shuffle(),
            prop::sample::subsequence(AdvisorKey::all().to_vec(), 0..=AdvisorKey::all().len()),
            1u8..=10,
            1u8..=10,
        )
            .prop_map(|(analysts, advisors, max_debate_rounds, max_risk_discuss_rounds)| {
                RunConfiguration {
                    analysts,
                    advisors,
                    max_debate_rounds,
                    max_risk_discuss_rounds,
                }
            })
    }

    /// Generate a JobCounters value.
    pub fn arb_job_counters() -> impl Strategy<Value = JobCounters> {
        (0u64..500, 0u64..500, 0u64..1_000_000, 0u64..1_000_000).prop_map(
            |(llm_calls, tool_calls, tokens_in, tokens_out)| JobCounters {
                llm_calls,
                tool_calls,
                tokens_in,
                tokens_out,
            },
        )
    }

    /// Generate a JobSummary with a subset of the known report files.
    pub fn arb_job_summary() -> impl Strategy<Value = JobSummary> {
        (
            prop::option::of(arb_job_id()),
            arb_job_status(),
            "[A-Z]{0,5}",
            prop::sample::subsequence(report_files(), 0..=ARTIFACTS.len()),
            arb_job_counters(),
            0.0f64..1_000_000.0,
        )
            .prop_map(|(job_id, status, ticker, reports, counters, updated_at)| JobSummary {
                job_id,
                status,
                ticker,
                updated_at,
                reports: reports.into_iter().map(str::to_string).collect(),
                counters,
                ..JobSummary::default()
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common testing scenarios.

    use super::*;

    pub const FIXTURE_TIMESTAMP: f64 = 1_717_000_000.0;

    /// Create a `message` event from an agent.
    pub fn message_event(seq: u64, agent: &str, content: &str) -> RawEvent {
        RawEvent::new(
            seq,
            "message",
            FIXTURE_TIMESTAMP + seq as f64,
            json!({"agent": agent, "content": content}),
        )
    }

    /// Create a `report_ready` event for an artifact key such as `market_report`.
    pub fn report_ready_event(seq: u64, report_key: &str) -> RawEvent {
        RawEvent::new(
            seq,
            "report_ready",
            FIXTURE_TIMESTAMP + seq as f64,
            json!({"report_key": report_key, "length": 1024}),
        )
    }

    /// Create a `status` event.
    pub fn status_event(seq: u64, status: JobStatus) -> RawEvent {
        RawEvent::new(
            seq,
            "status",
            FIXTURE_TIMESTAMP + seq as f64,
            json!({"status": status.as_str()}),
        )
    }

    /// Serialize an event the way it appears on the wire.
    pub fn wire_json(event: &RawEvent) -> String {
        serde_json::to_string(event).unwrap_or_default()
    }

    /// Every analyst and every advisor selected.
    pub fn full_run_configuration() -> RunConfiguration {
        RunConfiguration {
            analysts: AnalystKey::all().to_vec(),
            advisors: AdvisorKey::all().to_vec(),
            max_debate_rounds: 1,
            max_risk_discuss_rounds: 1,
        }
    }

    /// Summary with the given status and report files.
    pub fn summary_with_reports(status: JobStatus, reports: &[&str]) -> JobSummary {
        JobSummary {
            status,
            ticker: "NVDA".to_string(),
            analysis_date: "2026-01-02".to_string(),
            reports: reports.iter().map(|r| r.to_string()).collect(),
            ..JobSummary::default()
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over derived progress snapshots.

    use super::*;

    /// Assert that every node completed in `before` is still completed in `after`.
    #[track_caller]
    pub fn assert_completed_retained(before: &ProgressSnapshot, after: &ProgressSnapshot) {
        for node in before.nodes().iter().filter(|n| n.status.is_completed()) {
            let later = after.status_of(node.role).unwrap_or(NodeStatus::Pending);
            assert_eq!(
                later,
                NodeStatus::Completed,
                "{} regressed from completed to {}",
                node.name(),
                later
            );
        }
    }

    /// Assert a node's status.
    #[track_caller]
    pub fn assert_status(snapshot: &ProgressSnapshot, role: AgentRole, expected: NodeStatus) {
        assert_eq!(
            snapshot.status_of(role),
            Some(expected),
            "unexpected status for {}",
            role.display_name()
        );
    }

    /// Assert that every node in the snapshot is completed.
    #[track_caller]
    pub fn assert_all_completed(snapshot: &ProgressSnapshot) {
        for node in snapshot.nodes() {
            assert_eq!(node.status, NodeStatus::Completed, "{} not completed", node.name());
        }
    }
}
