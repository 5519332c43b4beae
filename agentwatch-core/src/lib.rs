//! AGENTWATCH Core - Telemetry Types and Reconciliation Logic
//!
//! Pure data structures and pure functions. All other crates depend on this.
//! Nothing in this crate performs I/O or keeps hidden state: every derived
//! value is recomputed from its inputs.
//!
//! # Pipeline
//!
//! ```text
//! RawEvent ─► text::event_text ─► classify ─► ActivityRecord timeline
//!                                                   │
//! RunConfiguration ─► Topology ─────────────────────┤
//!                                                   ▼
//! JobSummary ─────────────────────────────► progress::derive ─► ProgressSnapshot
//! ```

pub mod canonical;
pub mod classify;
mod enums;
pub mod error;
pub mod progress;
pub mod text;
pub mod topology;

pub use canonical::canonicalize;
pub use classify::{classify, classify_all};
pub use enums::*;
pub use error::{ParseKeyError, ValidationError, WatchError, WatchResult};
pub use progress::{derive, PreviewPointers, ProgressSnapshot};
pub use text::{compact, extract_text, DEFAULT_COMPACT_LIMIT};
pub use topology::{AgentNode, Topology};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Identifier of one backend job.
///
/// The backend issues UUIDv4 values rendered as 32 hex digits without
/// hyphens; both the simple and the hyphenated form are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for JobId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(JobId)
            .map_err(|e| ValidationError::InvalidValue {
                field: "job_id".to_string(),
                reason: e.to_string(),
            })
    }
}

impl Serialize for JobId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// RAW TELEMETRY
// ============================================================================

/// One event of the backend's append-only job log.
///
/// `seq` is the sole de-duplication key: two events with the same `seq` are
/// the same logical event regardless of payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub seq: u64,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Epoch seconds.
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default, deserialize_with = "object_or_null")]
    pub data: Map<String, Value>,
}

impl RawEvent {
    pub fn new(seq: u64, event_type: impl Into<String>, timestamp: f64, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("content".to_string(), other);
                map
            }
        };
        Self {
            seq,
            event_type: event_type.into(),
            timestamp,
            data,
        }
    }

    /// String field of the payload, if present and a string.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

fn object_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Map<String, Value>, D::Error> {
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Typed, compacted view of one raw event. Derived, never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub seq: u64,
    pub local_time: String,
    pub stage: Stage,
    pub agent: AgentName,
    pub kind: ActivityKind,
    pub content: String,
}

// ============================================================================
// AUTHORITATIVE SUMMARY
// ============================================================================

/// Usage counters reported with the job summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobCounters {
    #[serde(default)]
    pub llm_calls: u64,
    #[serde(default)]
    pub tool_calls: u64,
    #[serde(default)]
    pub tokens_in: u64,
    #[serde(default)]
    pub tokens_out: u64,
}

impl JobCounters {
    /// Per-field maximum of two counter sets.
    pub fn max(self, other: JobCounters) -> JobCounters {
        JobCounters {
            llm_calls: self.llm_calls.max(other.llm_calls),
            tool_calls: self.tool_calls.max(other.tool_calls),
            tokens_in: self.tokens_in.max(other.tokens_in),
            tokens_out: self.tokens_out.max(other.tokens_out),
        }
    }
}

/// Authoritative job summary pulled from the backend.
///
/// Ground truth for which report artifacts exist. Arrives asynchronously and
/// out of step with the push stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobSummary {
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub analysis_date: String,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub updated_at: f64,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reports: BTreeSet<String>,
    #[serde(default)]
    pub artifacts: BTreeSet<String>,
    #[serde(default)]
    pub archive_dir: Option<String>,
    #[serde(default)]
    pub archive_files: BTreeSet<String>,
    #[serde(flatten)]
    pub counters: JobCounters,
}

impl JobSummary {
    pub fn has_report(&self, file_name: &str) -> bool {
        self.reports.contains(file_name)
    }
}

// ============================================================================
// RUN CONFIGURATION
// ============================================================================

/// Per-job pipeline selection. Determines topology only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub analysts: Vec<AnalystKey>,
    #[serde(default)]
    pub advisors: Vec<AdvisorKey>,
    #[serde(default = "default_rounds")]
    pub max_debate_rounds: u8,
    #[serde(default = "default_rounds")]
    pub max_risk_discuss_rounds: u8,
}

fn default_rounds() -> u8 {
    1
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            analysts: AnalystKey::all().to_vec(),
            advisors: Vec::new(),
            max_debate_rounds: 1,
            max_risk_discuss_rounds: 1,
        }
    }
}

impl RunConfiguration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.analysts.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "analysts".to_string(),
            });
        }
        for (field, rounds) in [
            ("max_debate_rounds", self.max_debate_rounds),
            ("max_risk_discuss_rounds", self.max_risk_discuss_rounds),
        ] {
            if !(1..=10).contains(&rounds) {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("must be within 1..=10, got {}", rounds),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_id_accepts_simple_hex() {
        let id: JobId = "0f8fad5bd9cb469fa16570867728950e".parse().unwrap();
        assert_eq!(id.to_string(), "0f8fad5bd9cb469fa16570867728950e");
        let hyphenated: JobId = "0f8fad5b-d9cb-469f-a165-70867728950e".parse().unwrap();
        assert_eq!(id, hyphenated);
        assert!("not-a-job".parse::<JobId>().is_err());
    }

    #[test]
    fn test_raw_event_deserializes_backend_shape() {
        let event: RawEvent = serde_json::from_value(json!({
            "seq": 3,
            "type": "report_ready",
            "timestamp": 1717000000.5,
            "data": {"report_key": "market_report", "length": 120}
        }))
        .unwrap();
        assert_eq!(event.seq, 3);
        assert_eq!(event.event_type, "report_ready");
        assert_eq!(event.data_str("report_key"), Some("market_report"));
    }

    #[test]
    fn test_raw_event_null_data_is_empty_object() {
        let event: RawEvent =
            serde_json::from_value(json!({"seq": 1, "type": "status", "data": null})).unwrap();
        assert!(event.data.is_empty());
    }

    #[test]
    fn test_raw_event_non_object_data_is_rejected() {
        let result =
            serde_json::from_value::<RawEvent>(json!({"seq": 1, "type": "status", "data": [1, 2]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_deserializes_flat_counters() {
        let summary: JobSummary = serde_json::from_value(json!({
            "job_id": "0f8fad5bd9cb469fa16570867728950e",
            "status": "running",
            "ticker": "NVDA",
            "analysis_date": "2026-01-02",
            "created_at": 1.0,
            "updated_at": 2.0,
            "reports": ["market_report.md"],
            "llm_calls": 4,
            "tool_calls": 2,
            "tokens_in": 100,
            "tokens_out": 50
        }))
        .unwrap();
        assert_eq!(summary.status, JobStatus::Running);
        assert!(summary.has_report("market_report.md"));
        assert_eq!(summary.counters.llm_calls, 4);
        assert_eq!(summary.counters.tokens_out, 50);
    }

    #[test]
    fn test_run_configuration_validation() {
        assert!(RunConfiguration::default().validate().is_ok());

        let empty = RunConfiguration {
            analysts: Vec::new(),
            ..RunConfiguration::default()
        };
        assert!(matches!(
            empty.validate(),
            Err(ValidationError::RequiredFieldMissing { .. })
        ));

        let too_deep = RunConfiguration {
            max_debate_rounds: 11,
            ..RunConfiguration::default()
        };
        assert!(matches!(
            too_deep.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_counters_max() {
        let a = JobCounters { llm_calls: 5, tool_calls: 1, tokens_in: 10, tokens_out: 0 };
        let b = JobCounters { llm_calls: 2, tool_calls: 3, tokens_in: 10, tokens_out: 7 };
        let m = a.max(b);
        assert_eq!(m, JobCounters { llm_calls: 5, tool_calls: 3, tokens_in: 10, tokens_out: 7 });
    }
}
