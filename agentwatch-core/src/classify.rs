//! Activity classification: raw event → typed [`ActivityRecord`].
//!
//! Upstream events are weakly typed, so kind, stage and agent are decided by
//! ordered keyword tables. Each table is a `const` slice evaluated in order;
//! the first hit wins.

use crate::canonical::canonicalize;
use crate::text::{compact, event_text, DEFAULT_COMPACT_LIMIT};
use crate::{ActivityKind, ActivityRecord, AgentName, RawEvent, Stage};
use chrono::{DateTime, Local};

/// Substrings marking a tool or function call in event content.
pub const TOOL_MARKERS: &[&str] = &["tool_call", "function_call", "tool call", "invoking tool"];

/// Stage markers, highest precedence first. Unmatched text is `Analysts`.
pub const STAGE_RULES: &[(Stage, &[&str])] = &[
    (
        Stage::Final,
        &[
            "final_trade_decision",
            "final trade decision",
            "portfolio manager",
            "portfolio_manager",
        ],
    ),
    (
        Stage::Risk,
        &[
            "risk_debate",
            "risk debate",
            "risk",
            "debate",
            "aggressive",
            "conservative",
            "neutral analyst",
        ],
    ),
    (
        Stage::Trader,
        &["trader_investment_plan", "trader", "trading plan"],
    ),
    (
        Stage::Research,
        &[
            "advisor",
            "research",
            "bull",
            "bear",
            "investment_plan",
            "style",
            "buffett",
            "williams",
            "livermore",
        ],
    ),
];

/// Role keywords scanned in content when the payload names no agent.
///
/// Every keyword canonicalizes to a topology role.
pub const AGENT_KEYWORDS: &[&str] = &[
    "market",
    "social",
    "sentiment",
    "news",
    "fundamentals",
    "quant",
    "buffett",
    "larry williams",
    "livermore",
    "bull",
    "bear",
    "research manager",
    "trader",
    "aggressive",
    "conservative",
    "neutral",
    "portfolio manager",
];

const UNKNOWN_TIME: &str = "--:--:--";

/// Classify one raw event.
pub fn classify(event: &RawEvent) -> ActivityRecord {
    let raw = event_text(event);
    let content = compact(&raw, DEFAULT_COMPACT_LIMIT);
    let kind = classify_kind(&event.event_type, &content, &raw);
    let stage = classify_stage(&event.event_type, &content);
    let agent = classify_agent(event, &content);

    ActivityRecord {
        seq: event.seq,
        local_time: local_time(event.timestamp),
        stage,
        agent,
        kind,
        content,
    }
}

/// Classify a whole log, preserving order.
pub fn classify_all(events: &[RawEvent]) -> Vec<ActivityRecord> {
    events.iter().map(classify).collect()
}

pub fn classify_kind(event_type: &str, content: &str, raw: &str) -> ActivityKind {
    match event_type {
        "status" => return ActivityKind::Status,
        "report_ready" => return ActivityKind::Report,
        _ => {}
    }
    if contains_any(&content.to_lowercase(), TOOL_MARKERS) || contains_any(&raw.to_lowercase(), TOOL_MARKERS) {
        return ActivityKind::Tool;
    }
    if event_type == "message" {
        ActivityKind::Message
    } else {
        ActivityKind::Event
    }
}

pub fn classify_stage(event_type: &str, content: &str) -> Stage {
    let haystack = format!("{} {}", event_type, content).to_lowercase();
    STAGE_RULES
        .iter()
        .find(|(_, markers)| contains_any(&haystack, markers))
        .map(|(stage, _)| *stage)
        .unwrap_or(Stage::Analysts)
}

pub fn classify_agent(event: &RawEvent, content: &str) -> AgentName {
    if let Some(explicit) = event.data_str("agent") {
        if !explicit.trim().is_empty() {
            return canonicalize(explicit);
        }
    }
    let lowered = content.to_lowercase();
    AGENT_KEYWORDS
        .iter()
        .find(|keyword| lowered.contains(*keyword))
        .map(|keyword| canonicalize(keyword))
        .unwrap_or(AgentName::System)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn local_time(timestamp: f64) -> String {
    if !timestamp.is_finite() {
        return UNKNOWN_TIME.to_string();
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return UNKNOWN_TIME.to_string();
    }
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
        .map(|utc| utc.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}
