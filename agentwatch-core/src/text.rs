//! Content normalization: turning arbitrarily-shaped payloads into display text.
//!
//! Both functions are total. Unknown shapes degrade to their JSON
//! serialization instead of failing.

use crate::RawEvent;
use serde_json::Value;

/// Default character budget for compacted activity content.
pub const DEFAULT_COMPACT_LIMIT: usize = 220;

const ELLIPSIS: &str = "...";

/// Payload fields that carry the primary text of an event, in preference order.
const TEXT_FIELDS: &[&str] = &["content", "text", "message"];

/// Extract a display string from a JSON value.
pub fn extract_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(extract_text)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                return text.clone();
            }
            match map.get("content") {
                Some(content) if !content.is_null() => extract_text(content),
                _ => value.to_string(),
            }
        }
        other => other.to_string(),
    }
}

/// Collapse whitespace runs to single spaces, trim, and truncate to `max`
/// characters followed by an ellipsis.
pub fn compact(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(max).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Text of a raw event as seen by the classifier.
///
/// Uses the payload's primary text field when present, otherwise the whole
/// payload object.
pub fn event_text(event: &RawEvent) -> String {
    for field in TEXT_FIELDS {
        match event.data.get(*field) {
            Some(value) if !value.is_null() => return extract_text(value),
            _ => {}
        }
    }
    if event.data.is_empty() {
        return String::new();
    }
    extract_text(&Value::Object(event.data.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_string() {
        assert_eq!(extract_text(&json!("hello")), "hello");
    }

    #[test]
    fn test_extract_list_joins_non_empty_parts() {
        let value = json!(["first", "", {"text": "second"}, null, 3]);
        assert_eq!(extract_text(&value), "first\nsecond\n3");
    }

    #[test]
    fn test_extract_object_prefers_text_then_content() {
        assert_eq!(extract_text(&json!({"text": "a", "content": "b"})), "a");
        assert_eq!(extract_text(&json!({"content": ["x", "y"]})), "x\ny");
    }

    #[test]
    fn test_extract_object_without_text_serializes() {
        let value = json!({"report_key": "market_report"});
        assert_eq!(extract_text(&value), r#"{"report_key":"market_report"}"#);
    }

    #[test]
    fn test_extract_scalars() {
        assert_eq!(extract_text(&json!(null)), "");
        assert_eq!(extract_text(&json!(true)), "true");
        assert_eq!(extract_text(&json!(1.5)), "1.5");
    }

    #[test]
    fn test_compact_collapses_whitespace() {
        assert_eq!(compact("  a \n\n b\t c  ", 220), "a b c");
    }

    #[test]
    fn test_compact_truncates_with_ellipsis() {
        let text = "x".repeat(300);
        let out = compact(&text, DEFAULT_COMPACT_LIMIT);
        assert_eq!(out.chars().count(), DEFAULT_COMPACT_LIMIT + ELLIPSIS.len());
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_compact_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(compact(&text, 4), "éééé...");
    }

    #[test]
    fn test_compact_exact_limit_untouched() {
        assert_eq!(compact("abcd", 4), "abcd");
    }

    #[test]
    fn test_event_text_prefers_content_field() {
        let event = RawEvent::new(1, "message", 0.0, json!({"agent": "Bull Researcher", "content": "Upside"}));
        assert_eq!(event_text(&event), "Upside");
    }

    #[test]
    fn test_event_text_falls_back_to_payload() {
        let event = RawEvent::new(2, "report_ready", 0.0, json!({"report_key": "news_report"}));
        assert!(event_text(&event).contains("news_report"));
        let empty = RawEvent::new(3, "status", 0.0, json!({}));
        assert_eq!(event_text(&empty), "");
    }
}
