//! Event log trait and the in-memory implementation.
//!
//! The log is the only mutable store of a monitoring session. Everything else
//! (timeline, progress) is derived from it.

use agentwatch_core::{classify_all, ActivityRecord, RawEvent};

/// Result of appending one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Added at the tail.
    Appended,
    /// Arrived behind the tail and was inserted at its sorted position.
    Reordered,
    /// An event with the same `seq` is already present; nothing changed.
    Duplicate,
}

impl AppendOutcome {
    pub fn is_new(&self) -> bool {
        !matches!(self, AppendOutcome::Duplicate)
    }
}

/// Trait for event log storage.
///
/// Implementations keep events sorted by `seq` with at most one event per
/// `seq`, so appending under at-least-once delivery is idempotent.
pub trait EventLog {
    /// Append an event, de-duplicating on `seq`.
    fn append(&mut self, event: RawEvent) -> AppendOutcome;

    /// The full ordered log.
    fn events(&self) -> &[RawEvent];

    /// Remove every event. The only destructive operation.
    fn reset(&mut self);

    fn last_seq(&self) -> Option<u64> {
        self.events().last().map(|e| e.seq)
    }

    fn len(&self) -> usize {
        self.events().len()
    }

    fn is_empty(&self) -> bool {
        self.events().is_empty()
    }

    fn contains(&self, seq: u64) -> bool {
        self.events().binary_search_by_key(&seq, |e| e.seq).is_ok()
    }
}

/// Extension trait for EventLog with derived views.
pub trait EventLogExt: EventLog {
    /// Classified view of the whole log.
    fn timeline(&self) -> Vec<ActivityRecord> {
        classify_all(self.events())
    }
}

impl<T: EventLog> EventLogExt for T {}

/// Vector-backed event log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventLog {
    events: Vec<RawEvent>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventLog for InMemoryEventLog {
    fn append(&mut self, event: RawEvent) -> AppendOutcome {
        match self.events.last() {
            None => {
                self.events.push(event);
                AppendOutcome::Appended
            }
            Some(tail) if event.seq > tail.seq => {
                self.events.push(event);
                AppendOutcome::Appended
            }
            Some(_) => match self.events.binary_search_by_key(&event.seq, |e| e.seq) {
                Ok(_) => AppendOutcome::Duplicate,
                Err(index) => {
                    self.events.insert(index, event);
                    AppendOutcome::Reordered
                }
            },
        }
    }

    fn events(&self) -> &[RawEvent] {
        &self.events
    }

    fn reset(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(seq: u64) -> RawEvent {
        RawEvent::new(seq, "message", 0.0, json!({"content": format!("event {}", seq)}))
    }

    #[test]
    fn test_append_in_order() {
        let mut log = InMemoryEventLog::new();
        assert_eq!(log.append(event(1)), AppendOutcome::Appended);
        assert_eq!(log.append(event(2)), AppendOutcome::Appended);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last_seq(), Some(2));
    }

    #[test]
    fn test_duplicate_is_noop() {
        let mut log = InMemoryEventLog::new();
        log.append(event(1));
        let replay = RawEvent::new(1, "status", 5.0, json!({"status": "failed"}));
        assert_eq!(log.append(replay), AppendOutcome::Duplicate);
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].event_type, "message");
    }

    #[test]
    fn test_late_event_is_inserted_sorted() {
        let mut log = InMemoryEventLog::new();
        log.append(event(1));
        log.append(event(4));
        assert_eq!(log.append(event(3)), AppendOutcome::Reordered);
        assert_eq!(log.append(event(0)), AppendOutcome::Reordered);
        assert_eq!(log.append(event(3)), AppendOutcome::Duplicate);
        let seqs: Vec<u64> = log.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 3, 4]);
        assert!(log.contains(3));
        assert!(!log.contains(2));
    }

    #[test]
    fn test_reset_clears() {
        let mut log = InMemoryEventLog::new();
        log.append(event(1));
        log.reset();
        assert!(log.is_empty());
        assert_eq!(log.last_seq(), None);
        assert_eq!(log.append(event(1)), AppendOutcome::Appended);
    }
}
