//! Where services publish their change notifications.

use std::sync::{Arc, Mutex};

use super::DomainEvent;

/// Receives a notification after each committed write.
///
/// Services call it once the repository has returned, never before. An
/// implementation must return quickly and must not fail the write: a dropped
/// notification only delays a client refresh.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);

    /// Forwards each event to `emit` in order.
    fn emit_batch(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Discards every event.
#[derive(Clone, Default)]
pub struct NoOpDomainEventSink;

impl DomainEventSink for NoOpDomainEventSink {
    fn emit(&self, _event: DomainEvent) {}
}

/// Records events in memory so tests can assert on what a service published.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sink_accepts_single_and_batched_events() {
        let sink = NoOpDomainEventSink;
        sink.emit(DomainEvent::goals_changed("hh"));
        sink.emit_batch(vec![
            DomainEvent::transactions_changed("hh"),
            DomainEvent::schedule_changed("hh"),
        ]);
    }

    #[test]
    fn test_mock_sink_records_events_in_order() {
        let sink = MockDomainEventSink::new();
        assert!(sink.is_empty());

        sink.emit(DomainEvent::goals_changed("hh"));
        assert_eq!(sink.len(), 1);

        sink.emit_batch(vec![
            DomainEvent::transactions_changed("hh"),
            DomainEvent::schedule_changed("hh"),
        ]);
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.events()[2], DomainEvent::schedule_changed("hh"));

        sink.clear();
        assert!(sink.is_empty());
    }
}
