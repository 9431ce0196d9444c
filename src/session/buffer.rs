//! Pending-event buffer
//!
//! Events are kept in arrival order. Draining takes the whole vector in one
//! step, so a chunk is always a contiguous, unreordered slice of the input
//! stream and nothing appended afterwards can end up in it.

use crate::types::{CapturedEvent, EventChunk};

/// Events accumulated since the last flush
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<CapturedEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Append an event
    pub fn push(&mut self, event: CapturedEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discard everything buffered; returns how many events were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }

    /// Take all buffered events as a chunk, leaving the buffer empty
    ///
    /// Returns `None` when there is nothing to send.
    pub fn drain_chunk(&mut self, session_id: &str, user_id: Option<&str>) -> Option<EventChunk> {
        let chunk_timestamp = self.events.last()?.timestamp;
        let events = std::mem::take(&mut self.events);

        Some(EventChunk {
            session_id: session_id.to_string(),
            user_id: user_id.map(str::to_string),
            events,
            chunk_timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_drain_empty_is_none() {
        let mut buffer = EventBuffer::new();
        assert!(buffer.drain_chunk("s", None).is_none());
    }

    #[test]
    fn test_drain_takes_everything() {
        let mut buffer = EventBuffer::with_capacity(4);
        buffer.push(CapturedEvent::incremental(0, 100));
        buffer.push(CapturedEvent::incremental(2, 200));

        let chunk = buffer.drain_chunk("s", Some("u")).unwrap();
        assert_eq!(chunk.chunk_timestamp, 200);
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.user_id.as_deref(), Some("u"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_chunk_timestamp_is_last_not_max() {
        let mut buffer = EventBuffer::new();
        buffer.push(CapturedEvent::incremental(0, 500));
        buffer.push(CapturedEvent::incremental(0, 300));

        let chunk = buffer.drain_chunk("s", None).unwrap();
        assert_eq!(chunk.chunk_timestamp, 300);
    }

    #[test]
    fn test_clear_reports_dropped() {
        let mut buffer = EventBuffer::new();
        buffer.push(CapturedEvent::incremental(0, 1));
        assert_eq!(buffer.clear(), 1);
        assert_eq!(buffer.clear(), 0);
    }

    proptest! {
        #[test]
        fn test_chunks_partition_stream(
            timestamps in prop::collection::vec(0i64..1_000_000, 1..200),
            drain_every in 1usize..20,
        ) {
            let mut buffer = EventBuffer::new();
            let mut chunks = Vec::new();

            for (i, ts) in timestamps.iter().enumerate() {
                buffer.push(CapturedEvent::incremental(0, *ts));
                if (i + 1) % drain_every == 0 {
                    chunks.extend(buffer.drain_chunk("s", None));
                }
            }
            chunks.extend(buffer.drain_chunk("s", None));

            // Property: concatenated chunks reproduce the input exactly
            let replayed: Vec<i64> = chunks
                .iter()
                .flat_map(|c| c.events.iter().map(|e| e.timestamp))
                .collect();
            prop_assert_eq!(&replayed, &timestamps);

            // Property: each chunk is stamped with its last event
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert_eq!(chunk.chunk_timestamp, chunk.events.last().unwrap().timestamp);
            }
        }
    }
}
