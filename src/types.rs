//! Core data types shared across the recorder
//!
//! - [`CapturedEvent`] - One timestamped record emitted by the capture engine
//! - [`EventType`] / [`IncrementalSource`] - The engine's numeric vocabulary
//! - [`EventChunk`] - An ordered batch of events handed to delivery
//! - [`Visibility`] / [`RecorderInput`] - Signals flowing into the recorder

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Top-level event type code as emitted by the capture engine.
///
/// Kept as a transparent newtype so codes the recorder does not know about
/// survive a round trip untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(pub u8);

impl EventType {
    pub const DOM_CONTENT_LOADED: EventType = EventType(0);
    pub const LOAD: EventType = EventType(1);
    pub const FULL_SNAPSHOT: EventType = EventType(2);
    pub const INCREMENTAL_SNAPSHOT: EventType = EventType(3);
    pub const META: EventType = EventType(4);
    pub const CUSTOM: EventType = EventType(5);
    pub const PLUGIN: EventType = EventType(6);

    /// Short name for logging
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "DomContentLoaded",
            1 => "Load",
            2 => "FullSnapshot",
            3 => "IncrementalSnapshot",
            4 => "Meta",
            5 => "Custom",
            6 => "Plugin",
            _ => "Unknown",
        }
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventType({}:{})", self.0, self.name())
    }
}

/// Source codes carried in `data.source` of incremental snapshot events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementalSource;

impl IncrementalSource {
    pub const MUTATION: u64 = 0;
    pub const MOUSE_MOVE: u64 = 1;
    pub const MOUSE_INTERACTION: u64 = 2;
    pub const SCROLL: u64 = 3;
    pub const VIEWPORT_RESIZE: u64 = 4;
    pub const INPUT: u64 = 5;
    pub const TOUCH_MOVE: u64 = 6;

    /// Sources that count as direct user input for session activity
    pub const INTERACTIONS: [u64; 3] = [Self::MOUSE_INTERACTION, Self::INPUT, Self::TOUCH_MOVE];
}

/// A single record emitted by the capture engine.
///
/// The recorder only looks at `event_type` and `data.source`; everything
/// else is carried through opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub data: Value,
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CapturedEvent {
    /// Create an event with an arbitrary payload
    pub fn new(event_type: EventType, data: Value, timestamp: i64) -> Self {
        Self {
            event_type,
            data,
            timestamp,
            extra: Map::new(),
        }
    }

    /// Create an incremental snapshot event with the given source code
    pub fn incremental(source: u64, timestamp: i64) -> Self {
        Self::new(
            EventType::INCREMENTAL_SNAPSHOT,
            serde_json::json!({ "source": source }),
            timestamp,
        )
    }

    /// The `data.source` sub-field, if present and numeric
    pub fn source(&self) -> Option<u64> {
        self.data.get("source").and_then(Value::as_u64)
    }

    /// Whether this event originates from direct user input (click, input, touch)
    pub fn is_user_interaction(&self) -> bool {
        self.event_type == EventType::INCREMENTAL_SNAPSHOT
            && self
                .source()
                .is_some_and(|s| IncrementalSource::INTERACTIONS.contains(&s))
    }

    /// Whether this is a full-state snapshot
    pub fn is_full_snapshot(&self) -> bool {
        self.event_type == EventType::FULL_SNAPSHOT
    }
}

/// An ordered batch of events delivered together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChunk {
    /// Session the events belong to
    pub session_id: String,
    /// Host user id (auto mode only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
    /// Events in emission order
    pub events: Vec<CapturedEvent>,
    /// Timestamp of the last event in `events`
    pub chunk_timestamp: i64,
}

impl EventChunk {
    /// Number of events in the chunk
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the chunk carries no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Page visibility as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Everything that can flow into the recorder from its collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderInput {
    /// Capture engine emission
    Event(CapturedEvent),
    /// Page visibility transition
    Visibility(Visibility),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interaction_classification() {
        assert!(CapturedEvent::incremental(IncrementalSource::MOUSE_INTERACTION, 1).is_user_interaction());
        assert!(CapturedEvent::incremental(IncrementalSource::INPUT, 1).is_user_interaction());
        assert!(CapturedEvent::incremental(IncrementalSource::TOUCH_MOVE, 1).is_user_interaction());

        assert!(!CapturedEvent::incremental(IncrementalSource::MUTATION, 1).is_user_interaction());
        assert!(!CapturedEvent::incremental(IncrementalSource::MOUSE_MOVE, 1).is_user_interaction());
        assert!(!CapturedEvent::incremental(IncrementalSource::SCROLL, 1).is_user_interaction());
    }

    #[test]
    fn test_non_incremental_never_interaction() {
        let event = CapturedEvent::new(EventType::FULL_SNAPSHOT, json!({ "source": 2 }), 5);
        assert!(!event.is_user_interaction());
        assert!(event.is_full_snapshot());

        let no_source = CapturedEvent::new(EventType::INCREMENTAL_SNAPSHOT, json!({}), 5);
        assert!(!no_source.is_user_interaction());
    }

    #[test]
    fn test_event_json_passthrough() {
        let raw = r#"{"type":3,"data":{"source":5,"text":"hi","id":12},"timestamp":1700000000000,"delay":4}"#;
        let event: CapturedEvent = serde_json::from_str(raw).unwrap();

        assert_eq!(event.event_type, EventType::INCREMENTAL_SNAPSHOT);
        assert_eq!(event.source(), Some(5));
        assert_eq!(event.extra.get("delay"), Some(&json!(4)));

        let back: Value = serde_json::to_value(&event).unwrap();
        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_unknown_event_type_preserved() {
        let event: CapturedEvent =
            serde_json::from_str(r#"{"type":42,"data":null,"timestamp":1}"#).unwrap();
        assert_eq!(event.event_type, EventType(42));
        assert_eq!(event.event_type.name(), "Unknown");
    }

    #[test]
    fn test_chunk_serializes_camel_case() {
        let chunk = EventChunk {
            session_id: "abc".into(),
            user_id: None,
            events: vec![CapturedEvent::incremental(0, 10)],
            chunk_timestamp: 10,
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["sessionId"], "abc");
        assert_eq!(value["chunkTimestamp"], 10);
        assert!(value.get("userId").is_none());
    }
}
