//! Delivery channel: turns a chunk into one authenticated upload

use super::payload::{encode_payload, UploadBody};
use super::transport::{Transport, UploadRequest};
use crate::error::Result;
use crate::storage::{load_write_code, KeyValueStore};
use crate::types::EventChunk;

/// What happened to a chunk handed to the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Collector accepted the chunk
    Delivered,
    /// No credential stored; nothing was sent
    Skipped,
    /// Encoding or upload failed; the chunk is gone
    Failed(String),
}

/// Uploads chunks to the collector with the stored credential
pub struct DeliveryChannel {
    transport: Box<dyn Transport>,
    credential: Option<String>,
    collector_url: String,
}

impl DeliveryChannel {
    /// Build the channel, reading the credential once from `store`
    pub fn new(
        store: &dyn KeyValueStore,
        transport: Box<dyn Transport>,
        collector_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            credential: load_write_code(store),
            collector_url: collector_url.into(),
        }
    }

    /// Whether a credential was found at construction
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Prepare the upload for `chunk`; `None` without a credential
    pub fn build_request(&self, chunk: &EventChunk) -> Result<Option<UploadRequest>> {
        let Some(credential) = self.credential.as_deref() else {
            return Ok(None);
        };

        let body = encode_payload(&UploadBody {
            user_id: chunk.user_id.as_deref().unwrap_or_default(),
            chunk_timestamp: chunk.chunk_timestamp,
            events: &chunk.events,
        })?;

        Ok(Some(UploadRequest {
            url: format!(
                "{}/session/{}",
                self.collector_url.trim_end_matches('/'),
                chunk.session_id
            ),
            authorization: format!("Basic {}", credential),
            body,
        }))
    }

    /// Send one chunk, single attempt
    pub fn send(&self, chunk: &EventChunk) -> DeliveryOutcome {
        let request = match self.build_request(chunk) {
            Ok(Some(request)) => request,
            Ok(None) => return DeliveryOutcome::Skipped,
            Err(e) => return DeliveryOutcome::Failed(e.to_string()),
        };

        match self.transport.post(&request) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => DeliveryOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::payload::decode_payload;
    use crate::backend::transport::MockTransport;
    use crate::error::RecorderError;
    use crate::storage::{save_write_code, MemoryStore};
    use crate::types::CapturedEvent;

    fn chunk() -> EventChunk {
        EventChunk {
            session_id: "sess-1".into(),
            user_id: Some("user-1".into()),
            events: vec![CapturedEvent::incremental(2, 100), CapturedEvent::incremental(0, 200)],
            chunk_timestamp: 200,
        }
    }

    fn store_with_code(code: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        save_write_code(&mut store, code).unwrap();
        store
    }

    #[test]
    fn test_request_format() {
        let store = store_with_code("abc123");
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(|req| {
                req.url == "https://collector.test/session/sess-1"
                    && req.authorization == "Basic YWJjMTIzOg=="
            })
            .times(1)
            .returning(|_| Ok(()));

        let channel = DeliveryChannel::new(&store, Box::new(transport), "https://collector.test/");
        assert_eq!(channel.send(&chunk()), DeliveryOutcome::Delivered);
    }

    #[test]
    fn test_body_decodes_to_chunk() {
        let store = store_with_code("abc123");
        let channel = DeliveryChannel::new(&store, Box::new(MockTransport::new()), "http://c");

        let request = channel.build_request(&chunk()).unwrap().unwrap();
        let body = decode_payload(&request.body).unwrap();
        assert_eq!(body["userId"], "user-1");
        assert_eq!(body["chunk_timestamp"], 200);
        assert_eq!(body["events"][1]["timestamp"], 200);
    }

    #[test]
    fn test_missing_credential_skips_silently() {
        let store = MemoryStore::new();
        let mut transport = MockTransport::new();
        transport.expect_post().never();

        let channel = DeliveryChannel::new(&store, Box::new(transport), "http://c");
        assert!(!channel.has_credential());
        assert_eq!(channel.send(&chunk()), DeliveryOutcome::Skipped);
    }

    #[test]
    fn test_transport_failure_reported_once() {
        let store = store_with_code("abc");
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Err(RecorderError::Delivery("collector returned 500".into())));

        let channel = DeliveryChannel::new(&store, Box::new(transport), "http://c");
        match channel.send(&chunk()) {
            DeliveryOutcome::Failed(msg) => assert!(msg.contains("500")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
