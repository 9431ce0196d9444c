//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod fakes;

use sessionlens_rs::backend::{CaptureHandle, VisibilityHandle};
use sessionlens_rs::clock::ManualClock;
use sessionlens_rs::storage::MemoryStore;
use sessionlens_rs::{CapturedEvent, EventChunk, SessionRecorder, Visibility};
use std::sync::{Arc, Mutex};

use fakes::RecordingTransport;

/// Chunks collected by a manual-mode callback
pub type ChunkLog = Arc<Mutex<Vec<EventChunk>>>;

/// A running recorder plus handles on every collaborator it was given
pub struct Harness {
    pub recorder: SessionRecorder,
    pub store: MemoryStore,
    pub clock: ManualClock,
    pub capture: CaptureHandle,
    pub visibility: VisibilityHandle,
    pub chunks: ChunkLog,
    pub transport: RecordingTransport,
}

impl Harness {
    /// Emit through the capture engine and process the queue
    pub fn feed(&mut self, event: CapturedEvent) {
        assert!(self.capture.emit(event), "recorder input queue closed");
        self.recorder.pump();
    }

    /// Advance the clock to `now_ms`, then feed
    pub fn feed_at(&mut self, now_ms: u64, event: CapturedEvent) {
        self.clock.set(now_ms);
        self.feed(event);
    }

    /// Report a visibility transition and process the queue
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility.set(visibility);
        self.recorder.pump();
    }

    /// Chunks received so far (manual mode)
    pub fn chunks(&self) -> Vec<EventChunk> {
        self.chunks.lock().unwrap().clone()
    }

    /// Timestamps of every delivered event, in delivery order
    pub fn delivered_timestamps(&self) -> Vec<i64> {
        self.chunks()
            .iter()
            .flat_map(|chunk| chunk.events.iter().map(|e| e.timestamp))
            .collect()
    }

    pub fn session_id(&self) -> String {
        self.recorder
            .session_id()
            .expect("recorder should be active")
            .to_string()
    }
}
