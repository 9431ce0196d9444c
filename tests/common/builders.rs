//! Test data builders for creating test objects

use super::fakes::RecordingTransport;
use super::{ChunkLog, Harness};
use sessionlens_rs::backend::{ChannelCaptureEngine, ChannelVisibility};
use sessionlens_rs::clock::{Clock, ManualClock};
use sessionlens_rs::config::{OnEventsCallback, RecorderMode};
use sessionlens_rs::session::SequentialIds;
use sessionlens_rs::storage::MemoryStore;
use sessionlens_rs::types::IncrementalSource;
use sessionlens_rs::{
    CapturedEvent, EventType, RecorderConfig, RecorderEnvironment, RecordingOptions,
    SessionRecorder,
};
use serde_json::json;
use std::time::Duration;

/// Passive DOM mutation
pub fn mutation(ts: i64) -> CapturedEvent {
    CapturedEvent::incremental(IncrementalSource::MUTATION, ts)
}

/// Mouse click, an interaction
pub fn click(ts: i64) -> CapturedEvent {
    CapturedEvent::incremental(IncrementalSource::MOUSE_INTERACTION, ts)
}

/// Text input, an interaction
pub fn input(ts: i64) -> CapturedEvent {
    CapturedEvent::incremental(IncrementalSource::INPUT, ts)
}

/// Full-state snapshot marker
pub fn full_snapshot(ts: i64) -> CapturedEvent {
    CapturedEvent::new(EventType::FULL_SNAPSHOT, json!({ "node": {} }), ts)
}

enum Mode {
    Manual(Option<OnEventsCallback>),
    Auto { write_code: String, user_id: String },
}

/// Builder for a [`Harness`] around a manual-mode or auto-mode recorder
pub struct HarnessBuilder {
    mode: Mode,
    options: RecordingOptions,
    start_ms: u64,
    store: MemoryStore,
    transport: RecordingTransport,
    snapshot_source: bool,
    id_prefix: String,
}

impl HarnessBuilder {
    /// Manual mode, chunks collected into the harness
    pub fn manual() -> Self {
        Self::with_mode(Mode::Manual(None))
    }

    /// Manual mode with a caller-supplied callback
    pub fn manual_with<F>(callback: F) -> Self
    where
        F: FnMut(sessionlens_rs::EventChunk) -> anyhow::Result<()> + Send + 'static,
    {
        Self::with_mode(Mode::Manual(Some(Box::new(callback))))
    }

    /// Auto mode uploading through a [`RecordingTransport`]
    pub fn auto(write_code: &str, user_id: &str) -> Self {
        Self::with_mode(Mode::Auto {
            write_code: write_code.to_string(),
            user_id: user_id.to_string(),
        })
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            options: RecordingOptions::default(),
            start_ms: 1_000_000,
            store: MemoryStore::new(),
            transport: RecordingTransport::new(),
            snapshot_source: true,
            id_prefix: "session".to_string(),
        }
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.options = self.options.with_buffer_size(buffer_size);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.options = self.options.with_timeout(Duration::from_millis(timeout_ms));
        self
    }

    pub fn flush_interval_ms(mut self, interval_ms: u64) -> Self {
        self.options = self
            .options
            .with_flush_interval(Duration::from_millis(interval_ms));
        self
    }

    pub fn debug(mut self) -> Self {
        self.options = self.options.with_debug(true);
        self
    }

    /// Clock reading at construction
    pub fn start_at(mut self, start_ms: u64) -> Self {
        self.start_ms = start_ms;
        self
    }

    /// Share a store with another harness (simulates a reload)
    pub fn store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    /// Prefix for generated session ids
    pub fn id_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = prefix.to_string();
        self
    }

    /// Do not answer snapshot requests with an event
    pub fn without_snapshots(mut self) -> Self {
        self.snapshot_source = false;
        self
    }

    pub fn build(self) -> Harness {
        let chunks = ChunkLog::default();
        let mode = match self.mode {
            Mode::Manual(Some(callback)) => RecorderMode::Manual {
                on_events: Some(callback),
            },
            Mode::Manual(None) => {
                let sink = chunks.clone();
                RecorderMode::Manual {
                    on_events: Some(Box::new(move |chunk| {
                        sink.lock().unwrap().push(chunk);
                        Ok(())
                    })),
                }
            }
            Mode::Auto {
                write_code,
                user_id,
            } => RecorderMode::Auto {
                write_code,
                user_id,
            },
        };
        let config = RecorderConfig {
            mode,
            options: self.options,
        };

        let clock = ManualClock::new(self.start_ms);
        let mut capture = ChannelCaptureEngine::new();
        if self.snapshot_source {
            let snapshot_clock = clock.clone();
            capture = capture.with_snapshot_source(move || {
                Some(full_snapshot(snapshot_clock.now_ms() as i64))
            });
        }
        let capture_handle = capture.handle();
        let visibility = ChannelVisibility::new();
        let visibility_handle = visibility.handle();

        let env = RecorderEnvironment::new()
            .with_store(self.store.clone())
            .with_capture(capture)
            .with_visibility(visibility)
            .with_transport(self.transport.clone())
            .with_clock(clock.clone())
            .with_id_generator(SequentialIds::new(self.id_prefix));

        Harness {
            recorder: SessionRecorder::new(config, env),
            store: self.store,
            clock,
            capture: capture_handle,
            visibility: visibility_handle,
            chunks,
            transport: self.transport,
        }
    }
}
