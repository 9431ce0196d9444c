//! Where flushed chunks go
//!
//! Auto mode queues the chunk on the [`DeliveryWorker`]; manual mode calls
//! the host callback inline. A misbehaving callback (error or panic) is
//! logged and otherwise ignored so later flushes keep working.

use crate::backend::{DeliveryStats, DeliveryWorker};
use crate::config::OnEventsCallback;
use crate::types::EventChunk;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Destination of flushed chunks
pub enum ChunkDispatcher {
    /// Auto mode: upload through the background worker
    Upload {
        worker: DeliveryWorker,
        user_id: String,
    },
    /// Manual mode: hand chunks to the host
    Callback { on_events: OnEventsCallback },
}

impl ChunkDispatcher {
    /// User id stamped on chunks (auto mode only)
    pub fn user_id(&self) -> Option<&str> {
        match self {
            ChunkDispatcher::Upload { user_id, .. } => Some(user_id),
            ChunkDispatcher::Callback { .. } => None,
        }
    }

    /// Hand over a chunk; never fails from the caller's point of view
    pub fn dispatch(&mut self, chunk: EventChunk) {
        match self {
            ChunkDispatcher::Upload { worker, .. } => {
                let session_id = chunk.session_id.clone();
                if let Err(e) = worker.submit(chunk) {
                    tracing::warn!(session = %session_id, "Chunk dropped: {}", e);
                }
            }
            ChunkDispatcher::Callback { on_events } => {
                let session_id = chunk.session_id.clone();
                match catch_unwind(AssertUnwindSafe(|| on_events(chunk))) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(session = %session_id, "onEvents callback failed: {:#}", e);
                    }
                    Err(_) => {
                        tracing::warn!(session = %session_id, "onEvents callback panicked");
                    }
                }
            }
        }
    }

    /// Upload counters, auto mode only
    pub fn delivery_stats(&self) -> Option<DeliveryStats> {
        match self {
            ChunkDispatcher::Upload { worker, .. } => Some(worker.stats()),
            ChunkDispatcher::Callback { .. } => None,
        }
    }

    /// Close the upload queue, waiting at most the worker's grace period;
    /// no-op in manual mode
    pub fn shutdown(&mut self) {
        if let ChunkDispatcher::Upload { worker, .. } = self {
            worker.shutdown();
        }
    }
}
