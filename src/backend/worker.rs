//! Delivery worker thread
//!
//! Auto-mode uploads run here so a slow or unreachable collector never
//! blocks event ingestion. The recorder submits chunks over a crossbeam
//! channel and forgets them: each chunk gets exactly one attempt, failures
//! are logged and counted, nothing is queued for retry.
//!
//! The queue is bounded. When the collector falls behind, new chunks are
//! dropped instead of piling up. Shutdown closes the queue and gives the
//! thread a grace period to drain it; after that the thread is detached and
//! discards whatever is still queued.

use super::delivery::{DeliveryChannel, DeliveryOutcome};
use crate::error::{RecorderError, Result};
use crate::types::EventChunk;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Chunks waiting for the worker before new ones are dropped
pub const DELIVERY_QUEUE_CAPACITY: usize = 32;

/// How long shutdown waits for queued uploads
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Snapshot of delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Chunks accepted by the collector
    pub delivered: u64,
    /// Chunks skipped for lack of a credential
    pub skipped: u64,
    /// Chunks lost to encoding or transport errors
    pub failed: u64,
    /// Chunks never attempted: queue full, or still queued at shutdown
    pub dropped: u64,
    /// Events contained in delivered chunks
    pub events_delivered: u64,
}

impl DeliveryStats {
    /// Total chunks the worker has finished with
    pub fn total(&self) -> u64 {
        self.delivered + self.skipped + self.failed + self.dropped
    }
}

#[derive(Debug, Default)]
struct SharedStats {
    delivered: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    events_delivered: AtomicU64,
}

impl SharedStats {
    fn record(&self, outcome: &DeliveryOutcome, events: usize) {
        match outcome {
            DeliveryOutcome::Delivered => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                self.events_delivered
                    .fetch_add(events as u64, Ordering::Relaxed);
            }
            DeliveryOutcome::Skipped => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            DeliveryOutcome::Failed(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DeliveryStats {
        DeliveryStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
        }
    }
}

/// Background thread owning the [`DeliveryChannel`]
#[derive(Debug)]
pub struct DeliveryWorker {
    chunk_tx: Option<Sender<EventChunk>>,
    handle: Option<JoinHandle<()>>,
    done_rx: Receiver<()>,
    cancelled: Arc<AtomicBool>,
    stats: Arc<SharedStats>,
    grace: Duration,
}

impl DeliveryWorker {
    /// Spawn the worker thread
    pub fn spawn(channel: DeliveryChannel, debug: bool) -> Result<Self> {
        let (chunk_tx, chunk_rx) = bounded(DELIVERY_QUEUE_CAPACITY);
        let (done_tx, done_rx) = bounded(1);
        let stats = Arc::new(SharedStats::default());
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_stats = Arc::clone(&stats);
        let worker_cancelled = Arc::clone(&cancelled);

        let handle = std::thread::Builder::new()
            .name("sessionlens-delivery".to_string())
            .spawn(move || {
                run(channel, chunk_rx, &worker_stats, &worker_cancelled, debug);
                let _ = done_tx.send(());
            })
            .map_err(|e| RecorderError::Channel(format!("failed to spawn delivery worker: {}", e)))?;

        Ok(Self {
            chunk_tx: Some(chunk_tx),
            handle: Some(handle),
            done_rx,
            cancelled,
            stats,
            grace: DEFAULT_SHUTDOWN_GRACE,
        })
    }

    /// Override how long [`shutdown`](Self::shutdown) waits for queued uploads
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Hand a chunk to the worker without blocking
    ///
    /// A full queue drops the chunk and counts it as dropped.
    pub fn submit(&self, chunk: EventChunk) -> Result<()> {
        let tx = self
            .chunk_tx
            .as_ref()
            .ok_or_else(|| RecorderError::Channel("delivery worker stopped".to_string()))?;

        match tx.try_send(chunk) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.stats.record_dropped();
                Err(RecorderError::Channel("delivery queue full".to_string()))
            }
            Err(TrySendError::Disconnected(_)) => {
                Err(RecorderError::Channel("delivery worker stopped".to_string()))
            }
        }
    }

    /// Current counters
    pub fn stats(&self) -> DeliveryStats {
        self.stats.snapshot()
    }

    /// Stop accepting chunks and give queued ones the grace period to finish
    ///
    /// Returns false when the deadline passed and the thread was detached.
    /// A detached thread finishes its current upload and drops the rest.
    pub fn shutdown(&mut self) -> bool {
        self.chunk_tx.take();
        let Some(handle) = self.handle.take() else {
            return true;
        };

        match self.done_rx.recv_timeout(self.grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    tracing::warn!("Delivery worker panicked");
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                self.cancelled.store(true, Ordering::SeqCst);
                tracing::warn!(
                    grace_ms = self.grace.as_millis() as u64,
                    "Delivery worker still busy at shutdown, remaining chunks dropped"
                );
                false
            }
        }
    }
}

impl Drop for DeliveryWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    channel: DeliveryChannel,
    chunk_rx: Receiver<EventChunk>,
    stats: &SharedStats,
    cancelled: &AtomicBool,
    debug: bool,
) {
    tracing::debug!("Delivery worker started");

    for chunk in chunk_rx.iter() {
        if cancelled.load(Ordering::SeqCst) {
            stats.record_dropped();
            continue;
        }

        let outcome = channel.send(&chunk);
        stats.record(&outcome, chunk.len());

        match &outcome {
            DeliveryOutcome::Delivered => {
                if debug {
                    tracing::debug!(
                        session = %chunk.session_id,
                        events = chunk.len(),
                        chunk_timestamp = chunk.chunk_timestamp,
                        "Chunk delivered"
                    );
                }
            }
            DeliveryOutcome::Skipped => {
                if debug {
                    tracing::debug!("No write code stored, chunk not sent");
                }
            }
            DeliveryOutcome::Failed(reason) => {
                tracing::warn!(
                    session = %chunk.session_id,
                    events = chunk.len(),
                    "Failed to deliver chunk: {}",
                    reason
                );
            }
        }
    }

    tracing::debug!("Delivery worker stopped");
}
