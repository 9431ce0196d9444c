//! Channel-fed capture engine and visibility source
//!
//! For hosts where the actual page observer lives elsewhere (a WebView
//! bridge, a replayed event log), these adapters let that code push records
//! into a running recorder through cloneable handles.
//!
//! # Example
//!
//! ```ignore
//! use sessionlens_rs::backend::ChannelCaptureEngine;
//!
//! let engine = ChannelCaptureEngine::new();
//! let handle = engine.handle();
//!
//! // Give `engine` to the recorder, keep `handle` in the bridge
//! handle.emit(event);
//! ```

use super::capture_trait::{CaptureEngine, CaptureOptions, EventEmitter, ListenerId, VisibilitySource};
use crate::error::{RecorderError, Result};
use crate::types::{CapturedEvent, Visibility};
use std::sync::{Arc, Mutex, MutexGuard};

/// Produces a full-state snapshot event on request
pub type SnapshotSource = Box<dyn FnMut() -> Option<CapturedEvent> + Send>;

#[derive(Default)]
struct CaptureShared {
    emitter: Option<EventEmitter>,
    options: Option<CaptureOptions>,
    snapshot_source: Option<SnapshotSource>,
    snapshot_requests: usize,
    starts: usize,
    stops: usize,
}

fn lock(shared: &Mutex<CaptureShared>) -> MutexGuard<'_, CaptureShared> {
    // A panic inside a snapshot source must not wedge the engine
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Capture engine whose events are pushed by the host
pub struct ChannelCaptureEngine {
    shared: Arc<Mutex<CaptureShared>>,
}

impl Default for ChannelCaptureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelCaptureEngine {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(CaptureShared::default())),
        }
    }

    /// Answer full-snapshot requests with the event returned by `source`
    pub fn with_snapshot_source<F>(self, source: F) -> Self
    where
        F: FnMut() -> Option<CapturedEvent> + Send + 'static,
    {
        lock(&self.shared).snapshot_source = Some(Box::new(source));
        self
    }

    /// Host-side handle for pushing events and inspecting engine state
    pub fn handle(&self) -> CaptureHandle {
        CaptureHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl CaptureEngine for ChannelCaptureEngine {
    fn start(&mut self, options: &CaptureOptions, emitter: EventEmitter) -> Result<()> {
        let mut shared = lock(&self.shared);
        if shared.emitter.is_some() {
            return Err(RecorderError::Capture("capture already started".to_string()));
        }
        shared.emitter = Some(emitter);
        shared.options = Some(options.clone());
        shared.starts += 1;
        Ok(())
    }

    fn request_full_snapshot(&mut self) -> Vec<CapturedEvent> {
        let mut shared = lock(&self.shared);
        shared.snapshot_requests += 1;
        if shared.emitter.is_none() {
            return Vec::new();
        }

        shared
            .snapshot_source
            .as_mut()
            .and_then(|source| source())
            .into_iter()
            .collect()
    }

    fn stop(&mut self) {
        let mut shared = lock(&self.shared);
        if shared.emitter.take().is_some() {
            shared.stops += 1;
        }
    }
}

/// Cloneable host handle onto a [`ChannelCaptureEngine`]
#[derive(Clone)]
pub struct CaptureHandle {
    shared: Arc<Mutex<CaptureShared>>,
}

impl CaptureHandle {
    /// Push an event into the recorder; dropped if capture is not running
    pub fn emit(&self, event: CapturedEvent) -> bool {
        match lock(&self.shared).emitter.as_ref() {
            Some(emitter) => emitter.emit(event),
            None => false,
        }
    }

    /// Whether the engine has been started and not stopped
    pub fn is_running(&self) -> bool {
        lock(&self.shared).emitter.is_some()
    }

    /// Options the engine was started with
    pub fn options(&self) -> Option<CaptureOptions> {
        lock(&self.shared).options.clone()
    }

    /// Number of full-snapshot requests received so far
    pub fn snapshot_requests(&self) -> usize {
        lock(&self.shared).snapshot_requests
    }

    /// Number of times the engine was started
    pub fn start_count(&self) -> usize {
        lock(&self.shared).starts
    }

    /// Number of times a running engine was stopped
    pub fn stop_count(&self) -> usize {
        lock(&self.shared).stops
    }
}

#[derive(Default)]
struct VisibilityShared {
    emitter: Option<(ListenerId, EventEmitter)>,
    next_id: u64,
    subscribes: usize,
    unsubscribes: usize,
}

/// Visibility source driven by the host
#[derive(Default)]
pub struct ChannelVisibility {
    shared: Arc<Mutex<VisibilityShared>>,
}

impl ChannelVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host-side handle for reporting transitions
    pub fn handle(&self) -> VisibilityHandle {
        VisibilityHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

fn lock_visibility(shared: &Mutex<VisibilityShared>) -> MutexGuard<'_, VisibilityShared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl VisibilitySource for ChannelVisibility {
    fn subscribe(&mut self, emitter: EventEmitter) -> Result<ListenerId> {
        let mut shared = lock_visibility(&self.shared);
        shared.next_id += 1;
        let id = ListenerId(shared.next_id);
        shared.emitter = Some((id, emitter));
        shared.subscribes += 1;
        Ok(id)
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        let mut shared = lock_visibility(&self.shared);
        if shared.emitter.as_ref().is_some_and(|(current, _)| *current == id) {
            shared.emitter = None;
            shared.unsubscribes += 1;
        }
    }
}

/// Cloneable host handle onto a [`ChannelVisibility`]
#[derive(Clone)]
pub struct VisibilityHandle {
    shared: Arc<Mutex<VisibilityShared>>,
}

impl VisibilityHandle {
    /// Report a transition; dropped when nobody is subscribed
    pub fn set(&self, visibility: Visibility) -> bool {
        match lock_visibility(&self.shared).emitter.as_ref() {
            Some((_, emitter)) => emitter.visibility(visibility),
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        lock_visibility(&self.shared).emitter.is_some()
    }

    pub fn subscribe_count(&self) -> usize {
        lock_visibility(&self.shared).subscribes
    }

    pub fn unsubscribe_count(&self) -> usize {
        lock_visibility(&self.shared).unsubscribes
    }
}
