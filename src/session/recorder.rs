//! Session recorder: the orchestration core
//!
//! Ties the session lifecycle, the event buffer, the flush throttle and the
//! chunk dispatcher together. Inputs arrive through the [`EventEmitter`]
//! handed to the capture engine and visibility source, and are processed in
//! order by [`SessionRecorder::pump`] (or [`SessionRecorder::run`]).
//!
//! Construction never fails: a host that cannot support recording gets an
//! inert recorder whose every operation is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use super::buffer::EventBuffer;
use super::dispatch::ChunkDispatcher;
use super::environment::RecorderEnvironment;
use super::lifecycle::SessionManager;
use super::throttle::Throttle;
use super::types::{ActivityOutcome, SessionState};
use crate::backend::{
    CaptureEngine, CaptureOptions, DeliveryChannel, DeliveryStats, DeliveryWorker, EventEmitter,
    HttpTransport, ListenerId, Transport, VisibilitySource,
};
use crate::clock::Clock;
use crate::config::{RecorderConfig, RecordingOptions, ValidatedMode};
use crate::error::InertReason;
use crate::storage::{probe, save_write_code};
use crate::types::{CapturedEvent, RecorderInput, Visibility};

/// Poll interval of [`SessionRecorder::run`]
const RUN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Session recorder, live or inert
#[derive(Debug)]
pub enum SessionRecorder {
    /// Recording (or stopped after recording)
    Active(Box<ActiveRecorder>),
    /// Never started; every operation is a no-op
    Inert(InertReason),
}

impl SessionRecorder {
    /// Build and start a recorder
    ///
    /// Host capabilities are checked first, then the configuration. Any
    /// problem yields [`SessionRecorder::Inert`] instead of an error.
    pub fn new(config: RecorderConfig, env: RecorderEnvironment) -> Self {
        let debug = config.options.debug;
        match ActiveRecorder::start(config, env) {
            Ok(active) => SessionRecorder::Active(Box::new(active)),
            Err(reason) => {
                match &reason {
                    InertReason::InvalidConfig(_) => {
                        if debug {
                            tracing::warn!("Recorder not started: {}", reason);
                        }
                    }
                    InertReason::EnvironmentUnsupported(_) => {
                        tracing::info!("Recorder not started: {}", reason);
                    }
                }
                SessionRecorder::Inert(reason)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionRecorder::Active(active) if active.state.is_recording())
    }

    /// Why the recorder never started, if it did not
    pub fn inert_reason(&self) -> Option<&InertReason> {
        match self {
            SessionRecorder::Inert(reason) => Some(reason),
            SessionRecorder::Active(_) => None,
        }
    }

    pub fn state(&self) -> SessionState {
        match self {
            SessionRecorder::Active(active) => active.state,
            SessionRecorder::Inert(_) => SessionState::Idle,
        }
    }

    /// Current session id; `None` on an inert recorder
    ///
    /// After `stop()` the last id is still reported.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            SessionRecorder::Active(active) => Some(active.session.session_id()),
            SessionRecorder::Inert(_) => None,
        }
    }

    /// Events waiting for the next flush
    pub fn buffered_len(&self) -> usize {
        match self {
            SessionRecorder::Active(active) => active.buffer.len(),
            SessionRecorder::Inert(_) => 0,
        }
    }

    /// Another sender for the input queue, for hosts that push events
    /// themselves
    pub fn emitter(&self) -> Option<EventEmitter> {
        match self {
            SessionRecorder::Active(active) => Some(active.emitter.clone()),
            SessionRecorder::Inert(_) => None,
        }
    }

    /// Upload counters (auto mode only)
    pub fn delivery_stats(&self) -> Option<DeliveryStats> {
        match self {
            SessionRecorder::Active(active) => active.dispatcher.delivery_stats(),
            SessionRecorder::Inert(_) => None,
        }
    }

    /// Process every queued input; returns how many were taken
    pub fn pump(&mut self) -> usize {
        match self {
            SessionRecorder::Active(active) => active.pump(),
            SessionRecorder::Inert(_) => 0,
        }
    }

    /// Block processing inputs until `running` clears or the recorder stops
    pub fn run(&mut self, running: &AtomicBool) {
        if let SessionRecorder::Active(active) = self {
            active.run(running);
        }
    }

    /// Ingest one captured event directly
    pub fn handle_event(&mut self, event: CapturedEvent) {
        if let SessionRecorder::Active(active) = self {
            active.handle_event(event);
        }
    }

    /// React to a page visibility transition
    pub fn handle_visibility_change(&mut self, visibility: Visibility) {
        if let SessionRecorder::Active(active) = self {
            active.handle_visibility_change(visibility);
        }
    }

    /// Flush the buffer now, ignoring the throttle
    pub fn flush_now(&mut self) {
        if let SessionRecorder::Active(active) = self {
            active.flush_now();
        }
    }

    /// Replace the current session with a fresh one
    pub fn reset_session(&mut self) {
        if let SessionRecorder::Active(active) = self {
            active.reset_session();
        }
    }

    /// Stop recording; safe to call any number of times
    pub fn stop(&mut self) {
        if let SessionRecorder::Active(active) = self {
            active.stop();
        }
    }
}

/// State of a recorder that started successfully
pub struct ActiveRecorder {
    options: RecordingOptions,
    state: SessionState,
    session: SessionManager,
    buffer: EventBuffer,
    throttle: Throttle,
    dispatcher: ChunkDispatcher,
    capture: Box<dyn CaptureEngine>,
    visibility: Box<dyn VisibilitySource>,
    listener: Option<ListenerId>,
    clock: Box<dyn Clock>,
    emitter: EventEmitter,
    inputs: Receiver<RecorderInput>,
}

impl ActiveRecorder {
    fn start(
        config: RecorderConfig,
        env: RecorderEnvironment,
    ) -> std::result::Result<Self, InertReason> {
        let RecorderEnvironment {
            store,
            capture,
            visibility,
            transport,
            clock,
            ids,
        } = env;

        let mut store = store.ok_or_else(|| unsupported("no persistent storage"))?;
        probe(store.as_mut()).map_err(|e| unsupported(format!("storage unusable: {}", e)))?;
        let mut capture = capture.ok_or_else(|| unsupported("no capture engine"))?;
        let mut visibility = visibility.ok_or_else(|| unsupported("no visibility signal"))?;

        let config = config.validate()?;
        let options = config.options;
        let debug = options.debug;

        let dispatcher = match config.mode {
            ValidatedMode::Auto {
                write_code,
                user_id,
            } => {
                save_write_code(store.as_mut(), &write_code)
                    .map_err(|e| unsupported(format!("failed to store write code: {}", e)))?;
                let transport = match transport {
                    Some(transport) => transport,
                    None => default_transport(&options)?,
                };
                let channel = DeliveryChannel::new(
                    store.as_ref(),
                    transport,
                    options.collector_url.clone(),
                );
                let worker = DeliveryWorker::spawn(channel, debug)
                    .map_err(|e| unsupported(e.to_string()))?;
                ChunkDispatcher::Upload { worker, user_id }
            }
            ValidatedMode::Manual { on_events } => ChunkDispatcher::Callback { on_events },
        };

        let session = SessionManager::start(store, ids, options.timeout_ms, clock.now_ms())
            .with_debug(debug);

        let (emitter, inputs) = EventEmitter::channel();
        capture
            .start(&CaptureOptions::from_recording(&options), emitter.clone())
            .map_err(|e| unsupported(format!("capture engine failed to start: {}", e)))?;

        let listener = match visibility.subscribe(emitter.clone()) {
            Ok(listener) => listener,
            Err(e) => {
                capture.stop();
                return Err(unsupported(format!("visibility subscription failed: {}", e)));
            }
        };

        tracing::info!(
            session = %session.session_id(),
            manual = matches!(dispatcher, ChunkDispatcher::Callback { .. }),
            "Recording started"
        );

        Ok(Self {
            throttle: Throttle::new(options.flush_interval_ms),
            buffer: EventBuffer::with_capacity(options.buffer_size),
            options,
            state: SessionState::Recording,
            session,
            dispatcher,
            capture,
            visibility,
            listener: Some(listener),
            clock,
            emitter,
            inputs,
        })
    }

    fn pump(&mut self) -> usize {
        let mut taken = 0;
        while let Ok(input) = self.inputs.try_recv() {
            taken += 1;
            self.handle_input(input);
        }
        taken
    }

    fn run(&mut self, running: &AtomicBool) {
        while running.load(Ordering::SeqCst) && self.state.is_recording() {
            match self.inputs.recv_timeout(RUN_POLL_INTERVAL) {
                Ok(input) => self.handle_input(input),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    fn handle_input(&mut self, input: RecorderInput) {
        match input {
            RecorderInput::Event(event) => self.handle_event(event),
            RecorderInput::Visibility(visibility) => self.handle_visibility_change(visibility),
        }
    }

    fn handle_event(&mut self, event: CapturedEvent) {
        if !self.state.is_recording() {
            return;
        }

        let now = self.clock.now_ms();
        let outcome = self
            .session
            .note_activity(now, event.is_user_interaction());
        if outcome.is_reset() {
            self.discard_buffer("session expired");
            self.take_full_snapshot();
        }

        if self.options.debug {
            tracing::debug!(
                kind = event.event_type.name(),
                timestamp = event.timestamp,
                buffered = self.buffer.len() + 1,
                "Event captured"
            );
        }

        self.buffer.push(event);
        if self.buffer.len() >= self.options.buffer_size {
            self.request_flush(now);
        }
    }

    fn handle_visibility_change(&mut self, visibility: Visibility) {
        if !self.state.is_recording() || visibility == Visibility::Hidden {
            return;
        }

        let now = self.clock.now_ms();
        if self.session.is_expired(now) {
            self.session.reset(now);
            self.discard_buffer("session expired while hidden");
        }
        self.take_full_snapshot();
        if self.buffer.len() >= self.options.buffer_size {
            self.request_flush(now);
        }
    }

    /// Put a fresh full snapshot into the buffer, ahead of later events
    fn take_full_snapshot(&mut self) {
        for event in self.capture.request_full_snapshot() {
            self.buffer.push(event);
        }
    }

    fn request_flush(&mut self, now: u64) {
        if self.throttle.try_fire(now) {
            self.flush();
        } else if self.options.debug {
            tracing::debug!(buffered = self.buffer.len(), "Flush throttled");
        }
    }

    fn flush(&mut self) {
        let user_id = self.dispatcher.user_id().map(str::to_string);
        let Some(chunk) = self
            .buffer
            .drain_chunk(self.session.session_id(), user_id.as_deref())
        else {
            return;
        };

        if self.options.debug {
            tracing::debug!(
                session = %chunk.session_id,
                events = chunk.len(),
                chunk_timestamp = chunk.chunk_timestamp,
                "Flushing chunk"
            );
        }
        self.dispatcher.dispatch(chunk);
    }

    fn flush_now(&mut self) {
        if self.state.is_recording() {
            self.flush();
        }
    }

    fn reset_session(&mut self) {
        if !self.state.is_recording() {
            return;
        }

        let now = self.clock.now_ms();
        if let ActivityOutcome::Reset { previous, current } = self.session.reset(now) {
            if self.options.debug {
                tracing::debug!(%previous, %current, "Session reset by host");
            }
        }
        self.discard_buffer("session reset");
        self.take_full_snapshot();
        if self.buffer.len() >= self.options.buffer_size {
            self.request_flush(now);
        }
    }

    fn discard_buffer(&mut self, why: &str) {
        let dropped = self.buffer.clear();
        if dropped > 0 && self.options.debug {
            tracing::debug!(dropped, "Buffered events discarded: {}", why);
        }
    }

    /// Tear down capture and delivery without touching persisted state
    fn release(&mut self) -> bool {
        if self.state.is_stopped() {
            return false;
        }
        self.state = SessionState::Stopped;

        self.capture.stop();
        if let Some(listener) = self.listener.take() {
            self.visibility.unsubscribe(listener);
        }

        let pending = self.inputs.try_iter().count();
        let dropped = self.buffer.clear() + pending;
        if dropped > 0 && self.options.debug {
            tracing::debug!(dropped, "Unflushed events discarded on stop");
        }

        self.dispatcher.shutdown();
        true
    }

    fn stop(&mut self) {
        if self.release() {
            self.session.clear();
            tracing::info!(session = %self.session.session_id(), "Recording stopped");
        }
    }
}

impl Drop for ActiveRecorder {
    fn drop(&mut self) {
        // Persisted session survives a drop so the next recorder resumes it
        self.release();
    }
}

impl std::fmt::Debug for ActiveRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRecorder")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("buffered", &self.buffer.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn unsupported(msg: impl Into<String>) -> InertReason {
    InertReason::EnvironmentUnsupported(msg.into())
}

fn default_transport(
    options: &RecordingOptions,
) -> std::result::Result<Box<dyn Transport>, InertReason> {
    HttpTransport::new(options.request_timeout())
        .map(|t| Box::new(t) as Box<dyn Transport>)
        .map_err(|e| unsupported(format!("HTTP client unavailable: {}", e)))
}
