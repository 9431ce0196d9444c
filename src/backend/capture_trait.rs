//! Collaborator traits for the capture engine and the visibility signal
//!
//! The recorder never observes the page itself. A [`CaptureEngine`] does that
//! and pushes records through an [`EventEmitter`]; a [`VisibilitySource`]
//! reports page visibility transitions through the same emitter. Both sides
//! only ever send, so an engine that emits a snapshot while the recorder is
//! handling an event simply queues it behind the current one.

use crate::config::RecordingOptions;
use crate::error::Result;
use crate::types::{CapturedEvent, RecorderInput, Visibility};
use crossbeam_channel::{unbounded, Receiver, Sender};

#[cfg(test)]
use mockall::automock;

/// Full-snapshot cadence requested from the engine (one every N events)
pub const CHECKOUT_EVERY_NTH: u32 = 100;

/// Optional engine plugins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePlugin {
    /// Record console output alongside DOM events
    ConsoleRecord,
}

/// Options handed to the engine at start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Mask the value of every input
    pub mask_all_inputs: bool,
    /// Mask password inputs
    pub mask_password_inputs: bool,
    /// Emit a fresh full snapshot every N events
    pub checkout_every_nth: Option<u32>,
    /// Engine plugins to enable
    pub plugins: Vec<CapturePlugin>,
}

impl CaptureOptions {
    /// Derive engine options from the recorder's masking settings
    pub fn from_recording(options: &RecordingOptions) -> Self {
        Self {
            mask_all_inputs: options.mask_all_inputs(),
            mask_password_inputs: options.mask_passwords(),
            checkout_every_nth: Some(CHECKOUT_EVERY_NTH),
            plugins: vec![CapturePlugin::ConsoleRecord],
        }
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::from_recording(&RecordingOptions::default())
    }
}

/// Sending half of the recorder's input queue
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: Sender<RecorderInput>,
}

impl EventEmitter {
    /// Create an emitter and the receiving end the recorder drains
    pub fn channel() -> (EventEmitter, Receiver<RecorderInput>) {
        let (tx, rx) = unbounded();
        (EventEmitter { tx }, rx)
    }

    /// Emit a captured event; returns false once the recorder is gone
    pub fn emit(&self, event: CapturedEvent) -> bool {
        self.tx.send(RecorderInput::Event(event)).is_ok()
    }

    /// Report a visibility transition; returns false once the recorder is gone
    pub fn visibility(&self, visibility: Visibility) -> bool {
        self.tx.send(RecorderInput::Visibility(visibility)).is_ok()
    }
}

/// DOM capture engine contract
#[cfg_attr(test, automock)]
pub trait CaptureEngine: Send {
    /// Begin observing; events go to `emitter` until [`stop`](Self::stop)
    fn start(&mut self, options: &CaptureOptions, emitter: EventEmitter) -> Result<()>;

    /// Take a full-state snapshot now
    ///
    /// The returned events (meta plus full snapshot, in order) are placed in
    /// the buffer ahead of anything captured afterwards.
    fn request_full_snapshot(&mut self) -> Vec<CapturedEvent>;

    /// Halt capture and release engine resources
    fn stop(&mut self);
}

/// Handle identifying a visibility subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Page visibility signal contract
#[cfg_attr(test, automock)]
pub trait VisibilitySource: Send {
    /// Start forwarding visibility transitions to `emitter`
    fn subscribe(&mut self, emitter: EventEmitter) -> Result<ListenerId>;

    /// Stop forwarding for the given subscription
    fn unsubscribe(&mut self, id: ListenerId);
}
