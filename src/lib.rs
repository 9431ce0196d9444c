//! # SessionLens-RS: session recording core
//!
//! Records a user's interaction with a page as a stream of captured events,
//! groups them into sessions that survive restarts until the user goes idle,
//! and ships them in chunks either to a collector endpoint or to a host
//! callback.
//!
//! ## Architecture
//!
//! - **Capture**: a [`backend::CaptureEngine`] observes the page and a
//!   [`backend::VisibilitySource`] reports visibility; both push inputs into
//!   the recorder's queue
//! - **Session**: [`session::SessionRecorder`] tracks the session, buffers
//!   events and flushes them through a throttle
//! - **Delivery**: auto mode uploads on a background worker thread; manual
//!   mode calls the host back inline
//! - **Storage**: session state and the credential live in a
//!   [`storage::KeyValueStore`]
//!
//! ## Example
//!
//! ```ignore
//! use sessionlens_rs::{
//!     backend::{ChannelCaptureEngine, ChannelVisibility},
//!     config::{RecorderConfig, RecordingOptions},
//!     session::{RecorderEnvironment, SessionRecorder},
//!     storage::FileStore,
//! };
//!
//! let capture = ChannelCaptureEngine::new();
//! let events = capture.handle();
//!
//! let env = RecorderEnvironment::new()
//!     .with_store(FileStore::open_default()?)
//!     .with_capture(capture)
//!     .with_visibility(ChannelVisibility::new());
//!
//! let config = RecorderConfig::auto("WRITE_CODE", "user-42")
//!     .with_options(RecordingOptions::default());
//! let mut recorder = SessionRecorder::new(config, env);
//!
//! events.emit(event);
//! recorder.pump();
//! recorder.stop();
//! ```

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::{RecorderConfig, RecorderMode, RecordingOptions};
pub use error::{InertReason, RecorderError, Result};
pub use session::{RecorderEnvironment, SessionRecorder};
pub use types::{CapturedEvent, EventChunk, EventType, RecorderInput, Visibility};
