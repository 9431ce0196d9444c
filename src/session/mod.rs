//! Session recording
//!
//! This module owns everything between a captured event and a dispatched
//! chunk: session identity and expiry, buffering, flush throttling and the
//! recorder that drives them.
//!
//! # Features
//!
//! - Sessions persist across recorder restarts until 30 minutes (by default)
//!   pass without user interaction
//! - Events are flushed in chunks once the buffer fills, at most once per
//!   flush interval
//! - Visibility changes refresh the capture with a full snapshot
//! - Hosts without the required capabilities get an inert recorder

pub mod buffer;
pub mod dispatch;
pub mod environment;
pub mod id;
pub mod lifecycle;
pub mod recorder;
pub mod throttle;
pub mod types;

pub use buffer::EventBuffer;
pub use dispatch::ChunkDispatcher;
pub use environment::RecorderEnvironment;
pub use id::{IdGenerator, SequentialIds, UuidGenerator};
pub use lifecycle::SessionManager;
pub use recorder::{ActiveRecorder, SessionRecorder};
pub use throttle::Throttle;
pub use types::{ActivityOutcome, SessionState};
