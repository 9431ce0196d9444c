//! Collaborators at the edges of the recorder
//!
//! The recorder core is pure orchestration. Everything that touches the
//! outside world lives here, behind traits so hosts can swap implementations:
//!
//! - [`CaptureEngine`] / [`VisibilitySource`] - inbound: page observation and
//!   visibility transitions, delivered through an [`EventEmitter`]
//! - [`ChannelCaptureEngine`] / [`ChannelVisibility`] - host-driven adapters
//! - [`Transport`] / [`HttpTransport`] - outbound HTTP upload
//! - [`DeliveryChannel`] - builds the authenticated upload for a chunk
//! - [`DeliveryWorker`] - runs uploads on a background thread
//!
//! # Architecture
//!
//! ```text
//! CaptureEngine ──┐
//!                 ├─ EventEmitter ─▶ SessionRecorder ─▶ DeliveryWorker ─▶ Transport
//! VisibilitySource┘                        │
//!                                          └─▶ manual-mode callback
//! ```

pub mod capture_trait;
pub mod channel_capture;
pub mod delivery;
pub mod payload;
pub mod transport;
pub mod worker;

pub use capture_trait::{
    CaptureEngine, CaptureOptions, CapturePlugin, EventEmitter, ListenerId, VisibilitySource,
    CHECKOUT_EVERY_NTH,
};
pub use channel_capture::{
    CaptureHandle, ChannelCaptureEngine, ChannelVisibility, SnapshotSource, VisibilityHandle,
};
pub use delivery::{DeliveryChannel, DeliveryOutcome};
pub use payload::{decode_payload, encode_payload, UploadBody};
pub use transport::{HttpTransport, Transport, UploadRequest};
pub use worker::{DeliveryStats, DeliveryWorker};
