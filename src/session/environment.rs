//! Host capabilities handed to the recorder at construction

use super::id::{IdGenerator, UuidGenerator};
use crate::backend::{CaptureEngine, Transport, VisibilitySource};
use crate::clock::{Clock, SystemClock};
use crate::storage::KeyValueStore;

/// Everything the recorder needs from its host
///
/// Storage, a capture engine and a visibility source are required; a recorder
/// built without one of them comes up inert. Clock and id generation default
/// to the system clock and random v4 UUIDs. Without an explicit transport,
/// auto mode uploads over HTTP.
pub struct RecorderEnvironment {
    pub store: Option<Box<dyn KeyValueStore>>,
    pub capture: Option<Box<dyn CaptureEngine>>,
    pub visibility: Option<Box<dyn VisibilitySource>>,
    pub transport: Option<Box<dyn Transport>>,
    pub clock: Box<dyn Clock>,
    pub ids: Box<dyn IdGenerator>,
}

impl Default for RecorderEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderEnvironment {
    pub fn new() -> Self {
        Self {
            store: None,
            capture: None,
            visibility: None,
            transport: None,
            clock: Box::new(SystemClock),
            ids: Box::new(UuidGenerator),
        }
    }

    pub fn with_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_capture(mut self, capture: impl CaptureEngine + 'static) -> Self {
        self.capture = Some(Box::new(capture));
        self
    }

    pub fn with_visibility(mut self, visibility: impl VisibilitySource + 'static) -> Self {
        self.visibility = Some(Box::new(visibility));
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }
}

impl std::fmt::Debug for RecorderEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecorderEnvironment")
            .field("store", &self.store.is_some())
            .field("capture", &self.capture.is_some())
            .field("visibility", &self.visibility.is_some())
            .field("transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}
