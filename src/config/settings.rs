//! Recording options shared by both recorder modes
//!
//! These settings are plain data: they can be built in code, or loaded from a
//! TOML file. Every field has a default, so a partial file is valid.
//!
//! ```toml
//! timeout_ms = 1800000
//! buffer_size = 10
//! masking_options = ["passwords"]
//! debug = true
//! ```

use crate::error::{RecorderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default inactivity window before a session expires (30 minutes)
pub const DEFAULT_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Default number of buffered events that triggers a flush request
pub const DEFAULT_BUFFER_SIZE: usize = 10;

/// Minimum spacing between two executed flushes
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 5000;

/// Collector endpoint used in auto mode
pub const DEFAULT_COLLECTOR_URL: &str = "https://sessions.userlens.io";

/// Timeout for a single upload request
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Input masking applied by the capture engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskingOption {
    /// Mask password inputs only
    Passwords,
    /// Mask every input
    All,
}

impl std::fmt::Display for MaskingOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaskingOption::Passwords => write!(f, "passwords"),
            MaskingOption::All => write!(f, "all"),
        }
    }
}

/// Options controlling session expiry, batching and delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingOptions {
    /// Inactivity window after which the session is replaced
    pub timeout_ms: u64,

    /// Buffered event count that requests a flush
    pub buffer_size: usize,

    /// Throttle window between executed flushes
    pub flush_interval_ms: u64,

    /// Masking flags forwarded to the capture engine
    pub masking_options: Vec<MaskingOption>,

    /// Base URL of the collector (auto mode)
    pub collector_url: String,

    /// Per-request upload timeout (auto mode)
    pub request_timeout_ms: u64,

    /// Emit diagnostic logs for every event and flush
    pub debug: bool,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            masking_options: vec![MaskingOption::Passwords],
            collector_url: DEFAULT_COLLECTOR_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            debug: false,
        }
    }
}

impl RecordingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_masking(mut self, masking: impl IntoIterator<Item = MaskingOption>) -> Self {
        self.masking_options = masking.into_iter().collect();
        self
    }

    pub fn with_collector_url(mut self, url: impl Into<String>) -> Self {
        self.collector_url = url.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Whether every input should be masked
    pub fn mask_all_inputs(&self) -> bool {
        self.masking_options.contains(&MaskingOption::All)
    }

    /// Whether password inputs should be masked
    pub fn mask_passwords(&self) -> bool {
        self.masking_options.contains(&MaskingOption::Passwords)
    }

    /// Load options from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecorderError::Config(format!("Failed to read options file {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            RecorderError::Config(format!("Failed to parse options file {:?}: {}", path, e))
        })
    }

    /// Load options, returning defaults if anything goes wrong
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load recording options, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save options to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RecorderError::Config(format!("Failed to create options directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RecorderError::Config(format!("Failed to serialize options: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            RecorderError::Config(format!("Failed to write options file {:?}: {}", path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let options = RecordingOptions::default();
        assert_eq!(options.timeout(), Duration::from_secs(30 * 60));
        assert_eq!(options.buffer_size, 10);
        assert_eq!(options.flush_interval(), Duration::from_secs(5));
        assert!(options.mask_passwords());
        assert!(!options.mask_all_inputs());
        assert!(!options.debug);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let options: RecordingOptions = toml::from_str(
            r#"
            buffer_size = 2
            masking_options = ["all"]
            "#,
        )
        .unwrap();

        assert_eq!(options.buffer_size, 2);
        assert!(options.mask_all_inputs());
        assert!(!options.mask_passwords());
        assert_eq!(options.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(options.collector_url, DEFAULT_COLLECTOR_URL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("options.toml");

        let options = RecordingOptions::new()
            .with_timeout(Duration::from_secs(60))
            .with_buffer_size(25)
            .with_debug(true);
        options.save(&path).unwrap();

        let loaded = RecordingOptions::load(&path).unwrap();
        assert_eq!(loaded, options);
    }

    #[test]
    fn test_load_or_default_on_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.toml");
        std::fs::write(&path, "buffer_size = \"lots\"").unwrap();

        let options = RecordingOptions::load_or_default(&path);
        assert_eq!(options, RecordingOptions::default());
    }
}
