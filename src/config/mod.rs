//! Configuration module for the session recorder
//!
//! This module handles:
//! - The mode-discriminated recorder configuration ([`RecorderConfig`])
//! - One-shot validation into an immutable [`ValidatedConfig`]
//! - Recording options shared by both modes ([`RecordingOptions`])
//! - The platform data directory used by file-backed storage
//!
//! # App Data Location
//!
//! - **Linux**: `~/.local/share/dev.sessionlens.recorder/`
//! - **macOS**: `~/Library/Application Support/dev.sessionlens.recorder/`
//! - **Windows**: `%APPDATA%\dev.sessionlens.recorder\`
//!
//! # Example
//!
//! ```ignore
//! use sessionlens_rs::config::{RecorderConfig, RecordingOptions};
//!
//! let config = RecorderConfig::auto("WRITE_CODE", "user-42")
//!     .with_options(RecordingOptions::new().with_buffer_size(20));
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{InertReason, RecorderError, Result};
use crate::types::EventChunk;
use std::path::PathBuf;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.sessionlens.recorder";

/// Options filename inside the data directory
pub const OPTIONS_FILE: &str = "options.toml";

/// Storage filename inside the data directory
pub const STORE_FILE: &str = "storage.json";

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        RecorderError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            RecorderError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Host callback receiving chunks in manual mode
///
/// Errors (and panics) are caught by the recorder and never interrupt later
/// flushes.
pub type OnEventsCallback = Box<dyn FnMut(EventChunk) -> anyhow::Result<()> + Send>;

/// How flushed chunks leave the recorder
pub enum RecorderMode {
    /// Upload to the collector, authenticated by the write code
    Auto { write_code: String, user_id: String },
    /// Hand chunks to a host callback
    Manual { on_events: Option<OnEventsCallback> },
}

impl std::fmt::Debug for RecorderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderMode::Auto { user_id, .. } => f
                .debug_struct("Auto")
                .field("write_code", &"<redacted>")
                .field("user_id", user_id)
                .finish(),
            RecorderMode::Manual { on_events } => f
                .debug_struct("Manual")
                .field("on_events", &on_events.is_some())
                .finish(),
        }
    }
}

/// Complete recorder configuration, as supplied by the host
#[derive(Debug)]
pub struct RecorderConfig {
    pub mode: RecorderMode,
    pub options: RecordingOptions,
}

impl RecorderConfig {
    /// Auto-mode configuration
    pub fn auto(write_code: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            mode: RecorderMode::Auto {
                write_code: write_code.into(),
                user_id: user_id.into(),
            },
            options: RecordingOptions::default(),
        }
    }

    /// Manual-mode configuration
    pub fn manual<F>(on_events: F) -> Self
    where
        F: FnMut(EventChunk) -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            mode: RecorderMode::Manual {
                on_events: Some(Box::new(on_events)),
            },
            options: RecordingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RecordingOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate mode-specific fields and normalize options
    pub fn validate(self) -> std::result::Result<ValidatedConfig, InertReason> {
        let mut options = self.options;
        if options.buffer_size == 0 {
            options.buffer_size = 1;
        }

        let mode = match self.mode {
            RecorderMode::Auto {
                write_code,
                user_id,
            } => {
                if write_code.trim().is_empty() {
                    return Err(InertReason::InvalidConfig(
                        "auto mode requires a write code".to_string(),
                    ));
                }
                if user_id.trim().is_empty() {
                    return Err(InertReason::InvalidConfig(
                        "auto mode requires a user id".to_string(),
                    ));
                }
                ValidatedMode::Auto {
                    write_code,
                    user_id,
                }
            }
            RecorderMode::Manual { on_events } => match on_events {
                Some(on_events) => ValidatedMode::Manual { on_events },
                None => {
                    return Err(InertReason::InvalidConfig(
                        "manual mode requires an onEvents callback".to_string(),
                    ))
                }
            },
        };

        Ok(ValidatedConfig { mode, options })
    }
}

/// Mode after validation; every required field is present
pub enum ValidatedMode {
    Auto { write_code: String, user_id: String },
    Manual { on_events: OnEventsCallback },
}

impl ValidatedMode {
    pub fn is_manual(&self) -> bool {
        matches!(self, ValidatedMode::Manual { .. })
    }
}

/// Configuration accepted by the recorder; immutable from here on
pub struct ValidatedConfig {
    pub mode: ValidatedMode,
    pub options: RecordingOptions,
}
