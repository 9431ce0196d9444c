//! Error handling for the session recorder
//!
//! This module defines the internal error type and a Result alias. None of
//! these errors escape the public [`SessionRecorder`](crate::session::SessionRecorder)
//! entry points; they are logged and suppressed there.

use thiserror::Error;

/// Main error type for recorder operations
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Persistent key-value store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// The capture engine failed to start or stop
    #[error("Capture error: {0}")]
    Capture(String),

    /// The collector rejected a chunk
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RecorderError>,
    },
}

impl RecorderError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        RecorderError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for RecorderError {
    fn from(err: serde_json::Error) -> Self {
        RecorderError::Serialization(err.to_string())
    }
}

/// Result type alias for recorder operations
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

/// Why a recorder came up inert instead of live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InertReason {
    /// A required host capability is missing or unusable
    EnvironmentUnsupported(String),
    /// Mode-specific configuration fields are missing or blank
    InvalidConfig(String),
}

impl std::fmt::Display for InertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InertReason::EnvironmentUnsupported(msg) => {
                write!(f, "environment unsupported: {}", msg)
            }
            InertReason::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}
