//! Central error types for Cursor Flow.
//!
//! This module provides typed errors for better error handling across the codebase.
//! All errors implement `Serialize` so job state can carry them to API callers.

use serde::Serialize;
use thiserror::Error;

/// Main error type for Cursor Flow operations.
#[derive(Error, Debug)]
pub enum CursorFlowError {
    /// Input video could not be opened or probed
    #[error("Could not open video: {0}")]
    InputUnreadable(String),

    /// FFmpeg binary not found
    #[error("FFmpeg not found. Please ensure FFmpeg is installed or bundled.")]
    FfmpegNotFound,

    /// External encoder exited abnormally
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Frame decoding failed mid-stream
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Caller-supplied trajectory failed ordering/shape validation
    #[error("Malformed waypoints: {0}")]
    MalformedWaypoints(String),

    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Serialize as the display string so job state can carry errors verbatim.
impl Serialize for CursorFlowError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<String> for CursorFlowError {
    fn from(msg: String) -> Self {
        CursorFlowError::Other(msg)
    }
}

impl From<&str> for CursorFlowError {
    fn from(msg: &str) -> Self {
        CursorFlowError::Other(msg.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// Similar to anyhow's `Context` trait, this allows chaining context
/// information onto errors for better debugging.
pub trait ResultExt<T> {
    /// Add context to an error, converting it to CursorFlowError::Other.
    fn context(self, msg: &str) -> CursorFlowResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> CursorFlowResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> CursorFlowResult<T> {
        self.map_err(|e| CursorFlowError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> CursorFlowResult<T> {
        self.map_err(|e| CursorFlowError::Other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for adding context to Option types.
pub trait OptionExt<T> {
    /// Convert None to CursorFlowError::Other with the given message.
    fn context(self, msg: &str) -> CursorFlowResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> CursorFlowResult<T> {
        self.ok_or_else(|| CursorFlowError::Other(msg.to_string()))
    }
}

/// Type alias for Results using CursorFlowError.
pub type CursorFlowResult<T> = Result<T, CursorFlowError>;
