//! Error types for formica_io crate.
//!
//! Provides structured error handling for every persistence format: the
//! binary save file, rkyv snapshots, JSON and the statistics log.

use formica_core::SimError;
use thiserror::Error;

/// Main error type for formica_io operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Rkyv-specific errors
    #[error("Rkyv error: {0}")]
    Rkyv(String),

    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed save file content
    #[error("Format error: {0}")]
    Format(String),

    /// Input ended in the middle of a record
    #[error("Unexpected end of data while reading {0}")]
    Truncated(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Decoded data the engine refused to accept
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

/// Result type alias for formica_io operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a new Rkyv error.
    #[must_use]
    pub fn rkyv<S: Into<String>>(msg: S) -> Self {
        Self::Rkyv(msg.into())
    }

    /// Creates a new format error.
    #[must_use]
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Self::Format(msg.into())
    }

    /// Creates a new truncation error naming the field being read.
    #[must_use]
    pub fn truncated<S: Into<String>>(what: S) -> Self {
        Self::Truncated(what.into())
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
