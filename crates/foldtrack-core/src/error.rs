//! Core error types for foldtrack-core.
//!
//! Storage failures propagate to the caller -- silently defaulting a counter
//! read would corrupt the counts. Sensor sample errors are non-fatal: the
//! detector discards the sample and keeps listening.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for foldtrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Durable store errors
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Sensor sample errors
    #[error("invalid hinge sample: {0}")]
    Sample(#[from] SampleError),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Durable key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing store
    #[error("failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read or write against the backing store failed
    #[error("store query failed: {0}")]
    QueryFailed(String),

    /// The store cannot currently serve requests
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A persisted value could not be decoded
    #[error("malformed value for key '{key}': {message}")]
    MalformedValue { key: String, message: String },

    /// A persisted value has the wrong type for its key
    #[error("type mismatch for key '{key}': expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Hinge sensor sample errors. Never fatal; offending samples are discarded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// Angle outside the physical hinge range
    #[error("hinge angle {angle} outside 0..=180 degrees")]
    OutOfRange { angle: i32 },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Unavailable("database is locked".to_string())
                } else {
                    StoreError::QueryFailed(e.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
