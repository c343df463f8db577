//! Error types for the Folio content store.

use crate::types::RowId;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Row not found: {0}")]
    RowNotFound(RowId),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            err.to_string(),
        ))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Errors surfaced by content manager operations.
///
/// Absent rows are never errors; lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Aspect '{name}' could not be converted: {message}")]
    Aspect { name: String, message: String },
}

impl From<config::ConfigError> for ContentError {
    fn from(err: config::ConfigError) -> Self {
        ContentError::Config(err.to_string())
    }
}
