//! Error types for plan and counter storage

use crate::error::{ErrorCode, PacemakerError};
use std::fmt;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backend rejected or failed a command
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl StorageError {
    pub fn serialization<E: fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    pub fn backend<E: fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn unavailable<E: fmt::Display>(msg: E) -> Self {
        Self::Unavailable(msg.to_string())
    }

    pub fn configuration<E: fmt::Display>(msg: E) -> Self {
        Self::Configuration(msg.to_string())
    }

    pub fn connection<E: fmt::Display>(msg: E) -> Self {
        Self::Connection(msg.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}

impl From<StorageError> for PacemakerError {
    fn from(err: StorageError) -> Self {
        let code = match &err {
            StorageError::Io(_) => ErrorCode::STORAGE_IO_ERROR,
            StorageError::Serialization(_) => ErrorCode::STORAGE_SERIALIZATION_ERROR,
            StorageError::Backend(_)
            | StorageError::Unavailable(_)
            | StorageError::Configuration(_)
            | StorageError::Connection(_) => ErrorCode::STORAGE_BACKEND_ERROR,
        };

        PacemakerError::storage_with_code(code, err.to_string()).with_source(err)
    }
}
