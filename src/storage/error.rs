//! Error types for result storage

use std::fmt;
use thiserror::Error;

use crate::error::{ErrorCode, FleetError};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Job id is empty or cannot be used as a key
    #[error("invalid job id: '{0}'")]
    InvalidJobId(String),

    /// No result stored under this job id
    #[error("result not found: '{0}'")]
    NotFound(String),

    /// The store was closed
    #[error("storage closed")]
    Closed,

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create an invalid job id error
    pub fn invalid_job_id<E: fmt::Display>(job_id: E) -> Self {
        Self::InvalidJobId(job_id.to_string())
    }

    /// Create a not found error
    pub fn not_found<E: fmt::Display>(job_id: E) -> Self {
        Self::NotFound(job_id.to_string())
    }

    /// Create a serialization error
    pub fn serialization<E: fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Create a configuration error
    pub fn configuration<E: fmt::Display>(msg: E) -> Self {
        Self::Configuration(msg.to_string())
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}

/// Convert StorageError to FleetError
impl From<StorageError> for FleetError {
    fn from(err: StorageError) -> Self {
        let (code, job_id) = match &err {
            StorageError::InvalidJobId(id) => (ErrorCode::STORAGE_INVALID_JOB_ID, Some(id.clone())),
            StorageError::NotFound(id) => (ErrorCode::STORAGE_NOT_FOUND, Some(id.clone())),
            StorageError::Closed => (ErrorCode::STORAGE_CLOSED, None),
            StorageError::Io(_) => (ErrorCode::STORAGE_IO_ERROR, None),
            StorageError::Serialization(_) => (ErrorCode::STORAGE_SERIALIZATION_ERROR, None),
            StorageError::Configuration(_) => (ErrorCode::STORAGE_CONFIGURATION, None),
        };

        FleetError::storage_with_code(code, err.to_string(), job_id).with_source(err)
    }
}
