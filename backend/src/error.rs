//! Storage error handling
//!
//! Every repository and service call returns `StorageResult<T>`. Driver errors
//! are classified once, here: a unique-constraint violation is a write conflict
//! (a duplicate id), anything else from the driver is a medium failure.

use fitness_rpg_shared::{ParseEnumError, ValidationError};
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the storage engine
#[derive(Error, Debug)]
pub enum StorageError {
    /// Schema could not be created; the store is unusable
    #[error("Storage initialization failed: {0}")]
    Init(#[source] sqlx::Error),

    /// Insert collided with an existing id; nothing was overwritten
    #[error("Write conflict: {0}")]
    WriteConflict(String),

    /// Underlying medium failure; multi-row writes have been rolled back
    #[error("Storage I/O error")]
    Io(#[source] sqlx::Error),

    /// A required row does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Caller input rejected before touching storage
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A stored row could not be decoded into a domain value
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Whether retrying the same call might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Io(_))
    }

    /// Map an init-time failure, logging it since the caller will halt
    pub fn init(err: sqlx::Error) -> Self {
        error!("Schema initialization failed: {:?}", err);
        StorageError::Init(err)
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StorageError::WriteConflict(db_err.message().to_string());
            }
        }
        StorageError::Io(err)
    }
}

impl From<ParseEnumError> for StorageError {
    fn from(err: ParseEnumError) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}

impl From<chrono::ParseError> for StorageError {
    fn from(err: chrono::ParseError) -> Self {
        StorageError::Corrupt(format!("bad date or timestamp: {}", err))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Corrupt(format!("bad JSON column: {}", err))
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
