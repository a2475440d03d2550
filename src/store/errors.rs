//! Store error types
//!
//! These cover backend faults only. Missing tables, rows and columns are ordinary
//! outcomes and are reported through the operation's return type.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store: {0}")]
    Open(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("corrupt persisted value: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}
