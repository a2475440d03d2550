//! Service error types

use thiserror::Error;

use crate::schema::{PayloadError, ValidationError};
use crate::store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Every way a table use case can fail
#[derive(Debug, Error)]
pub enum ServiceError {
    // ==================
    // Lookup
    // ==================
    #[error("Table \"{0}\" not found")]
    TableNotFound(String),

    #[error("Column \"{0}\" not found")]
    ColumnNotFound(String),

    #[error("Row \"{0}\" not found")]
    RowNotFound(String),

    // ==================
    // Schema integrity
    // ==================
    #[error("Column \"{0}\" already exists")]
    ColumnExists(String),

    // ==================
    // Input
    // ==================
    #[error("{0}")]
    InvalidPayload(#[from] PayloadError),

    /// All validation failures for one write
    #[error("Invalid input data ({} error(s))", .0.len())]
    Validation(Vec<ValidationError>),

    // ==================
    // Backend
    // ==================
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl ServiceError {
    /// Returns the wire error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::TableNotFound(_) => "TABLE_NOT_FOUND",
            ServiceError::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            ServiceError::RowNotFound(_) => "ROW_NOT_FOUND",
            ServiceError::ColumnExists(_) => "COLUMN_EXISTS",
            ServiceError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Storage(_) => "INTERNAL_ERROR",
        }
    }

    /// Validation details, if any
    pub fn details(&self) -> Option<&[ValidationError]> {
        match self {
            ServiceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
