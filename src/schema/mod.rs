//! Table schema model and validation
//!
//! Every row mutation is checked against the owning table's columns before it reaches a store.
//!
//! # Design Principles
//!
//! - Validation is pure and deterministic
//! - Row validation reports every failure in one pass
//! - Unknown keys are rejected, never silently dropped
//! - No defaults and no coercion
//! - Column payloads are parsed into typed columns before use

mod errors;
mod payload;
mod types;
mod validator;

pub use errors::{PayloadError, ValidationError, ValidationErrorCode};
pub use payload::{parse_column, RESERVED_KEY};
pub use types::{
    demo_table, Column, ColumnRules, ColumnType, Row, RowValues, Table, DEMO_TABLE_ID,
};
pub use validator::{is_iso8601, json_type_name, validate_cell, validate_row};
