//! Table service
//!
//! The only caller of the validators and the store. Adapters (HTTP, CLI) talk to this
//! layer and never reach the store directly.

mod errors;
mod table_service;

pub use errors::{ServiceError, ServiceResult};
pub use table_service::{TableColumns, TableService};
