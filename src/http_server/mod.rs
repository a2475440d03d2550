//! # HTTP Server Module
//!
//! Thin axum adapter over the table service.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/tables/:table_id/columns` - Column listing and schema changes
//! - `/api/v1/tables/:table_id/rows` - Row listing, creation, cell updates, deletion
//! - `/observability/*` - Metrics and monitoring

pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;
pub mod table_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
