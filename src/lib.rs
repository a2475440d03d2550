//! schemagrid - schema-driven table service
//!
//! Tables carry an ordered list of typed columns. Every row write is checked against
//! that schema before it reaches a store, and the whole thing is served over HTTP.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod service;
pub mod store;
