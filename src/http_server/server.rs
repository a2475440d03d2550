//! # HTTP Server
//!
//! Combines the table and observability routers behind tracing and CORS layers.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::HttpServerConfig;
use super::observability_routes::{health_routes, observability_routes, ObservabilityState};
use super::table_routes::{table_routes, TableState};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::service::TableService;

/// HTTP server for the table API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server with a fresh metrics registry
    pub fn new(config: HttpServerConfig, service: TableService) -> Self {
        Self::with_metrics(config, service, Arc::new(MetricsRegistry::new()))
    }

    /// Create a server that reports into an existing registry
    pub fn with_metrics(
        config: HttpServerConfig,
        service: TableService,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let router = Self::build_router(&config, service, metrics);
        Self { config, router }
    }

    fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
        let allow_origin = match config.allowed_origins() {
            Some(origins) => AllowOrigin::list(origins),
            None => AllowOrigin::any(),
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    /// Build the combined router with all endpoints
    fn build_router(
        config: &HttpServerConfig,
        service: TableService,
        metrics: Arc<MetricsRegistry>,
    ) -> Router {
        let table_state = Arc::new(TableState::new(service, Arc::clone(&metrics)));
        let observability_state = Arc::new(ObservabilityState::new(metrics));

        Router::new()
            .merge(health_routes(Arc::clone(&observability_state)))
            .nest("/observability", observability_routes(observability_state))
            .nest("/api/v1", table_routes(table_state))
            .layer(TraceLayer::new_for_http())
            .layer(Self::cors_layer(config))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        log_event!(Event::Serving, addr = %addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event!(Event::ShutdownComplete);
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    log_event!(Event::ShutdownStart);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTableStore;

    fn service() -> TableService {
        TableService::new(Arc::new(MemoryTableStore::new()))
    }

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new(HttpServerConfig::default(), service());
        assert_eq!(server.socket_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = HttpServer::new(HttpServerConfig::with_port(8080), service());
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_cors_origins() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:5173".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::new(config, service()).router();
    }
}
