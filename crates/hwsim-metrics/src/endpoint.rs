//! HTTP endpoint for serving metrics

use crate::{MetricsError, MetricsRegistry, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// HTTP endpoint serving the registry snapshot and a liveness probe
#[derive(Debug)]
pub struct MetricsEndpoint {
    registry: MetricsRegistry,
    bind_addr: SocketAddr,
    local_addr: Option<SocketAddr>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl MetricsEndpoint {
    /// Create a new metrics endpoint
    pub fn new(registry: MetricsRegistry, bind_addr: SocketAddr) -> Self {
        Self {
            registry,
            bind_addr,
            local_addr: None,
            server_handle: None,
        }
    }

    /// Bind the listener and start serving in the background.
    ///
    /// Fails if the address is already in use.
    pub async fn start(&mut self) -> Result<()> {
        if self.server_handle.is_some() {
            return Err(MetricsError::Config("Server already started".to_string()));
        }

        let app = create_app(self.registry.clone());
        let listener = TcpListener::bind(self.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        info!("Starting metrics endpoint server on {}", local_addr);

        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!("Metrics endpoint server error: {}", e);
            }
        });

        self.local_addr = Some(local_addr);
        self.server_handle = Some(server_handle);
        Ok(())
    }

    /// Stop the HTTP server
    pub async fn stop(&mut self) {
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
            let _ = handle.await;
            info!("Metrics endpoint server stopped");
        }
        self.local_addr = None;
    }

    /// Address the server is listening on, falling back to the configured one
    /// before `start` has been called
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr.unwrap_or(self.bind_addr)
    }

    /// Get the metrics URL
    pub fn metrics_url(&self) -> String {
        format!("http://{}/metrics", self.local_addr())
    }

    /// Get the health URL
    pub fn health_url(&self) -> String {
        format!("http://{}/health", self.local_addr())
    }

    /// Check if the server is running
    pub fn is_running(&self) -> bool {
        self.server_handle.is_some()
    }
}

impl Drop for MetricsEndpoint {
    fn drop(&mut self) {
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
        }
    }
}

/// Create the Axum application
fn create_app(registry: MetricsRegistry) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(registry)
}

/// Handler for /metrics endpoint
async fn metrics_handler(State(registry): State<MetricsRegistry>) -> Response {
    match registry.export_metrics() {
        Ok(metrics) => (
            StatusCode::OK,
            [("content-type", registry.content_type())],
            metrics,
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to render metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// Handler for /health endpoint
async fn health_handler() -> Response {
    (StatusCode::OK, "OK").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn test_metrics_endpoint_creation() {
        let endpoint = MetricsEndpoint::new(MetricsRegistry::new(), loopback());

        assert!(!endpoint.is_running());
        assert!(endpoint.metrics_url().contains("127.0.0.1"));
        assert!(endpoint.health_url().ends_with("/health"));
    }

    #[tokio::test]
    async fn test_endpoint_start_stop() {
        let mut endpoint = MetricsEndpoint::new(MetricsRegistry::new(), loopback());

        endpoint.start().await.unwrap();
        assert!(endpoint.is_running());
        assert_ne!(endpoint.local_addr().port(), 0);

        endpoint.stop().await;
        assert!(!endpoint.is_running());
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let mut endpoint = MetricsEndpoint::new(MetricsRegistry::new(), loopback());
        endpoint.start().await.unwrap();

        assert!(matches!(endpoint.start().await, Err(MetricsError::Config(_))));
        endpoint.stop().await;
    }

    #[tokio::test]
    async fn test_port_in_use_fails() {
        let mut first = MetricsEndpoint::new(MetricsRegistry::new(), loopback());
        first.start().await.unwrap();

        let mut second = MetricsEndpoint::new(MetricsRegistry::new(), first.local_addr());
        assert!(matches!(second.start().await, Err(MetricsError::Io(_))));

        first.stop().await;
    }

    #[tokio::test]
    async fn test_scrape_serves_registry_snapshot() {
        let registry = MetricsRegistry::new();
        let gauge = registry
            .register_gauge("test_fan_speed_rpm", "Test fan speed.", &["id", "name"])
            .unwrap();
        gauge.with_label_values(&["4", "Fan1A"]).set(6000.0);

        let mut endpoint = MetricsEndpoint::new(registry, loopback());
        endpoint.start().await.unwrap();

        let response = reqwest::get(endpoint.metrics_url()).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"));

        let body = response.text().await.unwrap();
        assert!(body.contains("test_fan_speed_rpm{id=\"4\",name=\"Fan1A\"} 6000"));

        // Writes after the first scrape are visible to the next one
        gauge.with_label_values(&["4", "Fan1A"]).set(5990.0);
        let body = reqwest::get(endpoint.metrics_url()).await.unwrap().text().await.unwrap();
        assert!(body.contains("test_fan_speed_rpm{id=\"4\",name=\"Fan1A\"} 5990"));

        endpoint.stop().await;
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let mut endpoint = MetricsEndpoint::new(MetricsRegistry::new(), loopback());
        endpoint.start().await.unwrap();

        let response = reqwest::get(endpoint.health_url()).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "OK");

        endpoint.stop().await;
    }
}
