//! # hwsim-metrics
//!
//! Metric registry and snapshot endpoint for the simulated hardware exporters.
//!
//! This crate provides:
//! - An explicitly owned [`MetricsRegistry`] wrapping a Prometheus registry
//! - Typed registration of labeled gauges and counters
//! - A [`MetricsEndpoint`] serving the Prometheus text format over HTTP

pub mod endpoint;
pub mod registry;

pub use endpoint::MetricsEndpoint;
pub use registry::MetricsRegistry;

// Instrument handles handed out by the registry
pub use prometheus::{CounterVec, Gauge, GaugeVec};

/// Errors raised while registering, rendering or serving metrics
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
