//! Metrics registry shared between the simulation loop and the HTTP endpoint

use crate::{MetricsError, Result};
use prometheus::{CounterVec, Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tracing::debug;

/// Process-wide table of named instruments.
///
/// Cloning is cheap and every clone refers to the same underlying registry, so
/// one handle can be given to the simulation (the writer) and another to the
/// endpoint (the reader). Individual label cells are updated atomically by the
/// Prometheus instruments; there is no cross-metric transaction.
#[derive(Debug, Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<Registry>,
}

impl MetricsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a labeled gauge
    pub fn register_gauge(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<GaugeVec> {
        let gauge = GaugeVec::new(Opts::new(name, help), label_names)
            .map_err(|e| {
                MetricsError::Registry(format!("Failed to create gauge {}: {}", name, e))
            })?;

        self.inner
            .register(Box::new(gauge.clone()))
            .map_err(|e| {
                MetricsError::Registry(format!("Failed to register gauge {}: {}", name, e))
            })?;

        debug!("Registered gauge {} with labels {:?}", name, label_names);
        Ok(gauge)
    }

    /// Register a gauge without labels
    pub fn register_unlabeled_gauge(&self, name: &str, help: &str) -> Result<Gauge> {
        let gauge = Gauge::with_opts(Opts::new(name, help))
            .map_err(|e| {
                MetricsError::Registry(format!("Failed to create gauge {}: {}", name, e))
            })?;

        self.inner
            .register(Box::new(gauge.clone()))
            .map_err(|e| {
                MetricsError::Registry(format!("Failed to register gauge {}: {}", name, e))
            })?;

        debug!("Registered gauge {}", name);
        Ok(gauge)
    }

    /// Register a labeled monotonic counter
    pub fn register_counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<CounterVec> {
        let counter = CounterVec::new(Opts::new(name, help), label_names)
            .map_err(|e| {
                MetricsError::Registry(format!("Failed to create counter {}: {}", name, e))
            })?;

        self.inner
            .register(Box::new(counter.clone()))
            .map_err(|e| {
                MetricsError::Registry(format!("Failed to register counter {}: {}", name, e))
            })?;

        debug!("Registered counter {} with labels {:?}", name, label_names);
        Ok(counter)
    }

    /// Render the current state of every instrument in the Prometheus text format.
    ///
    /// Instruments that have never been written for any label combination are
    /// omitted from the output.
    pub fn export_metrics(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Export(format!("Failed to encode metrics: {}", e)))?;

        String::from_utf8(buffer)
            .map_err(|e| {
                MetricsError::Export(format!("Failed to convert metrics to string: {}", e))
            })
    }

    /// Content type of the rendered snapshot
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
