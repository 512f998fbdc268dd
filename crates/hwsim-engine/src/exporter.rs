//! Exporter lifecycle: registry, tick loop and HTTP endpoint together

use crate::{ExporterConfig, Result, Simulation, SimulationHandle, SimulationRunner};
use hwsim_metrics::{MetricsEndpoint, MetricsRegistry};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

/// A running exporter: one simulation writing into the registry that the
/// endpoint reads from
pub struct Exporter<S: Simulation> {
    endpoint: MetricsEndpoint,
    simulation: SimulationHandle<S>,
}

impl<S: Simulation> Exporter<S> {
    /// Bind the endpoint, then start the tick loop.
    ///
    /// Binding happens first so that an address already in use fails startup
    /// before any values are generated.
    pub async fn start(
        config: &ExporterConfig,
        registry: MetricsRegistry,
        simulation: S,
    ) -> Result<Self> {
        config.validate()?;

        let mut endpoint = MetricsEndpoint::new(registry, config.socket_addr()?);
        endpoint.start().await?;

        let simulation = SimulationRunner::spawn(simulation, config.tick_interval);

        info!("Exporter listening, metrics at {}", endpoint.metrics_url());
        Ok(Self { endpoint, simulation })
    }

    /// Address the endpoint is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    /// URL of the metrics route
    pub fn metrics_url(&self) -> String {
        self.endpoint.metrics_url()
    }

    /// Handle to the tick loop
    pub fn simulation(&self) -> &SimulationHandle<S> {
        &self.simulation
    }

    /// Serve until Ctrl+C, then shut down
    pub async fn run_until_shutdown(self) -> Result<S> {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C signal");
        self.shutdown().await
    }

    /// Stop the tick loop and the endpoint
    pub async fn shutdown(mut self) -> Result<S> {
        let simulation = self.simulation.stop().await?;
        self.endpoint.stop().await;
        info!("Exporter stopped");
        Ok(simulation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use hwsim_metrics::GaugeVec;
    use std::time::Duration;

    struct Heartbeat {
        gauge: GaugeVec,
        beats: f64,
    }

    impl Simulation for Heartbeat {
        fn name(&self) -> &str {
            "heartbeat"
        }

        fn tick(&mut self) {
            self.beats += 1.0;
            self.gauge.with_label_values(&["local"]).set(self.beats);
        }
    }

    fn heartbeat(registry: &MetricsRegistry) -> Heartbeat {
        let gauge = registry
            .register_gauge("test_heartbeat", "Test heartbeat.", &["node"])
            .unwrap();
        Heartbeat { gauge, beats: 0.0 }
    }

    fn test_config() -> ExporterConfig {
        ExporterConfig::new(0).with_bind_address("127.0.0.1")
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let registry = MetricsRegistry::new();
        let simulation = heartbeat(&registry);

        let exporter = Exporter::start(&test_config(), registry, simulation).await.unwrap();
        assert_ne!(exporter.local_addr().port(), 0);
        exporter.simulation().wait_for_ticks(1).await.unwrap();

        let simulation = exporter.shutdown().await.unwrap();
        assert!(simulation.beats >= 1.0);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_startup() {
        let registry = MetricsRegistry::new();
        let simulation = heartbeat(&registry);
        let config = test_config().with_tick_interval(Duration::ZERO);

        let result = Exporter::start(&config, registry, simulation).await;
        assert!(matches!(result, Err(EngineError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn test_bound_port_fails_startup() {
        let first_registry = MetricsRegistry::new();
        let first_simulation = heartbeat(&first_registry);
        let first = Exporter::start(&test_config(), first_registry, first_simulation)
            .await
            .unwrap();

        let registry = MetricsRegistry::new();
        let simulation = heartbeat(&registry);
        let config = ExporterConfig::new(first.local_addr().port()).with_bind_address("127.0.0.1");

        let result = Exporter::start(&config, registry, simulation).await;
        assert!(matches!(result, Err(EngineError::Metrics(_))));

        first.shutdown().await.unwrap();
    }
}
