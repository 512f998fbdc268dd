//! fake-dcgm binary

use anyhow::{Context, Result};
use clap::Parser;
use hwsim_dcgm::{default_gpus, DcgmSimulation, DEFAULT_PORT};
use hwsim_engine::{init_tracing, rng_from_seed, Exporter, ExporterConfig};
use hwsim_metrics::MetricsRegistry;
use std::process;
use std::time::Duration;
use tracing::{error, info};

/// Simulated NVIDIA DCGM exporter serving synthetic GPU telemetry
#[derive(Parser, Debug)]
#[command(name = "fake-dcgm")]
#[command(about = "Simulated NVIDIA DCGM exporter serving synthetic GPU telemetry")]
#[command(version)]
struct Cli {
    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Metrics port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds between simulation ticks
    #[arg(long, default_value_t = 15)]
    interval_secs: u64,

    /// Seed for a reproducible value sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> ExporterConfig {
        ExporterConfig::new(self.port)
            .with_bind_address(self.bind)
            .with_tick_interval(Duration::from_secs(self.interval_secs))
            .with_seed(self.seed)
            .with_log_level(self.log_level)
    }
}

#[tokio::main]
async fn main() {
    let config = Cli::parse().into_config();
    init_tracing(&["fake_dcgm", "hwsim_dcgm"], &config.log_level);

    if let Err(e) = run(config).await {
        error!("fake-dcgm failed: {:#}", e);
        process::exit(1);
    }
}

async fn run(config: ExporterConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let registry = MetricsRegistry::new();
    let gpus = default_gpus();
    info!("Simulating {} GPUs", gpus.len());

    let simulation = DcgmSimulation::new(
        &registry,
        gpus,
        rng_from_seed(config.seed),
        config.tick_interval,
    )
    .context("Failed to register DCGM fields")?;

    let exporter = Exporter::start(&config, registry, simulation)
        .await
        .with_context(|| {
            format!("Failed to start fake GPU metrics exporter on port {}", config.port)
        })?;

    info!("Starting fake GPU metrics exporter on {}", exporter.local_addr());
    info!("Access metrics at {}", exporter.metrics_url());

    exporter.run_until_shutdown().await?;
    info!("fake-dcgm shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        let config = Cli::try_parse_from(["fake-dcgm"]).unwrap().into_config();

        assert_eq!(config.port, 9400);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.tick_interval, Duration::from_secs(15));
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_flags() {
        let config = Cli::try_parse_from([
            "fake-dcgm",
            "--bind",
            "127.0.0.1",
            "--port",
            "19400",
            "--interval-secs",
            "1",
            "--seed",
            "7",
        ])
        .unwrap()
        .into_config();

        let expected: std::net::SocketAddr = "127.0.0.1:19400".parse().unwrap();
        assert_eq!(config.socket_addr().unwrap(), expected);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["fake-dcgm", "--port", "70000"]).is_err());
    }
}
