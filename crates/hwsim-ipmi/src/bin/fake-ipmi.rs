//! fake-ipmi binary

use anyhow::{Context, Result};
use clap::Parser;
use hwsim_engine::{init_tracing, local_hostname, rng_from_seed, Exporter, ExporterConfig};
use hwsim_ipmi::{chassis_sensors, IpmiSimulation, DEFAULT_PORT};
use hwsim_metrics::MetricsRegistry;
use std::process;
use std::time::Duration;
use tracing::{error, info};

/// Simulated IPMI exporter serving synthetic chassis sensor telemetry
#[derive(Parser, Debug)]
#[command(name = "fake-ipmi")]
#[command(about = "Simulated IPMI exporter serving synthetic chassis sensor telemetry")]
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
    init_tracing(&["fake_ipmi", "hwsim_ipmi"], &config.log_level);

    if let Err(e) = run(config).await {
        error!("fake-ipmi failed: {:#}", e);
        process::exit(1);
    }
}

async fn run(config: ExporterConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let nodename = local_hostname().context("Failed to resolve local hostname")?;

    let registry = MetricsRegistry::new();
    let simulation = IpmiSimulation::new(
        &registry,
        nodename.as_str(),
        chassis_sensors(),
        rng_from_seed(config.seed),
    )
    .context("Failed to register IPMI metrics")?;
    info!("Simulating {} chassis sensors", simulation.sensors().len());

    let exporter = Exporter::start(&config, registry, simulation)
        .await
        .with_context(|| format!("Failed to start IPMI metrics exporter on port {}", config.port))?;

    info!(
        "Starting IPMI metrics exporter for node {} on {}",
        nodename,
        exporter.local_addr()
    );
    info!("Access metrics at {}", exporter.metrics_url());

    exporter.run_until_shutdown().await?;
    info!("fake-ipmi shutdown complete");
    Ok(())
}
