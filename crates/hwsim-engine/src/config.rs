//! Exporter configuration

use crate::{EngineError, Result};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Default interval between simulation ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(15);

/// Configuration shared by all simulated exporters
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Address the metrics listener binds to
    pub bind_address: String,

    /// Port the metrics listener binds to (0 picks an ephemeral port)
    pub port: u16,

    /// Time between two simulation ticks
    pub tick_interval: Duration,

    /// Fixed RNG seed for reproducible value sequences
    pub seed: Option<u64>,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
}

impl ExporterConfig {
    /// Create a configuration listening on all interfaces at `port`
    pub fn new(port: u16) -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port,
            tick_interval: DEFAULT_TICK_INTERVAL,
            seed: None,
            log_level: "info".to_string(),
        }
    }

    /// Set bind address
    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    /// Set tick interval
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set RNG seed
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Socket address for the metrics listener
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.parse().map_err(|e| {
            EngineError::config(format!("Invalid bind address '{}': {}", self.bind_address, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.tick_interval.is_zero() {
            return Err(EngineError::config("Tick interval must be greater than 0"));
        }

        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(EngineError::config(format!("Unknown log level: {}", other))),
        }
    }
}
