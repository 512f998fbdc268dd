//! # hwsim-engine
//!
//! Runtime shared by the simulated hardware exporters.
//!
//! The engine owns the pieces every exporter needs regardless of which
//! hardware it pretends to be:
//! - [`Simulation`]: one tick of value generation writing into a registry
//! - [`SimulationRunner`]: the cancellable fixed-interval tick loop
//! - [`Exporter`]: wiring of a simulation, its registry and the HTTP endpoint
//! - [`ExporterConfig`]: listener address, tick interval and RNG seed
//!
//! ## Example
//!
//! ```rust,no_run
//! use hwsim_engine::{Exporter, ExporterConfig, Simulation};
//! use hwsim_metrics::MetricsRegistry;
//!
//! struct Idle;
//!
//! impl Simulation for Idle {
//!     fn name(&self) -> &str {
//!         "idle"
//!     }
//!
//!     fn tick(&mut self) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExporterConfig::new(9400);
//!     let exporter = Exporter::start(&config, MetricsRegistry::new(), Idle).await?;
//!     exporter.run_until_shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod exporter;
pub mod host;
pub mod logging;
pub mod random;
pub mod runner;

pub use config::ExporterConfig;
pub use exporter::Exporter;
pub use host::local_hostname;
pub use logging::init_tracing;
pub use random::{rng_from_seed, uniform};
pub use runner::{Simulation, SimulationHandle, SimulationRunner};

use hwsim_metrics::MetricsError;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while starting or stopping an exporter
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    #[error("Hostname resolution failed: {0}")]
    Hostname(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Simulation task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
