//! # hwsim-dcgm
//!
//! Simulated NVIDIA DCGM exporter.
//!
//! Publishes the `DCGM_FI_DEV_*` fields of four A100 GPUs with values that
//! behave like a busy training node: utilization drives clocks, temperature
//! and power, and energy consumption grows monotonically.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hwsim_dcgm::{default_gpus, DcgmSimulation};
//! use hwsim_engine::{rng_from_seed, Exporter, ExporterConfig};
//! use hwsim_metrics::MetricsRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExporterConfig::new(9400);
//!     let registry = MetricsRegistry::new();
//!     let simulation = DcgmSimulation::new(
//!         &registry,
//!         default_gpus(),
//!         rng_from_seed(None),
//!         config.tick_interval,
//!     )?;
//!
//!     Exporter::start(&config, registry, simulation)
//!         .await?
//!         .run_until_shutdown()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod devices;
pub mod fields;
pub mod simulation;

pub use devices::{default_gpus, GpuDevice, GPU_LABEL_NAMES, TOTAL_FB_MEMORY_MB};
pub use fields::DcgmFields;
pub use simulation::{DcgmSimulation, GpuSample};

/// Port the real DCGM exporter listens on
pub const DEFAULT_PORT: u16 = 9400;
