//! # hwsim-ipmi
//!
//! Simulated IPMI exporter.
//!
//! Publishes the chassis sensors of a GPU server (fans, temperatures, power,
//! currents and voltages) in the metric families of the Prometheus IPMI
//! exporter, together with SEL statistics and collector health gauges.

pub mod fields;
pub mod sensors;
pub mod simulation;

pub use fields::IpmiFields;
pub use sensors::{chassis_sensors, Sensor, SensorKind, FAN_PAIRS};
pub use simulation::IpmiSimulation;

/// Port the real IPMI exporter listens on
pub const DEFAULT_PORT: u16 = 9290;
