//! Chassis sensor generator

use crate::fields::IpmiFields;
use crate::sensors::Sensor;
use hwsim_engine::{uniform, Simulation};
use hwsim_metrics::{MetricsRegistry, Result};
use rand::rngs::SmallRng;
use std::time::Instant;
use tracing::debug;

/// Free SEL space reported on every tick
pub const SEL_FREE_SPACE_BYTES: f64 = 15632.0;

/// SEL entry count reported on every tick
pub const SEL_LOGS_COUNT: f64 = 47.0;

/// Sub-collectors reported as up
pub const COLLECTORS: [&str; 2] = ["ipmi", "sel"];

/// State value for a sensor reading within its thresholds
pub const STATE_NOMINAL: f64 = 0.0;

/// Simulated IPMI exporter state
pub struct IpmiSimulation {
    fields: IpmiFields,
    sensors: Vec<Sensor>,
    nodename: String,
    rng: SmallRng,
}

impl IpmiSimulation {
    /// Register the IPMI families for host `nodename`
    pub fn new(
        registry: &MetricsRegistry,
        nodename: impl Into<String>,
        sensors: Vec<Sensor>,
        rng: SmallRng,
    ) -> Result<Self> {
        Ok(Self {
            fields: IpmiFields::register(registry)?,
            sensors,
            nodename: nodename.into(),
            rng,
        })
    }

    /// Simulated sensors
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Registered instruments
    pub fn fields(&self) -> &IpmiFields {
        &self.fields
    }

    /// Host name exported in `node_uname_info`
    pub fn nodename(&self) -> &str {
        &self.nodename
    }

    /// Run one tick and return the published readings in `sensors()` order
    pub fn step(&mut self) -> Vec<f64> {
        let started = Instant::now();
        let f = &self.fields;

        f.node_uname_info.with_label_values(&[self.nodename.as_str()]).set(1.0);

        let mut readings = Vec::with_capacity(self.sensors.len());
        for sensor in &self.sensors {
            let value = uniform(&mut self.rng, sensor.range.0, sensor.range.1);
            let labels = sensor.label_values();
            let (reading, state) = f.for_kind(sensor.kind);

            reading.with_label_values(&labels).set(value);
            state.with_label_values(&labels).set(STATE_NOMINAL);
            readings.push(value);
        }

        f.sel_free_space_bytes.set(SEL_FREE_SPACE_BYTES);
        f.sel_logs_count.set(SEL_LOGS_COUNT);

        for collector in COLLECTORS {
            f.up.with_label_values(&[collector]).set(1.0);
        }

        let elapsed = started.elapsed().as_secs_f64();
        f.scrape_duration_seconds.set(elapsed);
        debug!("IPMI tick: {} sensors in {:.6}s", readings.len(), elapsed);

        readings
    }
}

impl Simulation for IpmiSimulation {
    fn name(&self) -> &str {
        "ipmi"
    }

    fn tick(&mut self) {
        self.step();
    }
}
