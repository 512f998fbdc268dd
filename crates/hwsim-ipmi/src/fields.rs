//! IPMI exporter metric families

use crate::sensors::SensorKind;
use hwsim_metrics::{Gauge, GaugeVec, MetricsRegistry, Result};

const SENSOR_LABELS: [&str; 2] = ["id", "name"];

const STATE_HELP_SUFFIX: &str = "(0=nominal, 1=warning, 2=critical).";

/// Registered IPMI instruments
#[derive(Clone)]
pub struct IpmiFields {
    pub node_uname_info: GaugeVec,
    pub fan_speed_rpm: GaugeVec,
    pub fan_speed_state: GaugeVec,
    pub temperature_celsius: GaugeVec,
    pub temperature_state: GaugeVec,
    pub power_watts: GaugeVec,
    pub power_state: GaugeVec,
    pub current_amperes: GaugeVec,
    pub current_state: GaugeVec,
    pub voltage_volts: GaugeVec,
    pub voltage_state: GaugeVec,
    /// Generic sensors of unknown type; registered but never populated
    pub sensor_state: GaugeVec,
    pub sensor_value: GaugeVec,
    pub sel_free_space_bytes: Gauge,
    pub sel_logs_count: Gauge,
    pub scrape_duration_seconds: Gauge,
    pub up: GaugeVec,
}

impl IpmiFields {
    /// Register all IPMI metric families with the registry
    pub fn register(registry: &MetricsRegistry) -> Result<Self> {
        let sensor = |name: &str, help: &str| registry.register_gauge(name, help, &SENSOR_LABELS);
        let state = |name: &str, what: &str| {
            registry.register_gauge(
                name,
                &format!("Reported state of a {} sensor {}", what, STATE_HELP_SUFFIX),
                &SENSOR_LABELS,
            )
        };

        Ok(Self {
            node_uname_info: registry.register_gauge(
                "node_uname_info",
                "Labeled system information as provided by the uname system call.",
                &["nodename"],
            )?,
            fan_speed_rpm: sensor("ipmi_fan_speed_rpm", "Fan speed in rotations per minute.")?,
            fan_speed_state: state("ipmi_fan_speed_state", "fan speed")?,
            temperature_celsius: sensor(
                "ipmi_temperature_celsius",
                "Temperature reading in degree Celsius.",
            )?,
            temperature_state: state("ipmi_temperature_state", "temperature")?,
            power_watts: sensor("ipmi_power_watts", "Power reading in Watts.")?,
            power_state: state("ipmi_power_state", "power")?,
            current_amperes: sensor("ipmi_current_amperes", "Current reading in Amperes.")?,
            current_state: state("ipmi_current_state", "current")?,
            voltage_volts: sensor("ipmi_voltage_volts", "Voltage reading in Volts.")?,
            voltage_state: state("ipmi_voltage_state", "voltage")?,
            sensor_state: registry.register_gauge(
                "ipmi_sensor_state",
                &format!(
                    "Indicates the severity of the state reported by an IPMI sensor {}",
                    STATE_HELP_SUFFIX
                ),
                &["id", "name", "type"],
            )?,
            sensor_value: registry.register_gauge(
                "ipmi_sensor_value",
                "Generic data read from an IPMI sensor of unknown type, relying on labels for context.",
                &["id", "name", "type"],
            )?,
            sel_free_space_bytes: registry.register_unlabeled_gauge(
                "ipmi_sel_free_space_bytes",
                "Current free space remaining for new SEL entries.",
            )?,
            sel_logs_count: registry.register_unlabeled_gauge(
                "ipmi_sel_logs_count",
                "Current number of log entries in the SEL.",
            )?,
            scrape_duration_seconds: registry.register_unlabeled_gauge(
                "ipmi_scrape_duration_seconds",
                "Returns how long the scrape took to complete in seconds.",
            )?,
            up: registry.register_gauge(
                "ipmi_up",
                "'1' if a scrape of the IPMI device was successful, '0' otherwise.",
                &["collector"],
            )?,
        })
    }

    /// Reading and state families for a sensor kind
    pub fn for_kind(&self, kind: SensorKind) -> (&GaugeVec, &GaugeVec) {
        match kind {
            SensorKind::Fan => (&self.fan_speed_rpm, &self.fan_speed_state),
            SensorKind::Temperature => (&self.temperature_celsius, &self.temperature_state),
            SensorKind::Power => (&self.power_watts, &self.power_state),
            SensorKind::Current => (&self.current_amperes, &self.current_state),
            SensorKind::Voltage => (&self.voltage_volts, &self.voltage_state),
        }
    }
}
