//! Simulated chassis sensor inventory

use std::fmt;

/// Number of fan pairs; each pair has a faster "A" and a slower "B" fan
pub const FAN_PAIRS: u32 = 18;

const FAN_A_RPM: (f64, f64) = (5880.0, 6120.0);
const FAN_B_RPM: (f64, f64) = (5040.0, 5520.0);

const INLET_TEMP: (f64, f64) = (21.0, 23.0);
const EXHAUST_TEMP: (f64, f64) = (31.0, 34.0);
const BOARD_TEMP: (f64, f64) = (54.0, 57.0);
const GPU_TEMP: (f64, f64) = (39.0, 41.0);

const POWER_WATTS: f64 = 1160.0;
const POWER_JITTER: f64 = 20.0;

const CURRENT_JITTER: f64 = 0.05;

const VCORE_VOLTS: (f64, f64) = (1.18, 1.20);
const MEMORY_VOLTS: (f64, f64) = (1.21, 1.22);
const MAIN_RAIL_VOLTS: (f64, f64) = (238.0, 242.0);

/// Sensor category; selects the metric family a reading is exported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Fan,
    Temperature,
    Power,
    Current,
    Voltage,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Fan => "fan",
            SensorKind::Temperature => "temperature",
            SensorKind::Power => "power",
            SensorKind::Current => "current",
            SensorKind::Voltage => "voltage",
        };
        f.write_str(name)
    }
}

/// One IPMI sensor and the band its simulated readings are drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub id: String,
    pub name: String,
    pub kind: SensorKind,
    /// Closed interval of plausible readings
    pub range: (f64, f64),
}

impl Sensor {
    fn new(
        id: impl ToString,
        name: impl Into<String>,
        kind: SensorKind,
        range: (f64, f64),
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.into(),
            kind,
            range,
        }
    }

    /// Fan sensor; "A" fans spin faster than "B" fans
    pub fn fan(id: u32, name: impl Into<String>) -> Self {
        let name = name.into();
        let range = if name.ends_with('A') { FAN_A_RPM } else { FAN_B_RPM };
        Self::new(id, name, SensorKind::Fan, range)
    }

    /// Temperature sensor; the band depends on where the probe sits
    pub fn temperature(id: u32, name: impl Into<String>) -> Self {
        let name = name.into();
        let range = match name.as_str() {
            "Inlet Temp" => INLET_TEMP,
            "Exhaust Temp" => EXHAUST_TEMP,
            "Temp" => BOARD_TEMP,
            _ => GPU_TEMP,
        };
        Self::new(id, name, SensorKind::Temperature, range)
    }

    /// Power sensor around the chassis draw
    pub fn power(id: u32, name: impl Into<String>) -> Self {
        Self::new(
            id,
            name,
            SensorKind::Power,
            (POWER_WATTS - POWER_JITTER, POWER_WATTS + POWER_JITTER),
        )
    }

    /// Current sensor jittering around `baseline` amperes
    pub fn current(id: u32, name: impl Into<String>, baseline: f64) -> Self {
        Self::new(
            id,
            name,
            SensorKind::Current,
            (baseline - CURRENT_JITTER, baseline + CURRENT_JITTER),
        )
    }

    /// Voltage sensor; VRM rails sit near 1.2 V, main rails near 240 V
    pub fn voltage(id: u32, name: impl Into<String>) -> Self {
        let name = name.into();
        let range = match name.as_str() {
            "VCORE VR" => VCORE_VOLTS,
            "MEMABCD VR" | "MEMEFGH VR" => MEMORY_VOLTS,
            _ => MAIN_RAIL_VOLTS,
        };
        Self::new(id, name, SensorKind::Voltage, range)
    }

    /// `id` and `name` label values
    pub fn label_values(&self) -> [&str; 2] {
        [self.id.as_str(), self.name.as_str()]
    }
}

/// All sensors of the simulated chassis, grouped by kind in export order
pub fn chassis_sensors() -> Vec<Sensor> {
    let mut sensors = Vec::new();

    for i in 1..=FAN_PAIRS {
        sensors.push(Sensor::fan(i + 3, format!("Fan{}A", i)));
        sensors.push(Sensor::fan(i + 21, format!("Fan{}B", i)));
    }

    for (id, name) in [
        (1, "Temp"),
        (2, "Temp"),
        (3, "Inlet Temp"),
        (171, "GPU21 Temp"),
        (172, "GPU22 Temp"),
        (173, "GPU23 Temp"),
        (174, "GPU24 Temp"),
        (180, "Exhaust Temp"),
    ] {
        sensors.push(Sensor::temperature(id, name));
    }

    sensors.push(Sensor::power(91, "Pwr Consumption"));

    for (id, name, baseline) in [
        (81, "Current 1", 1.6),
        (82, "Current 2", 0.2),
        (251, "Current 3", 1.6),
        (252, "Current 4", 1.6),
    ] {
        sensors.push(Sensor::current(id, name, baseline));
    }

    for (id, name) in [
        (303, "VCORE VR"),
        (304, "VCORE VR"),
        (305, "MEMABCD VR"),
        (306, "MEMEFGH VR"),
        (307, "MEMABCD VR"),
        (308, "MEMEFGH VR"),
        (83, "Voltage 1"),
        (84, "Voltage 2"),
        (253, "Voltage 3"),
        (254, "Voltage 4"),
    ] {
        sensors.push(Sensor::voltage(id, name));
    }

    sensors
}
