//! DCGM field definitions exported by the simulator

use crate::devices::GPU_LABEL_NAMES;
use hwsim_metrics::{CounterVec, GaugeVec, MetricsRegistry, Result};

pub const SM_CLOCK: &str = "DCGM_FI_DEV_SM_CLOCK";
pub const MEM_CLOCK: &str = "DCGM_FI_DEV_MEM_CLOCK";
pub const MEMORY_TEMP: &str = "DCGM_FI_DEV_MEMORY_TEMP";
pub const GPU_TEMP: &str = "DCGM_FI_DEV_GPU_TEMP";
pub const POWER_USAGE: &str = "DCGM_FI_DEV_POWER_USAGE";
pub const TOTAL_ENERGY_CONSUMPTION: &str = "DCGM_FI_DEV_TOTAL_ENERGY_CONSUMPTION";
pub const GPU_UTIL: &str = "DCGM_FI_DEV_GPU_UTIL";
pub const MEM_COPY_UTIL: &str = "DCGM_FI_DEV_MEM_COPY_UTIL";
pub const ENC_UTIL: &str = "DCGM_FI_DEV_ENC_UTIL";
pub const DEC_UTIL: &str = "DCGM_FI_DEV_DEC_UTIL";
pub const FB_FREE: &str = "DCGM_FI_DEV_FB_FREE";
pub const FB_USED: &str = "DCGM_FI_DEV_FB_USED";
pub const PCIE_REPLAY_COUNTER: &str = "DCGM_FI_DEV_PCIE_REPLAY_COUNTER";

/// Every field name, in registration order
pub const ALL_FIELDS: [&str; 13] = [
    SM_CLOCK,
    MEM_CLOCK,
    MEMORY_TEMP,
    GPU_TEMP,
    POWER_USAGE,
    TOTAL_ENERGY_CONSUMPTION,
    GPU_UTIL,
    MEM_COPY_UTIL,
    ENC_UTIL,
    DEC_UTIL,
    FB_FREE,
    FB_USED,
    PCIE_REPLAY_COUNTER,
];

/// Registered DCGM instruments
#[derive(Clone)]
pub struct DcgmFields {
    pub sm_clock: GaugeVec,
    pub mem_clock: GaugeVec,
    pub memory_temp: GaugeVec,
    pub gpu_temp: GaugeVec,
    pub power_usage: GaugeVec,
    pub total_energy_consumption: CounterVec,
    pub gpu_util: GaugeVec,
    pub mem_copy_util: GaugeVec,
    pub enc_util: GaugeVec,
    pub dec_util: GaugeVec,
    pub fb_free: GaugeVec,
    pub fb_used: GaugeVec,
    pub pcie_replay_counter: CounterVec,
}

impl DcgmFields {
    /// Register all DCGM fields with the registry
    pub fn register(registry: &MetricsRegistry) -> Result<Self> {
        let gauge =
            |name: &str, help: &str| registry.register_gauge(name, help, &GPU_LABEL_NAMES);
        let counter =
            |name: &str, help: &str| registry.register_counter(name, help, &GPU_LABEL_NAMES);

        Ok(Self {
            sm_clock: gauge(SM_CLOCK, "SM clock frequency (in MHz).")?,
            mem_clock: gauge(MEM_CLOCK, "Memory clock frequency (in MHz).")?,
            memory_temp: gauge(MEMORY_TEMP, "Memory temperature (in C).")?,
            gpu_temp: gauge(GPU_TEMP, "GPU temperature (in C).")?,
            power_usage: gauge(POWER_USAGE, "Power draw (in W).")?,
            total_energy_consumption: counter(
                TOTAL_ENERGY_CONSUMPTION,
                "Total energy consumption since boot (in mJ).",
            )?,
            gpu_util: gauge(GPU_UTIL, "GPU utilization (in %).")?,
            mem_copy_util: gauge(MEM_COPY_UTIL, "Memory utilization (in %).")?,
            enc_util: gauge(ENC_UTIL, "Encoder utilization (in %).")?,
            dec_util: gauge(DEC_UTIL, "Decoder utilization (in %).")?,
            fb_free: gauge(FB_FREE, "Frame buffer memory free (in MB).")?,
            fb_used: gauge(FB_USED, "Frame buffer memory used (in MB).")?,
            pcie_replay_counter: counter(PCIE_REPLAY_COUNTER, "Total number of PCIe retries.")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_fields() {
        let registry = MetricsRegistry::new();
        let fields = DcgmFields::register(&registry).unwrap();

        let labels = ["0", "GPU-x", "nvidia0", "NVIDIA A100-SXM4-80GB", "g001", "560.35.03"];
        fields.gpu_util.with_label_values(&labels).set(42.0);
        fields.pcie_replay_counter.with_label_values(&labels).inc();

        let text = registry.export_metrics().unwrap();
        assert!(text.contains("# TYPE DCGM_FI_DEV_GPU_UTIL gauge"));
        assert!(text.contains("# TYPE DCGM_FI_DEV_PCIE_REPLAY_COUNTER counter"));
        assert!(text.contains("DCGM_FI_DRIVER_VERSION=\"560.35.03\""));
    }

    #[test]
    fn test_fields_register_once_per_registry() {
        let registry = MetricsRegistry::new();
        DcgmFields::register(&registry).unwrap();
        assert!(DcgmFields::register(&registry).is_err());
    }
}
