//! Simulated GPU inventory

/// Frame buffer capacity of an A100-SXM4-80GB in MB
pub const TOTAL_FB_MEMORY_MB: f64 = 81920.0;

/// Label names attached to every DCGM field, in export order
pub const GPU_LABEL_NAMES: [&str; 6] = [
    "gpu",
    "UUID",
    "device",
    "modelName",
    "Hostname",
    "DCGM_FI_DRIVER_VERSION",
];

const MODEL_NAME: &str = "NVIDIA A100-SXM4-80GB";
const HOSTNAME: &str = "g001";
const DRIVER_VERSION: &str = "560.35.03";

/// Static description of one simulated GPU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuDevice {
    pub index: u32,
    pub uuid: String,
    pub device: String,
    pub model_name: String,
    pub hostname: String,
    pub driver_version: String,
    gpu_label: String,
}

impl GpuDevice {
    /// Describe GPU `index` of the simulated host
    pub fn new(index: u32, uuid: impl Into<String>) -> Self {
        Self {
            index,
            uuid: uuid.into(),
            device: format!("nvidia{}", index),
            model_name: MODEL_NAME.to_string(),
            hostname: HOSTNAME.to_string(),
            driver_version: DRIVER_VERSION.to_string(),
            gpu_label: index.to_string(),
        }
    }

    /// Label values matching [`GPU_LABEL_NAMES`]
    pub fn label_values(&self) -> [&str; 6] {
        [
            self.gpu_label.as_str(),
            self.uuid.as_str(),
            self.device.as_str(),
            self.model_name.as_str(),
            self.hostname.as_str(),
            self.driver_version.as_str(),
        ]
    }
}

/// The four A100s of node `g001`
pub fn default_gpus() -> Vec<GpuDevice> {
    [
        "GPU-10ac97a8-6854-4d04-4b34-354b379055b8",
        "GPU-a3194300-a020-e3ba-ac84-a37dc730aeb8",
        "GPU-3e59d793-a4c9-8da2-093c-716183e7049a",
        "GPU-890b2d19-ed6f-15b1-3f1b-bdd34a7fa7c6",
    ]
    .iter()
    .enumerate()
    .map(|(index, uuid)| GpuDevice::new(index as u32, *uuid))
    .collect()
}
