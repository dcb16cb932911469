use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_supports_cutter")]
    pub supports_cutter: bool,
    #[serde(default = "default_is_80mm")]
    pub is_80mm: bool,
    /// Start the simulated device with the paper tray empty
    #[serde(default)]
    pub paper_out: bool,
}

fn default_model() -> String {
    "SimPOS 80".to_string()
}
fn default_supports_cutter() -> bool {
    true
}
fn default_is_80mm() -> bool {
    true
}

/// Settle-poll tuning for receipt jobs
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct SettleSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    50
}
fn default_timeout_ms() -> u64 {
    2000
}

impl Default for SettleSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayConfig {
    pub device: DeviceConfig,
    #[serde(default)]
    pub settle: SettleSettings,
}

impl GatewayConfig {
    /// Layered load: built-in defaults, then an optional
    /// `<config_dir>/default.toml`, then `GATEWAY_*` environment
    /// overrides (e.g. `GATEWAY_DEVICE__SUPPORTS_CUTTER=false`).
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("device.model", default_model())?
            .set_default("device.supports_cutter", default_supports_cutter())?
            .set_default("device.is_80mm", default_is_80mm())?
            .set_default("device.paper_out", false)?
            .set_default("settle.poll_interval_ms", default_poll_interval_ms() as i64)?
            .set_default("settle.timeout_ms", default_timeout_ms() as i64)?
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(Environment::with_prefix("GATEWAY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_files_uses_defaults() {
        let config = GatewayConfig::load("/nonexistent").unwrap();
        assert_eq!(config.device.model, "SimPOS 80");
        assert!(config.device.supports_cutter);
        assert!(!config.device.paper_out);
        assert_eq!(config.settle.timeout_ms, 2000);
    }
}
