//! Infrastructure layer - Device implementations and configuration

pub mod config;
pub mod drivers;

pub use config::{DeviceConfig, GatewayConfig, SettleSettings};
pub use drivers::SimulatedPosDevice;
