use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::receipt::TextStyle;

/// Errors reported by a device implementation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeviceError {
    #[error("Device fault: {0}")]
    Fault(String),
    #[error("Device not responding")]
    NotResponding,
}

/// Printer status as read from the device. Never cached beyond a
/// single command's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrinterStatus {
    Ready,
    PaperOut,
    Unknown(i32),
}

impl PrinterStatus {
    pub const CODE_READY: i32 = 0;
    pub const CODE_PAPER_OUT: i32 = 1;

    pub fn from_code(code: i32) -> Self {
        match code {
            Self::CODE_READY => Self::Ready,
            Self::CODE_PAPER_OUT => Self::PaperOut,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Ready => Self::CODE_READY,
            Self::PaperOut => Self::CODE_PAPER_OUT,
            Self::Unknown(code) => *code,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Ready => "Ready".to_string(),
            Self::PaperOut => "Out of paper".to_string(),
            Self::Unknown(code) => format!("Status code: {}", code),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_paper_out(&self) -> bool {
        matches!(self, Self::PaperOut)
    }

    /// A settled status is one the printer lands on after finishing a
    /// job; unknown codes are treated as still in flight.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::PaperOut)
    }
}

/// Capabilities discovered during device initialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub supports_cutter: bool,
    pub is_80mm: bool,
}

/// Static device identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub model: String,
    pub serial_number: String,
    pub sdk_version: String,
}

/// The exclusive device handle. Exactly one worker owns an instance;
/// nothing else ever touches it, which is what makes the gateway's
/// no-lock session model sound.
///
/// Print output is staged: `append_*` calls buffer segments and
/// `start_print` submits the buffered job to the paper path.
#[async_trait]
pub trait PosDevice: Send {
    /// Bring up the vendor session and report device capabilities
    async fn init(&mut self) -> Result<DeviceCapabilities, DeviceError>;

    /// Read identification data from the device
    async fn device_info(&mut self) -> Result<DeviceInfo, DeviceError>;

    /// Read the current printer status
    async fn printer_status(&mut self) -> Result<PrinterStatus, DeviceError>;

    /// Stage a styled text line
    async fn append_text(&mut self, text: &str, style: &TextStyle) -> Result<(), DeviceError>;

    /// Stage a QR code, rendered centered at size x size
    async fn append_qr(&mut self, data: &str, size: u32) -> Result<(), DeviceError>;

    /// Stage a barcode
    async fn append_barcode(&mut self, data: &str) -> Result<(), DeviceError>;

    /// Submit the staged job to the paper path
    async fn start_print(&mut self) -> Result<(), DeviceError>;

    /// Fire the paper cutter
    async fn cut_paper(&mut self) -> Result<(), DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_codes() {
        assert_eq!(PrinterStatus::from_code(0), PrinterStatus::Ready);
        assert_eq!(PrinterStatus::from_code(1), PrinterStatus::PaperOut);
        assert_eq!(PrinterStatus::from_code(7), PrinterStatus::Unknown(7));
        assert_eq!(PrinterStatus::Unknown(7).code(), 7);
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(PrinterStatus::Ready.message(), "Ready");
        assert_eq!(PrinterStatus::PaperOut.message(), "Out of paper");
        assert_eq!(PrinterStatus::Unknown(-3).message(), "Status code: -3");
    }

    #[test]
    fn test_settled_states() {
        assert!(PrinterStatus::Ready.is_settled());
        assert!(PrinterStatus::PaperOut.is_settled());
        assert!(!PrinterStatus::Unknown(2).is_settled());
    }
}
