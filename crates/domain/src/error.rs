use thiserror::Error;

/// Gateway-level errors, one variant per machine-readable failure code
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Device must be initialized first")]
    DeviceNotInitialized,

    #[error("Device must be opened first")]
    DeviceNotOpened,

    #[error("Failed to initialize device: {0}")]
    Init(String),

    #[error("Failed to open device: {0}")]
    Open(String),

    #[error("Failed to close device: {0}")]
    Close(String),

    #[error("Failed to get device info: {0}")]
    Info(String),

    #[error("Print failed: {0}")]
    Print(String),

    #[error("Failed to cut paper: {0}")]
    Cut(String),

    #[error("Failed to get printer status: {0}")]
    Status(String),

    #[error("Paper cutter not supported on this device")]
    CutterNotSupported,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Gateway worker is not running")]
    GatewayClosed,
}

impl GatewayError {
    /// Stable code reported to callers alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::DeviceNotInitialized => "DEVICE_NOT_INITIALIZED",
            Self::DeviceNotOpened => "DEVICE_NOT_OPENED",
            Self::Init(_) => "INIT_ERROR",
            Self::Open(_) => "OPEN_ERROR",
            Self::Close(_) => "CLOSE_ERROR",
            Self::Info(_) => "INFO_ERROR",
            Self::Print(_) => "PRINT_ERROR",
            Self::Cut(_) => "CUT_ERROR",
            Self::Status(_) => "STATUS_ERROR",
            Self::CutterNotSupported => "NOT_SUPPORTED",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::GatewayClosed => "GATEWAY_CLOSED",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(GatewayError::DeviceNotInitialized.code(), "DEVICE_NOT_INITIALIZED");
        assert_eq!(GatewayError::DeviceNotOpened.code(), "DEVICE_NOT_OPENED");
        assert_eq!(GatewayError::Print("x".into()).code(), "PRINT_ERROR");
        assert_eq!(GatewayError::CutterNotSupported.code(), "NOT_SUPPORTED");
        assert_eq!(GatewayError::InvalidArgument("x".into()).code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_message_carries_detail() {
        let err = GatewayError::Open("Printer not ready: Out of paper".into());
        assert_eq!(
            err.to_string(),
            "Failed to open device: Printer not ready: Out of paper"
        );
    }
}
