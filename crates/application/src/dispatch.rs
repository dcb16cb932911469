use serde_json::{Map, Value};
use tracing::warn;

use domain::receipt::DEFAULT_QR_SIZE;
use domain::{CommandCall, GatewayError, ReceiptData};

/// A command after its arguments passed validation. Everything past
/// this point is strongly typed; the loose JSON map never reaches a
/// handler.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCommand {
    InitializeDevice,
    OpenDevice,
    CloseDevice,
    GetDeviceInfo,
    GetDeviceStatus,
    PrintText { text: String },
    PrintReceipt { receipt: ReceiptData },
    PrintQrCode { data: String, size: u32 },
    PrintBarcode { data: String },
    CutPaper,
    GetPrinterStatus,
}

/// Result of looking up a command name
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Command(GatewayCommand),
    /// Unrecognized name. A distinct no-op signal, not an error.
    NotImplemented,
}

/// Resolve a raw call into a typed command. Malformed arguments fail
/// fast here, before anything is enqueued or the device is touched.
pub fn resolve(call: &CommandCall) -> Result<Dispatch, GatewayError> {
    let args = &call.arguments;
    let command = match call.name.as_str() {
        "initializeDevice" => GatewayCommand::InitializeDevice,
        "openDevice" => GatewayCommand::OpenDevice,
        "closeDevice" => GatewayCommand::CloseDevice,
        "getDeviceInfo" => GatewayCommand::GetDeviceInfo,
        "getDeviceStatus" => GatewayCommand::GetDeviceStatus,
        "printText" => GatewayCommand::PrintText {
            text: require_string(args, "text")?,
        },
        "printReceipt" => GatewayCommand::PrintReceipt {
            receipt: require_receipt(args)?,
        },
        "printQRCode" => GatewayCommand::PrintQrCode {
            data: require_string(args, "data")?,
            size: optional_size(args, "size"),
        },
        "printBarcode" => GatewayCommand::PrintBarcode {
            data: require_string(args, "data")?,
        },
        "cutPaper" => GatewayCommand::CutPaper,
        "getPrinterStatus" => GatewayCommand::GetPrinterStatus,
        other => {
            warn!(command = %other, "Unrecognized command name");
            return Ok(Dispatch::NotImplemented);
        }
    };
    Ok(Dispatch::Command(command))
}

fn require_string(args: &Map<String, Value>, key: &str) -> Result<String, GatewayError> {
    match args.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(GatewayError::InvalidArgument(format!(
            "'{}' cannot be empty",
            key
        ))),
        Some(other) => Err(GatewayError::InvalidArgument(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
        None => Err(GatewayError::InvalidArgument(format!("'{}' is required", key))),
    }
}

fn require_receipt(args: &Map<String, Value>) -> Result<ReceiptData, GatewayError> {
    let raw = args
        .get("receiptData")
        .ok_or_else(|| GatewayError::InvalidArgument("'receiptData' is required".to_string()))?;
    serde_json::from_value(raw.clone())
        .map_err(|e| GatewayError::InvalidArgument(format!("invalid receiptData: {}", e)))
}

/// Sizes arrive as ints from typed callers and as strings from loose
/// ones; both are honored, anything else falls back to the default.
fn optional_size(args: &Map<String, Value>, key: &str) -> u32 {
    match args.get(key) {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as u32).unwrap_or(DEFAULT_QR_SIZE),
        Some(Value::String(s)) => s.parse().unwrap_or_else(|_| {
            warn!(raw = %s, "Invalid size argument, using default");
            DEFAULT_QR_SIZE
        }),
        _ => DEFAULT_QR_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: Value) -> CommandCall {
        let Value::Object(map) = args else { panic!("args must be an object") };
        CommandCall::new(name, map)
    }

    #[test]
    fn test_bare_commands_resolve() {
        for name in [
            "initializeDevice",
            "openDevice",
            "closeDevice",
            "getDeviceInfo",
            "getDeviceStatus",
            "cutPaper",
            "getPrinterStatus",
        ] {
            let dispatch = resolve(&CommandCall::bare(name)).unwrap();
            assert!(matches!(dispatch, Dispatch::Command(_)), "{}", name);
        }
    }

    #[test]
    fn test_unknown_name_is_not_implemented() {
        let dispatch = resolve(&CommandCall::bare("readMagStripe")).unwrap();
        assert_eq!(dispatch, Dispatch::NotImplemented);
    }

    #[test]
    fn test_print_text_requires_text() {
        let err = resolve(&CommandCall::bare("printText")).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");

        let err = resolve(&call("printText", json!({"text": 42}))).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");

        let dispatch = resolve(&call("printText", json!({"text": "hello"}))).unwrap();
        assert_eq!(
            dispatch,
            Dispatch::Command(GatewayCommand::PrintText {
                text: "hello".to_string()
            })
        );
    }

    #[test]
    fn test_qr_size_defaults_and_coerces() {
        let dispatch = resolve(&call("printQRCode", json!({"data": "x"}))).unwrap();
        assert!(matches!(
            dispatch,
            Dispatch::Command(GatewayCommand::PrintQrCode { size: 200, .. })
        ));

        let dispatch = resolve(&call("printQRCode", json!({"data": "x", "size": "150"}))).unwrap();
        assert!(matches!(
            dispatch,
            Dispatch::Command(GatewayCommand::PrintQrCode { size: 150, .. })
        ));
    }

    #[test]
    fn test_receipt_data_is_validated_up_front() {
        let err = resolve(&CommandCall::bare("printReceipt")).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");

        let err =
            resolve(&call("printReceipt", json!({"receiptData": {"items": "nope"}}))).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");

        let dispatch = resolve(&call(
            "printReceipt",
            json!({"receiptData": {"storeName": "CAFE", "items": []}}),
        ))
        .unwrap();
        assert!(matches!(
            dispatch,
            Dispatch::Command(GatewayCommand::PrintReceipt { .. })
        ));
    }
}
