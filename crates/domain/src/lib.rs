//! Domain layer - Pure types with no I/O
//!
//! This crate contains:
//! - The command/outcome data model exchanged with callers
//! - The device session state machine
//! - The `PosDevice` trait that infrastructure drivers implement
//! - The receipt data model and print segments
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Session invariants enforced at the type level
//! - Testable in isolation

pub mod command;
pub mod device;
pub mod error;
pub mod outcome;
pub mod receipt;
pub mod session;

// Re-export commonly used types
pub use command::CommandCall;
pub use device::{DeviceCapabilities, DeviceError, DeviceInfo, PosDevice, PrinterStatus};
pub use error::GatewayError;
pub use outcome::Outcome;
pub use receipt::{ReceiptData, ReceiptItem, Segment, TextStyle};
pub use session::{DeviceSession, SessionSnapshot, SessionState};
