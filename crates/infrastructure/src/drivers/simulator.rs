use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use domain::receipt::{Alignment, FontWeight};
use domain::{
    DeviceCapabilities, DeviceError, DeviceInfo, PosDevice, PrinterStatus, TextStyle,
};

use crate::config::DeviceConfig;

/// Status code the simulator reports while a submitted job is still
/// settling. Deliberately outside the settled set.
pub const CODE_BUSY: i32 = 2;

/// In-memory stand-in for the vendor device. Records everything that
/// reaches the paper path in a shared transcript so tests can inspect
/// exactly what would have printed, and exposes fault knobs for
/// paper-out, init failure, and slow settling.
pub struct SimulatedPosDevice {
    model: String,
    supports_cutter: bool,
    is_80mm: bool,
    fail_init: bool,
    paper_out: Arc<AtomicBool>,
    busy_polls_after_print: u32,
    remaining_busy_polls: u32,
    initialized: bool,
    staged: Vec<String>,
    transcript: Arc<Mutex<Vec<String>>>,
}

impl SimulatedPosDevice {
    pub fn new() -> Self {
        Self {
            model: "SimPOS 80".to_string(),
            supports_cutter: true,
            is_80mm: true,
            fail_init: false,
            paper_out: Arc::new(AtomicBool::new(false)),
            busy_polls_after_print: 0,
            remaining_busy_polls: 0,
            initialized: false,
            staged: Vec::new(),
            transcript: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new()
            .with_model(&config.model)
            .with_cutter(config.supports_cutter)
            .with_80mm(config.is_80mm)
            .with_paper_out(config.paper_out)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_cutter(mut self, supports_cutter: bool) -> Self {
        self.supports_cutter = supports_cutter;
        self
    }

    pub fn with_80mm(mut self, is_80mm: bool) -> Self {
        self.is_80mm = is_80mm;
        self
    }

    pub fn with_paper_out(self, paper_out: bool) -> Self {
        self.paper_out.store(paper_out, Ordering::SeqCst);
        self
    }

    /// Report the busy code for `n` status reads after each
    /// `start_print` before landing on Ready
    pub fn with_busy_polls(mut self, n: u32) -> Self {
        self.busy_polls_after_print = n;
        self
    }

    pub fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Shared view of everything submitted to the paper path
    pub fn transcript(&self) -> Arc<Mutex<Vec<String>>> {
        self.transcript.clone()
    }

    /// Shared paper-out flag, for flipping mid-test
    pub fn paper_out_flag(&self) -> Arc<AtomicBool> {
        self.paper_out.clone()
    }

    fn ensure_initialized(&self) -> Result<(), DeviceError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DeviceError::Fault("device not initialized".to_string()))
        }
    }

    fn style_tag(style: &TextStyle) -> String {
        let weight = match style.weight {
            FontWeight::Bold => "B",
            FontWeight::Normal => "N",
        };
        let align = match style.align {
            Alignment::Left => "L",
            Alignment::Center => "C",
            Alignment::Right => "R",
        };
        format!("{}{}{}", style.size, weight, align)
    }
}

impl Default for SimulatedPosDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PosDevice for SimulatedPosDevice {
    async fn init(&mut self) -> Result<DeviceCapabilities, DeviceError> {
        if self.fail_init {
            return Err(DeviceError::Fault("vendor driver unavailable".to_string()));
        }
        self.initialized = true;
        Ok(DeviceCapabilities {
            supports_cutter: self.supports_cutter,
            is_80mm: self.is_80mm,
        })
    }

    async fn device_info(&mut self) -> Result<DeviceInfo, DeviceError> {
        self.ensure_initialized()?;
        Ok(DeviceInfo {
            model: self.model.clone(),
            serial_number: "SIM-000001".to_string(),
            sdk_version: "1.0.0".to_string(),
        })
    }

    async fn printer_status(&mut self) -> Result<PrinterStatus, DeviceError> {
        self.ensure_initialized()?;
        if self.paper_out.load(Ordering::SeqCst) {
            return Ok(PrinterStatus::PaperOut);
        }
        if self.remaining_busy_polls > 0 {
            self.remaining_busy_polls -= 1;
            return Ok(PrinterStatus::Unknown(CODE_BUSY));
        }
        Ok(PrinterStatus::Ready)
    }

    async fn append_text(&mut self, text: &str, style: &TextStyle) -> Result<(), DeviceError> {
        self.ensure_initialized()?;
        self.staged
            .push(format!("TEXT[{}] {}", Self::style_tag(style), text));
        Ok(())
    }

    async fn append_qr(&mut self, data: &str, size: u32) -> Result<(), DeviceError> {
        self.ensure_initialized()?;
        self.staged.push(format!("QR[{}] {}", size, data));
        Ok(())
    }

    async fn append_barcode(&mut self, data: &str) -> Result<(), DeviceError> {
        self.ensure_initialized()?;
        self.staged.push(format!("BARCODE {}", data));
        Ok(())
    }

    async fn start_print(&mut self) -> Result<(), DeviceError> {
        self.ensure_initialized()?;
        if self.paper_out.load(Ordering::SeqCst) {
            return Err(DeviceError::Fault("out of paper".to_string()));
        }
        let staged = std::mem::take(&mut self.staged);
        debug!(segments = staged.len(), "Simulator printing staged job");
        let mut transcript = self.transcript.lock().await;
        transcript.extend(staged);
        transcript.push("PRINT".to_string());
        drop(transcript);
        self.remaining_busy_polls = self.busy_polls_after_print;
        Ok(())
    }

    async fn cut_paper(&mut self) -> Result<(), DeviceError> {
        self.ensure_initialized()?;
        if !self.supports_cutter {
            return Err(DeviceError::Fault("no cutter installed".to_string()));
        }
        self.transcript.lock().await.push("CUT".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_operations_require_init() {
        let mut device = SimulatedPosDevice::new();
        assert!(device.printer_status().await.is_err());
        assert!(device.append_text("x", &TextStyle::body()).await.is_err());

        device.init().await.unwrap();
        assert_eq!(device.printer_status().await.unwrap(), PrinterStatus::Ready);
    }

    #[tokio::test]
    async fn test_staged_segments_reach_transcript_on_print() {
        let mut device = SimulatedPosDevice::new();
        let transcript = device.transcript();
        device.init().await.unwrap();

        device.append_text("hello", &TextStyle::body()).await.unwrap();
        device.append_qr("ORD-0001", 200).await.unwrap();
        assert!(transcript.lock().await.is_empty(), "nothing prints before start_print");

        device.start_print().await.unwrap();
        let lines = transcript.lock().await;
        assert_eq!(lines[0], "TEXT[22NL] hello");
        assert_eq!(lines[1], "QR[200] ORD-0001");
        assert_eq!(lines[2], "PRINT");
    }

    #[tokio::test]
    async fn test_busy_polls_then_ready() {
        let mut device = SimulatedPosDevice::new().with_busy_polls(2);
        device.init().await.unwrap();
        device.append_text("x", &TextStyle::body()).await.unwrap();
        device.start_print().await.unwrap();

        assert_eq!(
            device.printer_status().await.unwrap(),
            PrinterStatus::Unknown(CODE_BUSY)
        );
        assert_eq!(
            device.printer_status().await.unwrap(),
            PrinterStatus::Unknown(CODE_BUSY)
        );
        assert_eq!(device.printer_status().await.unwrap(), PrinterStatus::Ready);
    }

    #[tokio::test]
    async fn test_paper_out_beats_everything() {
        let mut device = SimulatedPosDevice::new().with_paper_out(true);
        device.init().await.unwrap();
        assert_eq!(
            device.printer_status().await.unwrap(),
            PrinterStatus::PaperOut
        );
        assert!(device.start_print().await.is_err());
    }

    #[tokio::test]
    async fn test_cut_without_cutter_faults() {
        let mut device = SimulatedPosDevice::new().with_cutter(false);
        device.init().await.unwrap();
        assert!(device.cut_paper().await.is_err());
    }
}
