use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use domain::{
    DeviceError, DeviceSession, GatewayError, Outcome, PosDevice, PrinterStatus, ReceiptData,
    Segment, SessionSnapshot, TextStyle,
};

use crate::composer;
use crate::dispatch::GatewayCommand;

/// One enqueued command with its reply slot. The oneshot is resolved
/// exactly once, as a direct continuation of the command's execution,
/// which is what gives callers submission-order delivery.
pub struct CommandJob {
    pub command: GatewayCommand,
    pub reply: oneshot::Sender<Outcome>,
}

/// Poll-with-timeout settings for waiting out asynchronous hardware
/// completion after a receipt job is submitted.
#[derive(Debug, Clone, Copy)]
pub struct SettleConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            timeout: Duration::from_secs(2),
        }
    }
}

/// The single worker that owns the device handle and the session.
/// Jobs drain strictly in submission order; a failed handler reports
/// a failure outcome and the worker keeps going.
pub struct GatewayWorker {
    device: Box<dyn PosDevice>,
    session: DeviceSession,
    job_rx: mpsc::Receiver<CommandJob>,
    state_tx: watch::Sender<SessionSnapshot>,
    settle: SettleConfig,
    cancel_token: CancellationToken,
}

impl GatewayWorker {
    pub fn new(
        device: Box<dyn PosDevice>,
        job_rx: mpsc::Receiver<CommandJob>,
        state_tx: watch::Sender<SessionSnapshot>,
        settle: SettleConfig,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            device,
            session: DeviceSession::new(),
            job_rx,
            state_tx,
            settle,
            cancel_token,
        }
    }

    pub async fn run(mut self) {
        info!("Gateway worker started");
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("Shutdown signal received, gateway worker stopping");
                    break;
                }
                job = self.job_rx.recv() => {
                    let Some(job) = job else {
                        info!("Job channel closed, gateway worker stopping");
                        break;
                    };
                    let outcome = self.execute(job.command).await;
                    // Republish the session flags before answering so a
                    // caller that saw the outcome also sees the state it
                    // produced.
                    let _ = self.state_tx.send(self.session.snapshot());
                    if job.reply.send(outcome).is_err() {
                        debug!("Caller went away before its outcome was delivered");
                    }
                }
            }
        }
    }

    async fn execute(&mut self, command: GatewayCommand) -> Outcome {
        match self.try_execute(command).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(code = %error.code(), error = %error, "Command failed");
                Outcome::failure(&error)
            }
        }
    }

    async fn try_execute(&mut self, command: GatewayCommand) -> Result<Outcome, GatewayError> {
        match command {
            GatewayCommand::InitializeDevice => self.initialize_device().await,
            GatewayCommand::OpenDevice => self.open_device().await,
            GatewayCommand::CloseDevice => self.close_device(),
            GatewayCommand::GetDeviceInfo => self.get_device_info().await,
            // Answered from the handle's snapshot without enqueueing;
            // kept here so a directly-driven worker still responds.
            GatewayCommand::GetDeviceStatus => Ok(status_snapshot(&self.session.snapshot())),
            GatewayCommand::PrintText { text } => self.print_text(&text).await,
            GatewayCommand::PrintReceipt { receipt } => self.print_receipt(&receipt).await,
            GatewayCommand::PrintQrCode { data, size } => self.print_qr(&data, size).await,
            GatewayCommand::PrintBarcode { data } => self.print_barcode(&data).await,
            GatewayCommand::CutPaper => self.cut_paper().await,
            GatewayCommand::GetPrinterStatus => self.get_printer_status().await,
        }
    }

    async fn initialize_device(&mut self) -> Result<Outcome, GatewayError> {
        debug!("Initializing device");
        let capabilities = self
            .device
            .init()
            .await
            .map_err(|e| GatewayError::Init(e.to_string()))?;
        self.session.initialize(capabilities);
        info!(supports_cutter = capabilities.supports_cutter, "Device initialized");
        Ok(Outcome::success("Device initialized successfully")
            .with("supportsCutter", capabilities.supports_cutter))
    }

    async fn open_device(&mut self) -> Result<Outcome, GatewayError> {
        self.session.require_initialized()?;
        let status = self
            .device
            .printer_status()
            .await
            .map_err(|e| GatewayError::Open(e.to_string()))?;
        if !status.is_ready() {
            return Err(GatewayError::Open(format!(
                "Printer not ready: {}",
                status.message()
            )));
        }
        self.session.open()?;
        info!("Device opened");
        Ok(Outcome::success("Printer opened successfully").with("status", "ready"))
    }

    fn close_device(&mut self) -> Result<Outcome, GatewayError> {
        // The device needs no explicit teardown; closing is a session
        // transition only.
        self.session.close();
        info!("Device closed");
        Ok(Outcome::success("Device closed successfully"))
    }

    async fn get_device_info(&mut self) -> Result<Outcome, GatewayError> {
        self.session.require_initialized()?;
        let info = self
            .device
            .device_info()
            .await
            .map_err(|e| GatewayError::Info(e.to_string()))?;
        let status = self
            .device
            .printer_status()
            .await
            .map_err(|e| GatewayError::Info(e.to_string()))?;
        let capabilities = self.session.capabilities();
        Ok(Outcome::success("Device info retrieved")
            .with("model", info.model)
            .with("serialNumber", info.serial_number)
            .with("sdkVersion", info.sdk_version)
            .with("supportsCutter", capabilities.supports_cutter)
            .with("printerStatus", status.message())
            .with("is80MMPrinter", capabilities.is_80mm))
    }

    async fn print_text(&mut self, text: &str) -> Result<Outcome, GatewayError> {
        self.session.require_opened()?;
        self.check_paper().await?;

        let style = TextStyle::plain_text();
        map_print(self.device.append_text(text, &style).await)?;
        map_print(self.device.append_text("\n", &style).await)?;
        map_print(self.device.start_print().await)?;
        Ok(Outcome::success("Text printed successfully"))
    }

    async fn print_receipt(&mut self, receipt: &ReceiptData) -> Result<Outcome, GatewayError> {
        self.session.require_opened()?;
        self.check_paper().await?;

        let job = composer::compose_receipt(receipt);
        debug!(segments = job.segments.len(), order_number = %job.order_number, "Printing receipt");
        for segment in &job.segments {
            let appended = match segment {
                Segment::Text { content, style } => self.device.append_text(content, style).await,
                Segment::QrCode { data, size } => self.device.append_qr(data, *size).await,
                Segment::Barcode { data } => self.device.append_barcode(data).await,
            };
            map_print(appended)?;
        }
        map_print(self.device.start_print().await)?;

        // The device reports completion asynchronously; poll until it
        // lands on a settled status instead of sleeping a fixed delay.
        let final_status = self.wait_for_settle().await?;
        debug!(status = %final_status.message(), "Receipt job settled");

        Ok(Outcome::success("Receipt printed successfully")
            .with("orderNumber", job.order_number))
    }

    async fn print_qr(&mut self, data: &str, size: u32) -> Result<Outcome, GatewayError> {
        self.session.require_opened()?;
        self.check_paper().await?;

        map_print(self.device.append_qr(data, size).await)?;
        map_print(self.device.start_print().await)?;
        Ok(Outcome::success("QR code printed successfully"))
    }

    async fn print_barcode(&mut self, data: &str) -> Result<Outcome, GatewayError> {
        self.session.require_opened()?;
        self.check_paper().await?;

        map_print(self.device.append_barcode(data).await)?;
        map_print(self.device.start_print().await)?;
        Ok(Outcome::success("Barcode printed successfully"))
    }

    async fn cut_paper(&mut self) -> Result<Outcome, GatewayError> {
        self.session.require_opened()?;
        if !self.session.capabilities().supports_cutter {
            return Err(GatewayError::CutterNotSupported);
        }
        let status = self
            .device
            .printer_status()
            .await
            .map_err(|e| GatewayError::Cut(e.to_string()))?;
        if !status.is_ready() {
            return Err(GatewayError::Cut("Printer not ready for cutting".to_string()));
        }
        self.device
            .cut_paper()
            .await
            .map_err(|e| GatewayError::Cut(e.to_string()))?;
        Ok(Outcome::success("Paper cut successfully"))
    }

    async fn get_printer_status(&mut self) -> Result<Outcome, GatewayError> {
        self.session.require_opened()?;
        let status = self
            .device
            .printer_status()
            .await
            .map_err(|e| GatewayError::Status(e.to_string()))?;
        Ok(Outcome::success("Printer status retrieved")
            .with("statusCode", status.code())
            .with("statusMessage", status.message())
            .with("isReady", status.is_ready())
            .with("isPaperOut", status.is_paper_out()))
    }

    /// Reject print work up front when the device already reports
    /// paper-out.
    async fn check_paper(&mut self) -> Result<(), GatewayError> {
        let status = self
            .device
            .printer_status()
            .await
            .map_err(|e| GatewayError::Print(e.to_string()))?;
        if status.is_paper_out() {
            return Err(GatewayError::Print("Out of paper".to_string()));
        }
        Ok(())
    }

    /// Bounded poll against the status read; a device stuck on an
    /// unsettled code past the deadline reports a timeout failure.
    async fn wait_for_settle(&mut self) -> Result<PrinterStatus, GatewayError> {
        let deadline = Instant::now() + self.settle.timeout;
        loop {
            let status = self
                .device
                .printer_status()
                .await
                .map_err(|e| GatewayError::Print(e.to_string()))?;
            if status.is_settled() {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                return Err(GatewayError::Print(format!(
                    "Timed out waiting for printer to settle (last status: {})",
                    status.message()
                )));
            }
            tokio::time::sleep(self.settle.poll_interval).await;
        }
    }
}

fn map_print(result: Result<(), DeviceError>) -> Result<(), GatewayError> {
    result.map_err(|e| GatewayError::Print(e.to_string()))
}

/// The in-memory status answer; no device I/O involved.
pub fn status_snapshot(snapshot: &SessionSnapshot) -> Outcome {
    Outcome::success("Device status retrieved")
        .with("initialized", snapshot.initialized)
        .with("opened", snapshot.opened)
        .with("ready", snapshot.ready)
        .with("supportsCutter", snapshot.supports_cutter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::GatewayCommand;
    use infrastructure::drivers::SimulatedPosDevice;
    use serde_json::json;

    fn worker() -> GatewayWorker {
        let (_job_tx, job_rx) = mpsc::channel(4);
        let (state_tx, _state_rx) = watch::channel(SessionSnapshot::default());
        GatewayWorker::new(
            Box::new(SimulatedPosDevice::new()),
            job_rx,
            state_tx,
            SettleConfig::default(),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_directly_driven_worker_answers_device_status() {
        let mut worker = worker();

        let outcome = worker.execute(GatewayCommand::GetDeviceStatus).await;
        assert_eq!(outcome.field("initialized"), Some(&json!(false)));
        assert_eq!(outcome.field("opened"), Some(&json!(false)));

        assert!(worker.execute(GatewayCommand::InitializeDevice).await.is_success());
        assert!(worker.execute(GatewayCommand::OpenDevice).await.is_success());
        let outcome = worker.execute(GatewayCommand::GetDeviceStatus).await;
        assert_eq!(outcome.field("initialized"), Some(&json!(true)));
        assert_eq!(outcome.field("opened"), Some(&json!(true)));
        assert_eq!(outcome.field("ready"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_worker_gates_status_read_on_open() {
        let mut worker = worker();
        assert!(worker.execute(GatewayCommand::InitializeDevice).await.is_success());

        let outcome = worker.execute(GatewayCommand::GetPrinterStatus).await;
        assert_eq!(outcome.failure_code(), Some("DEVICE_NOT_OPENED"));

        assert!(worker.execute(GatewayCommand::OpenDevice).await.is_success());
        let outcome = worker.execute(GatewayCommand::GetPrinterStatus).await;
        assert!(outcome.is_success());
    }
}
