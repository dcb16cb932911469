use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use domain::{CommandCall, GatewayError, Outcome, PosDevice, SessionSnapshot};

use crate::dispatch::{self, Dispatch, GatewayCommand};
use crate::worker::{CommandJob, GatewayWorker, SettleConfig, status_snapshot};

const JOB_QUEUE_DEPTH: usize = 32;

/// Caller-facing handle to the gateway. Cheap to clone; every clone
/// feeds the same single worker, so commands from all clones share
/// one FIFO order.
#[derive(Clone)]
pub struct PosGateway {
    job_tx: mpsc::Sender<CommandJob>,
    state_rx: watch::Receiver<SessionSnapshot>,
}

impl PosGateway {
    /// Spawn the worker that takes exclusive ownership of `device`
    /// and return the handle callers use to reach it.
    pub fn start(
        device: Box<dyn PosDevice>,
        settle: SettleConfig,
        cancel_token: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (job_tx, job_rx) = mpsc::channel(JOB_QUEUE_DEPTH);
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::default());
        let worker = GatewayWorker::new(device, job_rx, state_tx, settle, cancel_token);
        let handle = tokio::spawn(worker.run());
        (Self { job_tx, state_rx }, handle)
    }

    /// Dispatch a raw named call: resolve and validate arguments,
    /// then execute. Unknown names return `NotImplemented` without
    /// touching the worker.
    pub async fn call(&self, call: CommandCall) -> Outcome {
        debug!(command = %call.name, "Dispatching command");
        let command = match dispatch::resolve(&call) {
            Ok(Dispatch::Command(command)) => command,
            Ok(Dispatch::NotImplemented) => return Outcome::NotImplemented,
            Err(error) => return Outcome::failure(&error),
        };
        self.execute(command).await
    }

    /// Execute a typed command. Precondition failures are rejected
    /// here, against the latest published snapshot, without enqueueing
    /// any work; the snapshot may be briefly stale relative to
    /// commands still in flight, which is the accepted race of the
    /// no-lock session design.
    pub async fn execute(&self, command: GatewayCommand) -> Outcome {
        let snapshot = *self.state_rx.borrow();
        if let Err(error) = precheck(&command, &snapshot) {
            return Outcome::failure(&error);
        }

        // Served from the in-memory flags; no device I/O, no queueing.
        if command == GatewayCommand::GetDeviceStatus {
            return status_snapshot(&snapshot);
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let job = CommandJob {
            command,
            reply: reply_tx,
        };
        if self.job_tx.send(job).await.is_err() {
            return Outcome::failure(&GatewayError::GatewayClosed);
        }
        match reply_rx.await {
            Ok(outcome) => outcome,
            Err(_) => Outcome::failure(&GatewayError::GatewayClosed),
        }
    }

    /// Latest published session flags, for observability surfaces
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.state_rx.borrow()
    }
}

/// Device-readiness gate, applied before any work is enqueued.
/// Commands that fail here never reach the device handle.
fn precheck(command: &GatewayCommand, snapshot: &SessionSnapshot) -> Result<(), GatewayError> {
    match command {
        GatewayCommand::InitializeDevice
        | GatewayCommand::CloseDevice
        | GatewayCommand::GetDeviceStatus => Ok(()),

        GatewayCommand::OpenDevice | GatewayCommand::GetDeviceInfo => {
            if snapshot.initialized {
                Ok(())
            } else {
                Err(GatewayError::DeviceNotInitialized)
            }
        }

        GatewayCommand::PrintText { .. }
        | GatewayCommand::PrintReceipt { .. }
        | GatewayCommand::PrintQrCode { .. }
        | GatewayCommand::PrintBarcode { .. }
        | GatewayCommand::GetPrinterStatus => require_opened(snapshot),

        GatewayCommand::CutPaper => {
            require_opened(snapshot)?;
            if snapshot.supports_cutter {
                Ok(())
            } else {
                Err(GatewayError::CutterNotSupported)
            }
        }
    }
}

fn require_opened(snapshot: &SessionSnapshot) -> Result<(), GatewayError> {
    if !snapshot.initialized {
        Err(GatewayError::DeviceNotInitialized)
    } else if !snapshot.opened {
        Err(GatewayError::DeviceNotOpened)
    } else {
        Ok(())
    }
}
