use serde::{Deserialize, Serialize};

use crate::device::DeviceCapabilities;
use crate::error::GatewayError;

/// Lifecycle state of the device session.
///
/// `Opened` implies `Initialized` by construction; there is no state
/// in which the device is open but not initialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initialized,
    Opened,
}

/// The device session owned by the gateway worker. Created on the
/// first `initializeDevice`, lives for the process lifetime, and is
/// only ever mutated by the worker. Failed transitions leave the
/// state unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceSession {
    state: SessionState,
    capabilities: DeviceCapabilities,
}

/// Point-in-time copy of the session flags, published to callers for
/// precondition checks. May be briefly stale relative to commands
/// still in flight on the worker; that race is accepted by design.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub initialized: bool,
    pub opened: bool,
    pub ready: bool,
    pub supports_cutter: bool,
}

impl DeviceSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    pub fn is_initialized(&self) -> bool {
        self.state != SessionState::Uninitialized
    }

    pub fn is_opened(&self) -> bool {
        self.state == SessionState::Opened
    }

    /// Record a successful init. Re-initializing an open session
    /// keeps it open but refreshes the capabilities.
    pub fn initialize(&mut self, capabilities: DeviceCapabilities) {
        self.capabilities = capabilities;
        if self.state == SessionState::Uninitialized {
            self.state = SessionState::Initialized;
        }
    }

    /// Record a successful open. Opening an already-open session is a
    /// no-op; opening before init is rejected.
    pub fn open(&mut self) -> Result<(), GatewayError> {
        match self.state {
            SessionState::Uninitialized => Err(GatewayError::DeviceNotInitialized),
            SessionState::Initialized | SessionState::Opened => {
                self.state = SessionState::Opened;
                Ok(())
            }
        }
    }

    /// Close drops back to Initialized; closing a session that was
    /// never opened is harmless.
    pub fn close(&mut self) {
        if self.state == SessionState::Opened {
            self.state = SessionState::Initialized;
        }
    }

    pub fn require_initialized(&self) -> Result<(), GatewayError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(GatewayError::DeviceNotInitialized)
        }
    }

    pub fn require_opened(&self) -> Result<(), GatewayError> {
        self.require_initialized()?;
        if self.is_opened() {
            Ok(())
        } else {
            Err(GatewayError::DeviceNotOpened)
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            initialized: self.is_initialized(),
            opened: self.is_opened(),
            ready: self.is_initialized() && self.is_opened(),
            supports_cutter: self.capabilities.supports_cutter,
        }
    }
}
