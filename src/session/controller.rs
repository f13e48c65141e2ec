//! Session lifecycle controller.
//!
//! Reacts to session-state notifications: attaches the built action sets and begins
//! the session on `Ready`, and raises the input-active flag on `Focused`. The
//! controller never initiates a transition itself.

use crate::error::{Result, XrBindError};
use crate::runtime::{ActionSetHandle, RuntimeEvent, XrRuntime};
use crate::session::SessionState;
use log::{debug, info, warn};

/// State machine driven by runtime lifecycle notifications.
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    action_sets: Vec<ActionSetHandle>,
    attached: bool,
    running: bool,
    input_active: bool,
    attach_calls: usize,
    begin_attempts: usize,
}

impl SessionController {
    /// Controller for a session whose action sets are `action_sets`
    pub fn new(action_sets: Vec<ActionSetHandle>) -> Self {
        Self {
            state: SessionState::Unknown,
            action_sets,
            attached: false,
            running: false,
            input_active: false,
            attach_calls: 0,
            begin_attempts: 0,
        }
    }

    /// Feed one runtime event; only session-state changes are acted upon
    pub fn handle_event<R: XrRuntime + ?Sized>(
        &mut self,
        runtime: &mut R,
        event: RuntimeEvent,
    ) -> Result<()> {
        match event {
            RuntimeEvent::SessionStateChanged(state) => self.transition(runtime, state),
            RuntimeEvent::Other => Ok(()),
        }
    }

    /// Apply a session-state change notification
    pub fn transition<R: XrRuntime + ?Sized>(
        &mut self,
        runtime: &mut R,
        next: SessionState,
    ) -> Result<()> {
        debug!("Session state {} -> {}", self.state, next);
        self.state = next;

        match next {
            SessionState::Ready => self.on_ready(runtime),
            SessionState::Focused => {
                if !self.input_active {
                    info!("Session focused, input active");
                }
                self.input_active = true;
                Ok(())
            }
            SessionState::Unrecognized(raw) => {
                warn!("Ignoring unrecognized session state {}", raw);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn on_ready<R: XrRuntime + ?Sized>(&mut self, runtime: &mut R) -> Result<()> {
        if !self.attached {
            self.attach_calls += 1;
            runtime
                .attach_action_sets(&self.action_sets)
                .map_err(|code| XrBindError::ProtocolViolation {
                    call: "attach_action_sets",
                    code,
                })?;
            self.attached = true;
            info!("Attached {} action set(s)", self.action_sets.len());
        }

        if self.running {
            debug!("Session already running, ignoring ready notification");
            return Ok(());
        }

        self.begin_attempts += 1;
        match runtime.begin_session() {
            Ok(()) => {
                self.running = true;
                info!("Session begun");
            }
            Err(code) => {
                let err = XrBindError::BeginSession { code };
                warn!("{} (will retry on next ready notification)", err);
            }
        }
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the sync loop may synchronize and query actions
    pub fn input_active(&self) -> bool {
        self.input_active
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn attach_calls(&self) -> usize {
        self.attach_calls
    }

    pub fn begin_attempts(&self) -> usize {
        self.begin_attempts
    }
}
