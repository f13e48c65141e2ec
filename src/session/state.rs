//! Session states reported by the runtime.

use std::fmt;

/// Lifecycle state of the XR session.
///
/// Normal progression is `Unknown → Idle → Ready → Synchronized → Visible → Focused`;
/// `Stopping`, `LossPending` and `Exiting` can be entered from anywhere and
/// `Exiting` is terminal. Values this build does not know are kept as
/// `Unrecognized` so they can be logged and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Idle,
    Ready,
    Synchronized,
    Visible,
    Focused,
    Stopping,
    LossPending,
    Exiting,
    Unrecognized(i32),
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Exiting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unknown => f.write_str("unknown"),
            SessionState::Idle => f.write_str("idle"),
            SessionState::Ready => f.write_str("ready"),
            SessionState::Synchronized => f.write_str("synchronized"),
            SessionState::Visible => f.write_str("visible"),
            SessionState::Focused => f.write_str("focused"),
            SessionState::Stopping => f.write_str("stopping"),
            SessionState::LossPending => f.write_str("loss-pending"),
            SessionState::Exiting => f.write_str("exiting"),
            SessionState::Unrecognized(raw) => write!(f, "unrecognized({raw})"),
        }
    }
}
