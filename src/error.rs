//! Error types and handling infrastructure for xrbind.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types and `anyhow` for application-level error handling with context.
//!
//! ## Design Principles
//!
//! - **Name the call**: every runtime-originated error records which runtime call failed
//! - **Keep the result code**: the runtime's own result code travels with the error
//! - **One recoverable case**: only a failed session begin may be retried
//! - **Consistency**: Standardized Result type across all modules

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result code reported by the XR runtime for a failed call.
///
/// Carries both the raw integer and the runtime's symbolic name so messages stay
/// readable while tests can still match on the raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCode {
    pub raw: i32,
    pub name: String,
}

impl ResultCode {
    pub fn new(raw: i32, name: impl Into<String>) -> Self {
        Self {
            raw,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.raw)
    }
}

/// The main error type for xrbind operations.
///
/// Build-time variants (configuration, path resolution, binding submission) and
/// steady-state variants (sync, query) are fatal. `BeginSession` is the only
/// condition the lifecycle controller retries.
#[derive(Error, Debug)]
pub enum XrBindError {
    /// Malformed descriptor, or the runtime rejected a name or priority
    #[error("Configuration rejected by {call}: {message}")]
    Configuration {
        call: &'static str,
        message: String,
        code: Option<ResultCode>,
    },

    /// A path string could not be converted into a runtime path
    #[error("Failed to resolve {role} path '{path}': {code}")]
    PathResolution {
        role: &'static str,
        path: String,
        code: ResultCode,
    },

    /// The runtime refused a suggested-binding submission
    #[error("Binding suggestion rejected for '{profile}': {code}")]
    BindingRejected { profile: String, code: ResultCode },

    /// An operation was issued outside the lifecycle's allowed order
    #[error("Lifecycle violation in {call}: {code}")]
    ProtocolViolation {
        call: &'static str,
        code: ResultCode,
    },

    /// The runtime rejected the per-tick action sync
    #[error("Failed to sync actions: {code}")]
    SyncFailed { code: ResultCode },

    /// The runtime rejected a per-action state query
    #[error("Failed to query state of action '{action}': {code}")]
    QueryFailed { action: String, code: ResultCode },

    /// Session begin failed; retried on the next ready notification
    #[error("Failed to begin session: {code}")]
    BeginSession { code: ResultCode },

    /// Any other runtime call failed (instance/session setup, event polling)
    #[error("Runtime call {call} failed: {message}")]
    Runtime {
        call: &'static str,
        message: String,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration text could not be parsed
    #[error("Invalid configuration: {message}")]
    ConfigParse { message: String },

    /// Report could not be written to the output sink
    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),

    /// Invalid command line arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Standard Result type for xrbind operations.
pub type Result<T> = std::result::Result<T, XrBindError>;

impl XrBindError {
    /// Configuration error raised before any runtime call was made
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            call: "validate",
            message: message.into(),
            code: None,
        }
    }

    /// Configuration error reported by the runtime for a creation call
    pub fn rejected(call: &'static str, subject: impl Into<String>, code: ResultCode) -> Self {
        Self::Configuration {
            call,
            message: format!("'{}' rejected with {}", subject.into(), code),
            code: Some(code),
        }
    }

    pub fn path_resolution(role: &'static str, path: impl Into<String>, code: ResultCode) -> Self {
        Self::PathResolution {
            role,
            path: path.into(),
            code,
        }
    }

    pub fn runtime(call: &'static str, message: impl Into<String>) -> Self {
        Self::Runtime {
            call,
            message: message.into(),
        }
    }

    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether the failure may be retried without restarting the process
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BeginSession { .. })
    }

    /// Runtime result code attached to this error, if any
    pub fn result_code(&self) -> Option<&ResultCode> {
        match self {
            Self::Configuration { code, .. } => code.as_ref(),
            Self::PathResolution { code, .. }
            | Self::BindingRejected { code, .. }
            | Self::ProtocolViolation { code, .. }
            | Self::SyncFailed { code }
            | Self::QueryFailed { code, .. }
            | Self::BeginSession { code } => Some(code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for XrBindError {
    fn from(err: serde_json::Error) -> Self {
        Self::config_parse(err.to_string())
    }
}
