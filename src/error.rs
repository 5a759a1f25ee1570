//! Error types for envsync
//!
//! Provides a unified error type for all operations, plus the exit statuses
//! reserved for the fatal paths.

use thiserror::Error;

use crate::backend::Symbol;

/// Result type alias using EnvSyncError
pub type Result<T> = std::result::Result<T, EnvSyncError>;

/// Exit status used when the panic flag is set and a remote command fails
pub const EXIT_REMOTE_PANIC: i32 = 33;

/// Exit status used when a backend operation could not be resolved at attach
pub const EXIT_RESOLUTION_FAILURE: i32 = 34;

/// Status computed when the remote store cannot be reached at attach.
///
/// Reported through [`crate::shim::AttachStatus`]; the process keeps running
/// in local-only mode.
pub const EXIT_CONNECT_FAILURE: i32 = 35;

/// Unified error type for envsync operations
#[derive(Debug, Error)]
pub enum EnvSyncError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Attach Errors
    // -------------------------------------------------------------------------
    #[error("Failed to resolve backend operation `{symbol}`")]
    Resolution { symbol: Symbol },

    #[error("Connect error: {0}")]
    Connect(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Malformed reply: {0}")]
    Framing(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Unsupported reply type: {0}")]
    UnsupportedReply(String),

    // -------------------------------------------------------------------------
    // Variable Errors
    // -------------------------------------------------------------------------
    #[error("Invalid variable name: {0:?}")]
    InvalidName(String),

    #[error("Invalid value for {0}: contains NUL")]
    InvalidValue(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EnvSyncError {
    /// Process exit status for errors that abort the host
    pub fn exit_code(&self) -> i32 {
        match self {
            EnvSyncError::Resolution { .. } => EXIT_RESOLUTION_FAILURE,
            EnvSyncError::Connect(_) => EXIT_CONNECT_FAILURE,
            _ => 1,
        }
    }
}
