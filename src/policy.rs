//! Panic Policy
//!
//! Classifies the outcome of every remote command, reads included, and
//! decides whether the process survives it.
//!
//! - `Ok`: the store answered with a non-error reply
//! - `ProtocolError`: the store answered with an error reply
//! - `Unreachable`: no reply was obtained
//!
//! Both failure kinds are always logged. When the panic flag is present the
//! process is terminated with [`EXIT_REMOTE_PANIC`].

use crate::error::{EnvSyncError, Result, EXIT_REMOTE_PANIC};
use crate::protocol::{Command, Reply};

/// Ends the process with the given status
pub type Terminator = fn(i32) -> !;

/// Classified outcome of one remote command
#[derive(Debug)]
pub enum Outcome {
    Ok(Reply),
    /// Always [`EnvSyncError::Remote`]
    ProtocolError(EnvSyncError),
    Unreachable(EnvSyncError),
}

impl Outcome {
    pub fn classify(result: Result<Reply>) -> Self {
        match result {
            Ok(Reply::Error(message)) => Outcome::ProtocolError(EnvSyncError::Remote(message)),
            Ok(reply) => Outcome::Ok(reply),
            Err(e) => Outcome::Unreachable(e),
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Ok(_))
    }
}

/// Failure policy applied after every remote command
#[derive(Clone, Copy)]
pub struct PanicPolicy {
    terminator: Terminator,
}

impl std::fmt::Debug for PanicPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanicPolicy").finish_non_exhaustive()
    }
}

impl PanicPolicy {
    /// Policy that exits the process
    pub fn new() -> Self {
        Self {
            terminator: std::process::exit,
        }
    }

    /// Policy that hands termination to `terminator`
    pub fn with_terminator(terminator: Terminator) -> Self {
        Self { terminator }
    }

    /// Review the result of `command`.
    ///
    /// Returns the reply when the command succeeded, `None` otherwise.
    /// Does not return at all when termination is triggered.
    pub fn review(
        &self,
        command: &Command,
        result: Result<Reply>,
        panic_enabled: bool,
    ) -> Option<Reply> {
        match Outcome::classify(result) {
            Outcome::Ok(reply) => Some(reply),
            Outcome::ProtocolError(e) => {
                tracing::error!("Remote store rejected `{}`: {}", command, e);
                self.escalate(panic_enabled);
                None
            }
            Outcome::Unreachable(e) => {
                tracing::error!("No reply from remote store for `{}`: {}", command, e);
                self.escalate(panic_enabled);
                None
            }
        }
    }

    fn escalate(&self, panic_enabled: bool) {
        if panic_enabled {
            tracing::error!("Panic flag set, terminating with status {}", EXIT_REMOTE_PANIC);
            (self.terminator)(EXIT_REMOTE_PANIC)
        }
    }
}

impl Default for PanicPolicy {
    fn default() -> Self {
        Self::new()
    }
}
