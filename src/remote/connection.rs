//! Connection Manager
//!
//! Owns the process's single optional handle to the remote store.
//! Established once at attach, torn down once at detach, never re-established.

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Command, Reply};

use super::{Connector, RemoteStore};

/// Lifecycle of the remote connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No attempt made yet, or torn down after detach
    Unconnected,
    Connected,
    /// Attempt failed; stays failed for the rest of the process
    Failed,
}

/// Holds the remote handle and its state
pub struct ConnectionManager {
    state: ConnectionState,
    remote: Option<Box<dyn RemoteStore>>,
    attempted: bool,
}

impl ConnectionManager {
    /// A manager that has not connected yet
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Unconnected,
            remote: None,
            attempted: false,
        }
    }

    /// Connect once.
    ///
    /// A failure is logged and leaves the manager `Failed`; it is never
    /// retried. Calling this again after the first attempt has no effect.
    pub fn connect(&mut self, config: &Config, connector: &dyn Connector) -> ConnectionState {
        if self.attempted {
            return self.state;
        }
        self.attempted = true;
        self.state = match connector.connect(config) {
            Ok(remote) => {
                tracing::info!("Connected to remote store at {}", config.addr());
                self.remote = Some(remote);
                ConnectionState::Connected
            }
            Err(e) => {
                tracing::warn!(
                    "Remote store at {} unavailable, running local-only: {}",
                    config.addr(),
                    e
                );
                ConnectionState::Failed
            }
        };
        self.state
    }

    /// Record a failure that happened before a connection could be attempted
    pub fn mark_failed(&mut self) {
        if !self.attempted {
            self.attempted = true;
            self.state = ConnectionState::Failed;
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Close the connection; only the first call does anything
    pub fn teardown(&mut self) {
        if let Some(mut remote) = self.remote.take() {
            remote.close();
            tracing::debug!("Remote connection closed");
            self.state = ConnectionState::Unconnected;
        }
    }

    /// Execute a command if connected; `None` when local-only
    pub fn execute(&mut self, command: &Command) -> Option<Result<Reply>> {
        let remote = self.remote.as_mut()?;
        Some(remote.execute(command))
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}
