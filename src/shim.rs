//! Shim Module
//!
//! The public operation surface and its attach/detach lifecycle.
//!
//! ## Attach
//! 1. Resolve the backend's operations (fatal on failure)
//! 2. Read host and port from the backend and connect once
//! 3. Seed the backend from the remote namespace
//!
//! ## Detach
//! Close the remote connection. Dropping the shim does the same.

use crate::backend::{RealBackend, SymbolResolver};
use crate::config::{Config, ConfigReader};
use crate::error::{Result, EXIT_CONNECT_FAILURE};
use crate::loader::{BulkLoader, LoadReport};
use crate::policy::PanicPolicy;
use crate::remote::{ConnectionManager, ConnectionState, Connector, TcpConnector};
use crate::translator::CommandTranslator;

/// What happened during attach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachStatus {
    /// Connection state right after attach
    pub state: ConnectionState,

    /// Result of the initial bulk load
    pub report: LoadReport,
}

impl AttachStatus {
    /// Status code of the attach step.
    ///
    /// A failed connection yields [`EXIT_CONNECT_FAILURE`]; nothing acts on
    /// it, the shim keeps running local-only.
    pub fn code(&self) -> i32 {
        match self.state {
            ConnectionState::Failed => EXIT_CONNECT_FAILURE,
            _ => 0,
        }
    }
}

/// Variable API backed by a shared remote namespace
pub struct EnvShim<B: RealBackend> {
    translator: CommandTranslator<B>,
    status: AttachStatus,
}

impl<B: RealBackend> EnvShim<B> {
    /// Attach over TCP, exiting the process on panic-policy failures
    pub fn attach(backend: B) -> Result<Self> {
        Self::attach_with(backend, &TcpConnector, PanicPolicy::new())
    }

    /// Attach with an explicit connector and policy
    pub fn attach_with(backend: B, connector: &dyn Connector, policy: PanicPolicy) -> Result<Self> {
        let backend = SymbolResolver::resolve(backend)?;

        let mut connection = ConnectionManager::new();
        match Config::from_reader(&ConfigReader::new(backend.inner())) {
            Ok(config) => {
                connection.connect(&config, connector);
            }
            Err(e) => {
                tracing::warn!("Remote store not usable, running local-only: {}", e);
                connection.mark_failed();
            }
        }

        let mut translator = CommandTranslator::new(backend, connection, policy);
        let report = BulkLoader::run(&mut translator);
        let status = AttachStatus {
            state: translator.connection_state(),
            report,
        };
        tracing::debug!("Attached with status {}", status.code());

        Ok(Self { translator, status })
    }

    // =========================================================================
    // Operation Surface
    // =========================================================================

    pub fn get(&mut self, name: &str) -> Option<String> {
        self.translator.get(name)
    }

    pub fn secure_get(&self, name: &str) -> Option<String> {
        self.translator.secure_get(name)
    }

    pub fn set(&mut self, name: &str, value: &str, overwrite: bool) -> Result<()> {
        self.translator.set(name, value, overwrite)
    }

    pub fn unset(&mut self, name: &str) -> Result<()> {
        self.translator.unset(name)
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.translator.clear_all()
    }

    pub fn put_env(&mut self, assignment: &str) -> Result<()> {
        self.translator.put_env(assignment)
    }

    /// Re-seed the backend from the current namespace
    pub fn reload(&mut self) -> LoadReport {
        BulkLoader::run(&mut self.translator)
    }

    /// Bare names present remotely under the current prefix
    pub fn remote_names(&mut self) -> Vec<String> {
        if !self.translator.is_connected() {
            return Vec::new();
        }
        let prefix = self.translator.prefix();
        self.translator.list_namespace(&prefix)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn attach_status(&self) -> AttachStatus {
        self.status
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.translator.connection_state()
    }

    pub fn backend(&self) -> &B {
        self.translator.backend()
    }

    pub fn prefix(&self) -> String {
        self.translator.prefix()
    }

    /// Close the remote connection
    pub fn detach(mut self) {
        self.translator.teardown();
        tracing::debug!("Detached");
    }
}
