//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use envsync::config::{Config, PANIC_VAR, PREFIX_VAR};
use envsync::protocol::{Command, Reply};
use envsync::remote::{Connector, RemoteStore};
use envsync::{EnvShim, EnvSyncError, MemoryEnv, MemoryStore, PanicPolicy, RealBackend};

/// Terminator that unwinds instead of exiting
pub fn terminate(code: i32) -> ! {
    panic!("terminated with status {}", code)
}

/// Failure injected into every following command
#[derive(Debug, Clone)]
pub enum Fault {
    None,
    ErrorReply(String),
    NoReply,
    /// Answer every command with this reply
    Respond(Reply),
}

/// MemoryStore wrapper that records commands and injects failures.
/// Clones share state.
#[derive(Clone)]
pub struct FaultyStore {
    pub store: MemoryStore,
    fault: Arc<Mutex<Fault>>,
    log: Arc<Mutex<Vec<Command>>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            fault: Arc::new(Mutex::new(Fault::None)),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_keys(pairs: &[(&str, &str)]) -> Self {
        let faulty = Self::new();
        for (k, v) in pairs {
            faulty.store.insert(k.to_string(), v.to_string());
        }
        faulty
    }

    pub fn inject(&self, fault: Fault) {
        *self.fault.lock() = fault;
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().clone()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    /// Remote value as text
    pub fn value(&self, key: &str) -> Option<String> {
        self.store
            .value(key)
            .map(|v| String::from_utf8_lossy(&v).into_owned())
    }
}

impl RemoteStore for FaultyStore {
    fn execute(&mut self, command: &Command) -> envsync::Result<Reply> {
        self.log.lock().push(command.clone());
        match self.fault.lock().clone() {
            Fault::None => Ok(self.store.apply(command)),
            Fault::ErrorReply(message) => Ok(Reply::Error(message)),
            Fault::Respond(reply) => Ok(reply),
            Fault::NoReply => Err(EnvSyncError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            ))),
        }
    }
}

/// Hands out clones of one store
pub struct StoreConnector(pub FaultyStore);

impl Connector for StoreConnector {
    fn connect(&self, _config: &Config) -> envsync::Result<Box<dyn RemoteStore>> {
        Ok(Box::new(self.0.clone()))
    }
}

/// Always refuses
pub struct RefusingConnector;

impl Connector for RefusingConnector {
    fn connect(&self, config: &Config) -> envsync::Result<Box<dyn RemoteStore>> {
        Err(EnvSyncError::Connect(format!("{}: connection refused", config.addr())))
    }
}

/// Attach a shim over `env` and `store` with a non-exiting policy
pub fn attach(env: &MemoryEnv, store: &FaultyStore) -> EnvShim<MemoryEnv> {
    EnvShim::attach_with(
        env.clone(),
        &StoreConnector(store.clone()),
        PanicPolicy::with_terminator(terminate),
    )
    .unwrap()
}

/// Fresh env with `prefix` configured
pub fn env_with_prefix(prefix: &str) -> MemoryEnv {
    MemoryEnv::with_vars([(PREFIX_VAR, prefix)])
}

pub fn enable_panic(env: &MemoryEnv) {
    env.set(PANIC_VAR, "", true).unwrap();
}
