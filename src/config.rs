//! Configuration for envsync
//!
//! All settings live in the host's own variable table and are read through
//! the real backend, never through the interception layer. Host and port are
//! read once at attach; prefix and panic flag are read on every use.

use std::time::Duration;

use crate::backend::RealBackend;
use crate::error::{EnvSyncError, Result};

/// Remote host variable
pub const HOST_VAR: &str = "ENVREDIS_IP";

/// Remote port variable
pub const PORT_VAR: &str = "ENVREDIS_PORT";

/// Key prefix variable
pub const PREFIX_VAR: &str = "ENVREDIS_PREFIX";

/// Panic flag variable (presence is the signal)
pub const PANIC_VAR: &str = "ENVREDIS_PANIC";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;

/// Connection configuration, fixed for the lifetime of the connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Remote host name or address
    pub host: String,

    /// Remote TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeouts (None = block indefinitely)
    // -------------------------------------------------------------------------
    pub connect_timeout: Option<Duration>,

    pub read_timeout: Option<Duration>,

    pub write_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve host and port from the variable table
    pub fn from_reader<B: RealBackend + ?Sized>(reader: &ConfigReader<'_, B>) -> Result<Self> {
        Ok(Config::builder()
            .host(reader.host())
            .port(reader.port()?)
            .build())
    }

    /// `host:port` form for logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the remote host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the remote port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Bound the time spent establishing the connection
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Bound the time spent waiting for a reply
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    /// Bound the time spent writing a command
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Reads settings straight from a backend.
///
/// Nothing is cached: every call reflects the table's current contents.
pub struct ConfigReader<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: RealBackend + ?Sized> ConfigReader<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Remote host, defaulting to the loopback address
    pub fn host(&self) -> String {
        self.backend
            .get(HOST_VAR)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Remote port, defaulting to 6379
    pub fn port(&self) -> Result<u16> {
        match self.backend.get(PORT_VAR) {
            None => Ok(DEFAULT_PORT),
            Some(raw) => raw.trim().parse().map_err(|_| {
                EnvSyncError::Config(format!("{} is not a valid port: {:?}", PORT_VAR, raw))
            }),
        }
    }

    /// Namespace prefix for wire keys (empty when unset)
    pub fn prefix(&self) -> String {
        self.backend.get(PREFIX_VAR).unwrap_or_default()
    }

    /// True iff the panic flag is present, whatever its value
    pub fn panic_enabled(&self) -> bool {
        self.backend.get(PANIC_VAR).is_some()
    }
}
