//! Remote Module
//!
//! The remote key-value store, consumed as an opaque command/reply capability.
//!
//! ## Architecture
//! - `RemoteStore`: executes one command, yielding one reply or a transport failure
//! - `Connector`: establishes a store from the attach-time configuration
//! - `ConnectionManager`: owns the single optional handle for the process

mod connection;
mod memory;
mod tcp;

pub use connection::{ConnectionManager, ConnectionState};
pub use memory::MemoryStore;
pub use tcp::{TcpConnector, TcpRemote};

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Command, Reply};

/// A connected remote store
///
/// `Err` from [`execute`](RemoteStore::execute) means no reply was obtained
/// at all; error replies come back as `Ok(Reply::Error(..))`.
pub trait RemoteStore {
    /// Execute one command (blocking, attempted exactly once)
    fn execute(&mut self, command: &Command) -> Result<Reply>;

    /// Release the underlying channel
    fn close(&mut self) {}
}

/// Establishes a [`RemoteStore`] from configuration
pub trait Connector {
    fn connect(&self, config: &Config) -> Result<Box<dyn RemoteStore>>;
}

impl<F> Connector for F
where
    F: Fn(&Config) -> Result<Box<dyn RemoteStore>>,
{
    fn connect(&self, config: &Config) -> Result<Box<dyn RemoteStore>> {
        self(config)
    }
}
