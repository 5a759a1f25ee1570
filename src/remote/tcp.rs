//! TCP remote store
//!
//! Blocking RESP2 client over a single TCP stream.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{EnvSyncError, Result};
use crate::protocol::{read_reply, write_command, Command, Reply};

use super::{Connector, RemoteStore};

/// A single connection to a RESP2 server
pub struct TcpRemote {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Set once an exchange fails; the stream position is unknown after that
    broken: bool,
}

impl TcpRemote {
    /// Connect to the server described by `config`
    pub fn connect(config: &Config) -> Result<Self> {
        let stream = match config.connect_timeout {
            None => TcpStream::connect((config.host.as_str(), config.port)),
            Some(timeout) => {
                let addr = (config.host.as_str(), config.port)
                    .to_socket_addrs()?
                    .next()
                    .ok_or_else(|| {
                        EnvSyncError::Connect(format!("{} did not resolve", config.host))
                    })?;
                TcpStream::connect_timeout(&addr, timeout)
            }
        }
        .map_err(|e| EnvSyncError::Connect(format!("{}: {}", config.addr(), e)))?;

        Self::from_stream(stream, config)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| config.addr());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            peer_addr,
            broken: false,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn exchange(&mut self, command: &Command) -> Result<Reply> {
        write_command(&mut self.writer, command)?;
        read_reply(&mut self.reader)
    }
}

impl RemoteStore for TcpRemote {
    /// Send `command` and read its reply.
    ///
    /// Any failure leaves unread bytes of unknown length on the stream, so
    /// the connection is abandoned and every later command fails without
    /// touching it.
    fn execute(&mut self, command: &Command) -> Result<Reply> {
        if self.broken {
            return Err(EnvSyncError::Connect(format!(
                "connection to {} abandoned after an earlier failure",
                self.peer_addr
            )));
        }

        tracing::trace!("-> {}: {}", self.peer_addr, command);
        match self.exchange(command) {
            Ok(reply) => {
                tracing::trace!("<- {}: {}", self.peer_addr, reply.type_name());
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!("Abandoning connection to {}: {}", self.peer_addr, e);
                self.broken = true;
                self.close();
                Err(e)
            }
        }
    }

    fn close(&mut self) {
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            tracing::debug!("shutdown of {} failed: {}", self.peer_addr, e);
        }
    }
}

/// Connects over TCP
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(&self, config: &Config) -> Result<Box<dyn RemoteStore>> {
        Ok(Box::new(TcpRemote::connect(config)?))
    }
}
