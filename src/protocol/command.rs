//! Command definitions
//!
//! The four command shapes sent to the remote store.

use std::fmt;

use crate::error::{EnvSyncError, Result};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Set,
    Del,
    Keys,
}

impl CommandType {
    /// Name as it appears on the wire
    pub fn name(self) -> &'static str {
        match self {
            CommandType::Get => "GET",
            CommandType::Set => "SET",
            CommandType::Del => "DEL",
            CommandType::Keys => "KEYS",
        }
    }
}

/// A command addressed to the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read a key
    Get { key: String },

    /// Write a key, optionally only when it does not exist yet (`NX`)
    Set {
        key: String,
        value: String,
        only_if_absent: bool,
    },

    /// Delete a key
    Del { key: String },

    /// List keys matching a glob pattern
    Keys { pattern: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Del { .. } => CommandType::Del,
            Command::Keys { .. } => CommandType::Keys,
        }
    }

    /// The key (or pattern) this command addresses
    pub fn target(&self) -> &str {
        match self {
            Command::Get { key } | Command::Set { key, .. } | Command::Del { key } => key,
            Command::Keys { pattern } => pattern,
        }
    }

    /// Arguments in wire order, command name first
    pub fn args(&self) -> Vec<&[u8]> {
        let name = self.command_type().name().as_bytes();
        match self {
            Command::Get { key } | Command::Del { key } => vec![name, key.as_bytes()],
            Command::Set {
                key,
                value,
                only_if_absent,
            } => {
                let mut args = vec![name, key.as_bytes(), value.as_bytes()];
                if *only_if_absent {
                    args.push(b"NX");
                }
                args
            }
            Command::Keys { pattern } => vec![name, pattern.as_bytes()],
        }
    }

    /// Parse decoded arguments back into a command
    pub fn from_args(args: &[Vec<u8>]) -> Result<Self> {
        let text = |idx: usize| -> Result<String> {
            let raw = args
                .get(idx)
                .ok_or_else(|| EnvSyncError::Framing(format!("missing argument {}", idx)))?;
            String::from_utf8(raw.clone())
                .map_err(|_| EnvSyncError::Framing(format!("argument {} is not UTF-8", idx)))
        };

        let name = text(0)?.to_ascii_uppercase();
        let command = match (name.as_str(), args.len()) {
            ("GET", 2) => Command::Get { key: text(1)? },
            ("DEL", 2) => Command::Del { key: text(1)? },
            ("KEYS", 2) => Command::Keys { pattern: text(1)? },
            ("SET", 3) => Command::Set {
                key: text(1)?,
                value: text(2)?,
                only_if_absent: false,
            },
            ("SET", 4) if text(3)?.eq_ignore_ascii_case("NX") => Command::Set {
                key: text(1)?,
                value: text(2)?,
                only_if_absent: true,
            },
            _ => {
                return Err(EnvSyncError::Framing(format!(
                    "unknown command {} with {} arguments",
                    name,
                    args.len()
                )))
            }
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values are left out of log lines
        match self {
            Command::Set {
                key,
                only_if_absent: true,
                ..
            } => write!(f, "SET {} NX", key),
            _ => write!(f, "{} {}", self.command_type().name(), self.target()),
        }
    }
}
