//! Command Translator
//!
//! Maps each intercepted operation to a remote command, interprets the
//! reply, and applies the side effects to the real backend.
//!
//! ## Rules
//! - The wire key is `prefix + name`, with the prefix read fresh per call
//! - Every remote outcome goes through the [`PanicPolicy`]
//! - The backend is always called last, and its answer is the result
//! - With no connection every operation is a pure pass-through

use crate::backend::{RealBackend, ResolvedBackend};
use crate::config::ConfigReader;
use crate::error::{EnvSyncError, Result};
use crate::keys::{keys_pattern, split_assignment, strip_namespace, validate_name, wire_key};
use crate::policy::PanicPolicy;
use crate::protocol::{Command, Reply};
use crate::remote::{ConnectionManager, ConnectionState};

/// Translates variable operations into remote commands
pub struct CommandTranslator<B> {
    /// The only holder of the real backend
    backend: ResolvedBackend<B>,

    /// Remote handle (may be absent)
    connection: ConnectionManager,

    policy: PanicPolicy,
}

impl<B: RealBackend> CommandTranslator<B> {
    pub fn new(
        backend: ResolvedBackend<B>,
        connection: ConnectionManager,
        policy: PanicPolicy,
    ) -> Self {
        Self {
            backend,
            connection,
            policy,
        }
    }

    // =========================================================================
    // Intercepted Operations
    // =========================================================================

    /// Get a variable.
    ///
    /// The remote value only pre-seeds the backend; the return value is
    /// whatever the backend holds afterwards.
    pub fn get(&mut self, name: &str) -> Option<String> {
        let prefix = self.prefix();
        self.get_in(&prefix, name)
    }

    /// Set a variable remotely (with `NX` when `overwrite` is false) and locally.
    ///
    /// An invalid name is rejected with [`EnvSyncError::InvalidName`] before
    /// any remote command, so the store never receives a key that the
    /// backend would refuse.
    pub fn set(&mut self, name: &str, value: &str, overwrite: bool) -> Result<()> {
        validate_name(name)?;
        if self.connection.is_connected() {
            let key = wire_key(&self.prefix(), name);
            self.dispatch(Command::Set {
                key,
                value: value.to_string(),
                only_if_absent: !overwrite,
            });
        }
        self.backend.set(name, value, overwrite)
    }

    /// Delete a variable remotely and locally
    pub fn unset(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        let prefix = self.prefix();
        self.unset_in(&prefix, name)
    }

    /// Delete every variable in the current namespace, then clear the backend
    pub fn clear_all(&mut self) -> Result<()> {
        if self.connection.is_connected() {
            let prefix = self.prefix();
            for name in self.list_namespace(&prefix) {
                if let Err(e) = self.unset_in(&prefix, &name) {
                    tracing::debug!("Skipping local unset of {:?}: {}", name, e);
                }
            }
        }
        self.backend.clear()
    }

    /// Set from a `NAME=value` string; a missing `=` means an empty value
    pub fn put_env(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = split_assignment(assignment);
        self.set(name, value, true)
    }

    /// Privileged lookup, never synchronized
    pub fn secure_get(&self, name: &str) -> Option<String> {
        self.backend.secure_get(name)
    }

    // =========================================================================
    // Namespace Helpers
    // =========================================================================

    /// Bare names of every remote key under `prefix`.
    ///
    /// Keys are returned with the prefix stripped, ready to be passed back
    /// into operations that re-apply it.
    pub fn list_namespace(&mut self, prefix: &str) -> Vec<String> {
        let Some(reply) = self.dispatch(Command::Keys {
            pattern: keys_pattern(prefix),
        }) else {
            return Vec::new();
        };

        let items = match reply {
            Reply::Array(items) => items,
            other => {
                let err = EnvSyncError::UnsupportedReply(format!(
                    "{} for KEYS {}*",
                    other.type_name(),
                    prefix
                ));
                tracing::warn!("{}", err);
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| {
                let raw = match item {
                    Reply::Str(raw) => raw,
                    other => {
                        tracing::warn!("Unsupported key entry of type {}", other.type_name());
                        return None;
                    }
                };
                let Ok(key) = std::str::from_utf8(&raw) else {
                    tracing::warn!("Skipping non UTF-8 key under {}", prefix);
                    return None;
                };
                match strip_namespace(prefix, key) {
                    Some(name) => Some(name.to_string()),
                    None => {
                        tracing::warn!("Key {} is outside namespace {:?}", key, prefix);
                        None
                    }
                }
            })
            .collect()
    }

    /// `get` against an explicit prefix
    pub(crate) fn get_in(&mut self, prefix: &str, name: &str) -> Option<String> {
        if self.connection.is_connected() && validate_name(name).is_ok() {
            let key = wire_key(prefix, name);
            if let Some(reply) = self.dispatch(Command::Get { key }) {
                self.apply_reply(prefix, name, reply);
            }
        }
        self.backend.get(name)
    }

    /// `unset` against an explicit prefix
    fn unset_in(&mut self, prefix: &str, name: &str) -> Result<()> {
        if self.connection.is_connected() {
            self.dispatch(Command::Del {
                key: wire_key(prefix, name),
            });
        }
        self.backend.unset(name)
    }

    // =========================================================================
    // Remote Plumbing
    // =========================================================================

    /// Run one command and pass its outcome through the policy
    fn dispatch(&mut self, command: Command) -> Option<Reply> {
        let result = self.connection.execute(&command)?;
        let panic_enabled = self.config().panic_enabled();
        self.policy.review(&command, result, panic_enabled)
    }

    /// Seed the backend from a GET reply
    fn apply_reply(&self, prefix: &str, name: &str, reply: Reply) {
        let applied = match reply {
            Reply::Str(data) => match std::str::from_utf8(&data) {
                Ok(value) => self.backend.set(name, value, true),
                Err(_) => {
                    tracing::warn!("Value of {}{} is not UTF-8, left untouched", prefix, name);
                    Ok(())
                }
            },
            Reply::Integer(value) => self.backend.set(name, &value.to_string(), true),
            Reply::Nil => self.backend.unset(name),
            other => {
                let err = EnvSyncError::UnsupportedReply(format!(
                    "{} for key {}{}",
                    other.type_name(),
                    prefix,
                    name
                ));
                tracing::warn!("{}", err);
                Ok(())
            }
        };
        if let Err(e) = applied {
            tracing::debug!("Backend rejected update of {}: {}", name, e);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    fn config(&self) -> ConfigReader<'_, B> {
        ConfigReader::new(self.backend.inner())
    }

    /// Current namespace prefix
    pub fn prefix(&self) -> String {
        self.config().prefix()
    }

    pub fn backend(&self) -> &B {
        self.backend.inner()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Close the remote connection
    pub fn teardown(&mut self) {
        self.connection.teardown();
    }
}
