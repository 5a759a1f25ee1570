//! Symbol Resolver
//!
//! Binds the six backend operations exactly once, before any connection is
//! attempted. A backend missing any of them aborts attach.

use std::fmt;

use crate::error::{EnvSyncError, Result};

use super::RealBackend;

/// The operations a backend must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    ClearEnv,
    UnsetEnv,
    SetEnv,
    PutEnv,
    GetEnv,
    SecureGetEnv,
}

impl Symbol {
    /// All symbols, in resolution order
    pub const ALL: [Symbol; 6] = [
        Symbol::ClearEnv,
        Symbol::UnsetEnv,
        Symbol::SetEnv,
        Symbol::PutEnv,
        Symbol::GetEnv,
        Symbol::SecureGetEnv,
    ];

    /// Conventional name of the operation
    pub fn name(self) -> &'static str {
        match self {
            Symbol::ClearEnv => "clearenv",
            Symbol::UnsetEnv => "unsetenv",
            Symbol::SetEnv => "setenv",
            Symbol::PutEnv => "putenv",
            Symbol::GetEnv => "getenv",
            Symbol::SecureGetEnv => "secure_getenv",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves a backend into a [`ResolvedBackend`]
pub struct SymbolResolver;

impl SymbolResolver {
    /// Check every symbol once; the first missing one is fatal
    pub fn resolve<B: RealBackend>(backend: B) -> Result<ResolvedBackend<B>> {
        for symbol in Symbol::ALL {
            if !backend.provides(symbol) {
                tracing::error!("backend does not provide `{}`", symbol);
                return Err(EnvSyncError::Resolution { symbol });
            }
            tracing::trace!("resolved `{}`", symbol);
        }
        Ok(ResolvedBackend { backend })
    }
}

/// A backend whose operations have all been resolved.
///
/// Immutable after construction; the only way to get one is through
/// [`SymbolResolver::resolve`].
#[derive(Debug)]
pub struct ResolvedBackend<B> {
    backend: B,
}

impl<B: RealBackend> ResolvedBackend<B> {
    /// The underlying backend
    pub fn inner(&self) -> &B {
        &self.backend
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.backend.get(name)
    }

    pub fn secure_get(&self, name: &str) -> Option<String> {
        self.backend.secure_get(name)
    }

    pub fn set(&self, name: &str, value: &str, overwrite: bool) -> Result<()> {
        self.backend.set(name, value, overwrite)
    }

    pub fn unset(&self, name: &str) -> Result<()> {
        self.backend.unset(name)
    }

    pub fn clear(&self) -> Result<()> {
        self.backend.clear()
    }
}
