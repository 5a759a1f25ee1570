//! Backend Module
//!
//! The unshadowed variable table that every intercepted operation ends up
//! delegating to.
//!
//! ## Responsibilities
//! - Conventional get/set/unset/clear semantics on a local variable table
//! - Never talks to the remote store
//! - Declare which operations it provides so attach can resolve them once

mod memory;
mod process;
mod resolver;

pub use memory::MemoryEnv;
pub use process::ProcessEnv;
pub use resolver::{ResolvedBackend, Symbol, SymbolResolver};

use crate::error::Result;

/// The conventional, unshadowed configuration-variable operations.
///
/// All methods take `&self`; implementations provide their own interior
/// mutability. Mutating calls fail only for names that are empty or contain
/// `=`.
pub trait RealBackend {
    /// Look up a variable
    fn get(&self, name: &str) -> Option<String>;

    /// Look up a variable for privileged callers
    fn secure_get(&self, name: &str) -> Option<String> {
        self.get(name)
    }

    /// Set a variable; an existing value is kept when `overwrite` is false
    fn set(&self, name: &str, value: &str, overwrite: bool) -> Result<()>;

    /// Remove a variable (absent names are not an error)
    fn unset(&self, name: &str) -> Result<()>;

    /// Remove every variable
    fn clear(&self) -> Result<()>;

    /// List every variable currently held
    fn vars(&self) -> Vec<(String, String)>;

    /// Whether this backend provides `symbol`
    fn provides(&self, _symbol: Symbol) -> bool {
        true
    }
}
