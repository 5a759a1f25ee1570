//! In-memory backend
//!
//! BTreeMap-based variable table with RwLock for interior mutability.
//! Clones share the same table.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::keys::validate_name;

use super::RealBackend;

/// Variable table held in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryEnv {
    vars: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryEnv {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table pre-populated with `vars`
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: Arc::new(RwLock::new(table)),
        }
    }

    /// Number of variables held
    pub fn len(&self) -> usize {
        self.vars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.read().is_empty()
    }
}

impl RealBackend for MemoryEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.read().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str, overwrite: bool) -> Result<()> {
        validate_name(name)?;
        let mut vars = self.vars.write();
        if overwrite || !vars.contains_key(name) {
            vars.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn unset(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.vars.write().remove(name);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.vars.write().clear();
        Ok(())
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
