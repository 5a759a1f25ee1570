//! Process environment backend
//!
//! Backs the variable table with the real process environment.

use std::env;

use crate::error::{EnvSyncError, Result};
use crate::keys::validate_name;

use super::RealBackend;

/// The host process's own environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        Self
    }
}

impl RealBackend for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        if validate_name(name).is_err() {
            return None;
        }
        env::var(name).ok()
    }

    fn set(&self, name: &str, value: &str, overwrite: bool) -> Result<()> {
        validate_name(name)?;
        if value.contains('\0') {
            return Err(EnvSyncError::InvalidValue(name.to_string()));
        }
        if !overwrite && env::var_os(name).is_some() {
            return Ok(());
        }
        env::set_var(name, value);
        Ok(())
    }

    fn unset(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        env::remove_var(name);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        for (name, _) in env::vars_os() {
            env::remove_var(name);
        }
        Ok(())
    }

    fn vars(&self) -> Vec<(String, String)> {
        // Entries that are not valid UTF-8 are invisible to this API
        env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}
