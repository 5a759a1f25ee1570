//! Key helpers
//!
//! Conversions between bare names and wire keys. Every wire key is
//! `prefix + name`; the prefix is passed in by the caller on each use.

use crate::error::{EnvSyncError, Result};

/// Build the wire key for `name` under `prefix`
pub fn wire_key(prefix: &str, name: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + name.len());
    key.push_str(prefix);
    key.push_str(name);
    key
}

/// Strip `prefix` from a wire key returned by `KEYS`.
///
/// Returns `None` when the key is not inside the namespace.
pub fn strip_namespace<'a>(prefix: &str, wire_key: &'a str) -> Option<&'a str> {
    wire_key.strip_prefix(prefix)
}

/// Pattern matching every key under `prefix`.
///
/// Glob metacharacters in the prefix are escaped so the namespace is literal.
pub fn keys_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

/// Split `NAME=value` at the first `=`.
///
/// A missing `=` yields an empty value.
pub fn split_assignment(assignment: &str) -> (&str, &str) {
    assignment.split_once('=').unwrap_or((assignment, ""))
}

/// Reject names the conventional API refuses (empty, or containing `=` or NUL)
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(EnvSyncError::InvalidName(name.to_string()));
    }
    Ok(())
}
