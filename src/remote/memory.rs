//! In-memory remote store
//!
//! Implements the four commands over a shared BTreeMap. Clones share the
//! same keyspace, so several shims can observe each other's writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::Result;
use crate::protocol::{Command, Reply};

use super::RemoteStore;

/// Keyspace held in process memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<BTreeMap<String, Bytes>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key` directly
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.data.lock().insert(key.into(), value.into());
    }

    /// Read `key` directly
    pub fn value(&self, key: &str) -> Option<Bytes> {
        self.data.lock().get(key).cloned()
    }

    /// All keys matching a glob pattern, sorted
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        self.data
            .lock()
            .keys()
            .filter(|k| glob_match(pattern.as_bytes(), k.as_bytes()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Apply one command to the keyspace
    pub fn apply(&self, command: &Command) -> Reply {
        let mut data = self.data.lock();
        match command {
            Command::Get { key } => match data.get(key) {
                Some(value) => Reply::Str(value.clone()),
                None => Reply::Nil,
            },
            Command::Set {
                key,
                value,
                only_if_absent,
            } => {
                if *only_if_absent && data.contains_key(key) {
                    return Reply::Nil;
                }
                data.insert(key.clone(), Bytes::from(value.clone()));
                Reply::ok()
            }
            Command::Del { key } => Reply::Integer(i64::from(data.remove(key).is_some())),
            Command::Keys { pattern } => Reply::Array(
                data.keys()
                    .filter(|k| glob_match(pattern.as_bytes(), k.as_bytes()))
                    .map(|k| Reply::str(k.clone()))
                    .collect(),
            ),
        }
    }
}

impl RemoteStore for MemoryStore {
    fn execute(&mut self, command: &Command) -> Result<Reply> {
        Ok(self.apply(command))
    }
}

/// Glob matching with `*`, `?`, `[...]` classes and `\` escapes
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((&b'*', rest)) => (0..=text.len()).any(|skip| glob_match(rest, &text[skip..])),
        Some((&b'?', rest)) => !text.is_empty() && glob_match(rest, &text[1..]),
        Some((&b'[', rest)) => {
            let Some((&c, text_rest)) = text.split_first() else {
                return false;
            };
            match match_class(rest, c) {
                Some((true, after)) => glob_match(after, text_rest),
                Some((false, _)) => false,
                // Unterminated class: treat '[' literally
                None => c == b'[' && glob_match(rest, text_rest),
            }
        }
        Some((&b'\\', rest)) if !rest.is_empty() => {
            text.first() == Some(&rest[0]) && glob_match(&rest[1..], &text[1..])
        }
        Some((&p, rest)) => text.first() == Some(&p) && glob_match(rest, &text[1..]),
    }
}

/// Match `c` against a class body; returns (matched, pattern after `]`)
fn match_class(class: &[u8], c: u8) -> Option<(bool, &[u8])> {
    let (negate, mut idx) = match class.first() {
        Some(&b'^') => (true, 1),
        _ => (false, 0),
    };
    let mut matched = false;
    while idx < class.len() {
        match class[idx] {
            b']' => return Some((matched != negate, &class[idx + 1..])),
            b'\\' if idx + 1 < class.len() => {
                matched |= class[idx + 1] == c;
                idx += 2;
            }
            lo if idx + 2 < class.len() && class[idx + 1] == b'-' && class[idx + 2] != b']' => {
                let hi = class[idx + 2];
                matched |= (lo.min(hi)..=lo.max(hi)).contains(&c);
                idx += 3;
            }
            other => {
                matched |= other == c;
                idx += 1;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_star_and_question() {
        assert!(glob_match(b"app:*", b"app:HOME"));
        assert!(glob_match(b"app:*", b"app:"));
        assert!(!glob_match(b"app:*", b"ap"));
        assert!(glob_match(b"h?llo", b"hello"));
        assert!(!glob_match(b"h?llo", b"hllo"));
    }

    #[test]
    fn glob_classes() {
        assert!(glob_match(b"h[ae]llo", b"hallo"));
        assert!(!glob_match(b"h[^e]llo", b"hello"));
        assert!(glob_match(b"[a-c]x", b"bx"));
    }

    #[test]
    fn glob_escapes_are_literal() {
        assert!(glob_match(b"a\\*b*", b"a*bcd"));
        assert!(!glob_match(b"a\\*b*", b"axbcd"));
    }

    #[test]
    fn set_nx_keeps_existing() {
        let store = MemoryStore::new();
        let set = |v: &str| Command::Set {
            key: "K".to_string(),
            value: v.to_string(),
            only_if_absent: true,
        };
        assert_eq!(store.apply(&set("v1")), Reply::ok());
        assert_eq!(store.apply(&set("v2")), Reply::Nil);
        assert_eq!(store.value("K"), Some(Bytes::from("v1")));
    }

    #[test]
    fn del_reports_count() {
        let store = MemoryStore::new();
        store.insert("K", "v");
        let del = Command::Del {
            key: "K".to_string(),
        };
        assert_eq!(store.apply(&del), Reply::Integer(1));
        assert_eq!(store.apply(&del), Reply::Integer(0));
    }
}
