//! Reply definitions
//!
//! The structured result of one remote command.

use bytes::Bytes;

/// A reply from the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Status or bulk string
    Str(Bytes),

    /// Integer reply
    Integer(i64),

    /// Null bulk string or null array
    Nil,

    /// Array of nested replies
    Array(Vec<Reply>),

    /// Error reply carrying the server's message
    Error(String),
}

impl Reply {
    /// The `OK` status reply
    pub fn ok() -> Self {
        Reply::Str(Bytes::from_static(b"OK"))
    }

    /// A string reply holding `value`
    pub fn str(value: impl Into<Bytes>) -> Self {
        Reply::Str(value.into())
    }

    /// Short type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Reply::Str(_) => "string",
            Reply::Integer(_) => "integer",
            Reply::Nil => "nil",
            Reply::Array(_) => "array",
            Reply::Error(_) => "error",
        }
    }
}
