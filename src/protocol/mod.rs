//! Protocol Module
//!
//! Defines the wire contract with the remote store (RESP2).
//!
//! ### Commands
//! - `GET key`
//! - `SET key value [NX]`
//! - `DEL key`
//! - `KEYS pattern`
//!
//! ### Replies
//! - string, integer, nil, array, error

mod codec;
mod command;
mod reply;

pub use codec::{
    encode_command, encode_reply, read_command, read_reply, write_command, write_reply,
    MAX_ARRAY_LEN, MAX_BULK_LEN,
};
pub use command::{Command, CommandType};
pub use reply::Reply;
