//! Protocol codec
//!
//! RESP2 encoding and decoding for commands and replies.
//!
//! ## Wire Format
//!
//! ### Command
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<arg>\r\n      (repeated argc times)
//! ```
//!
//! ### Reply (first byte selects the type)
//! ```text
//! +<text>\r\n              status      -> Reply::Str
//! -<message>\r\n           error       -> Reply::Error
//! :<i64>\r\n               integer     -> Reply::Integer
//! $<len>\r\n<data>\r\n     bulk        -> Reply::Str   ($-1 -> Reply::Nil)
//! *<n>\r\n<reply>...       array       -> Reply::Array (*-1 -> Reply::Nil)
//! ```

use std::io::{self, BufRead, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, Reply};
use crate::error::{EnvSyncError, Result};

const CRLF: &[u8] = b"\r\n";

/// Maximum bulk string length accepted (512 MB, same as Redis)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Maximum number of elements accepted in one array
pub const MAX_ARRAY_LEN: usize = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command as a RESP2 array of bulk strings
pub fn encode_command(command: &Command, out: &mut BytesMut) {
    let args = command.args();
    out.put_u8(b'*');
    put_len(out, args.len());
    for arg in args {
        out.put_u8(b'$');
        put_len(out, arg.len());
        out.put_slice(arg);
        out.put_slice(CRLF);
    }
}

/// Read one command from a stream (server side)
pub fn read_command<R: BufRead>(reader: &mut R) -> Result<Command> {
    let line = read_line(reader)?;
    if line.first() != Some(&b'*') {
        return Err(EnvSyncError::Framing("command is not an array".to_string()));
    }
    let count = parse_len(&line[1..])?
        .ok_or_else(|| EnvSyncError::Framing("null command array".to_string()))?;

    let mut args = Vec::with_capacity(count.min(8));
    for _ in 0..count {
        let line = read_line(reader)?;
        if line.first() != Some(&b'$') {
            return Err(EnvSyncError::Framing(
                "command argument is not a bulk string".to_string(),
            ));
        }
        let len = parse_len(&line[1..])?
            .ok_or_else(|| EnvSyncError::Framing("null command argument".to_string()))?;
        args.push(read_bulk(reader, len)?.to_vec());
    }

    Command::from_args(&args)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let mut buf = BytesMut::new();
    encode_command(command, &mut buf);
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode a reply (server side)
pub fn encode_reply(reply: &Reply, out: &mut BytesMut) {
    match reply {
        Reply::Str(data) => {
            out.put_u8(b'$');
            put_len(out, data.len());
            out.put_slice(data);
            out.put_slice(CRLF);
        }
        Reply::Integer(value) => {
            out.put_u8(b':');
            out.put_slice(value.to_string().as_bytes());
            out.put_slice(CRLF);
        }
        Reply::Nil => out.put_slice(b"$-1\r\n"),
        Reply::Array(items) => {
            out.put_u8(b'*');
            put_len(out, items.len());
            for item in items {
                encode_reply(item, out);
            }
        }
        Reply::Error(message) => {
            out.put_u8(b'-');
            out.put_slice(message.replace(['\r', '\n'], " ").as_bytes());
            out.put_slice(CRLF);
        }
    }
}

/// Read one reply from a stream
///
/// Blocks until a complete reply is received or an error occurs
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let line = read_line(reader)?;
    let (&kind, rest) = line
        .split_first()
        .ok_or_else(|| EnvSyncError::Framing("empty reply line".to_string()))?;

    match kind {
        b'+' => Ok(Reply::Str(Bytes::copy_from_slice(rest))),
        b'-' => Ok(Reply::Error(String::from_utf8_lossy(rest).into_owned())),
        b':' => Ok(Reply::Integer(parse_i64(rest)?)),
        b'$' => match parse_len(rest)? {
            None => Ok(Reply::Nil),
            Some(len) => Ok(Reply::Str(read_bulk(reader, len)?)),
        },
        b'*' => match parse_len(rest)? {
            None => Ok(Reply::Nil),
            Some(count) => {
                if count > MAX_ARRAY_LEN {
                    return Err(EnvSyncError::Framing(format!(
                        "array too large: {} elements (max {})",
                        count, MAX_ARRAY_LEN
                    )));
                }
                let mut items = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    items.push(read_reply(reader)?);
                }
                Ok(Reply::Array(items))
            }
        },
        other => Err(EnvSyncError::Framing(format!(
            "unknown reply type byte: 0x{:02x}",
            other
        ))),
    }
}

/// Write a reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> Result<()> {
    let mut buf = BytesMut::new();
    encode_reply(reply, &mut buf);
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn put_len(out: &mut BytesMut, len: usize) {
    out.put_slice(len.to_string().as_bytes());
    out.put_slice(CRLF);
}

/// Read a CRLF-terminated line, without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed").into());
    }
    if !line.ends_with(CRLF) {
        return Err(EnvSyncError::Framing("line not terminated by CRLF".to_string()));
    }
    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

fn read_bulk<R: BufRead>(reader: &mut R, len: usize) -> Result<Bytes> {
    if len > MAX_BULK_LEN {
        return Err(EnvSyncError::Framing(format!(
            "bulk string too large: {} bytes (max {})",
            len, MAX_BULK_LEN
        )));
    }
    let mut data = vec![0u8; len + CRLF.len()];
    reader.read_exact(&mut data)?;
    if !data.ends_with(CRLF) {
        return Err(EnvSyncError::Framing("bulk string not terminated by CRLF".to_string()));
    }
    data.truncate(len);
    Ok(Bytes::from(data))
}

fn parse_i64(data: &[u8]) -> Result<i64> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            EnvSyncError::Framing(format!("invalid integer: {:?}", String::from_utf8_lossy(data)))
        })
}

/// Parse a length header; negative lengths mean null
fn parse_len(data: &[u8]) -> Result<Option<usize>> {
    let value = parse_i64(data)?;
    if value < 0 {
        return Ok(None);
    }
    usize::try_from(value)
        .map(Some)
        .map_err(|_| EnvSyncError::Framing(format!("length out of range: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(raw: &[u8]) -> Result<Reply> {
        read_reply(&mut Cursor::new(raw.to_vec()))
    }

    #[test]
    fn encodes_set_nx() {
        let mut buf = BytesMut::new();
        let cmd = Command::Set {
            key: "p:K".to_string(),
            value: "v".to_string(),
            only_if_absent: true,
        };
        encode_command(&cmd, &mut buf);
        assert_eq!(
            &buf[..],
            b"*4\r\n$3\r\nSET\r\n$3\r\np:K\r\n$1\r\nv\r\n$2\r\nNX\r\n"
        );
    }

    #[test]
    fn encodes_empty_value() {
        let mut buf = BytesMut::new();
        let cmd = Command::Set {
            key: "K".to_string(),
            value: String::new(),
            only_if_absent: false,
        };
        encode_command(&cmd, &mut buf);
        assert_eq!(&buf[..], b"*3\r\n$3\r\nSET\r\n$1\r\nK\r\n$0\r\n\r\n");
    }

    #[test]
    fn parses_status_as_string() {
        assert_eq!(parse(b"+OK\r\n").unwrap(), Reply::ok());
    }

    #[test]
    fn parses_bulk_string() {
        assert_eq!(parse(b"$5\r\nhello\r\n").unwrap(), Reply::str("hello"));
    }

    #[test]
    fn parses_bulk_with_embedded_crlf() {
        assert_eq!(parse(b"$4\r\na\r\nb\r\n").unwrap(), Reply::str("a\r\nb"));
    }

    #[test]
    fn parses_null_bulk_and_null_array() {
        assert_eq!(parse(b"$-1\r\n").unwrap(), Reply::Nil);
        assert_eq!(parse(b"*-1\r\n").unwrap(), Reply::Nil);
    }

    #[test]
    fn parses_negative_integer() {
        assert_eq!(parse(b":-42\r\n").unwrap(), Reply::Integer(-42));
    }

    #[test]
    fn parses_error() {
        assert_eq!(
            parse(b"-ERR wrong type\r\n").unwrap(),
            Reply::Error("ERR wrong type".to_string())
        );
    }

    #[test]
    fn parses_nested_array() {
        let reply = parse(b"*2\r\n$1\r\na\r\n*1\r\n:1\r\n").unwrap();
        assert_eq!(
            reply,
            Reply::Array(vec![Reply::str("a"), Reply::Array(vec![Reply::Integer(1)])])
        );
    }

    #[test]
    fn eof_is_io_error() {
        assert!(matches!(parse(b""), Err(EnvSyncError::Io(_))));
    }

    #[test]
    fn truncated_bulk_is_io_error() {
        assert!(matches!(parse(b"$10\r\nabc"), Err(EnvSyncError::Io(_))));
    }

    #[test]
    fn rejects_missing_crlf() {
        assert!(matches!(parse(b"+OK\n"), Err(EnvSyncError::Framing(_))));
    }

    #[test]
    fn rejects_unknown_type_byte() {
        assert!(matches!(parse(b"?x\r\n"), Err(EnvSyncError::Framing(_))));
    }

    #[test]
    fn reads_encoded_command_back() {
        let cmd = Command::Keys {
            pattern: "app:*".to_string(),
        };
        let mut buf = BytesMut::new();
        encode_command(&cmd, &mut buf);
        let decoded = read_command(&mut Cursor::new(buf.to_vec())).unwrap();
        assert_eq!(decoded, cmd);
    }
}
