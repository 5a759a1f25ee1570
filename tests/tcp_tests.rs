//! TCP Remote Tests
//!
//! Runs the shim against a fake RESP2 server on a loopback socket.

mod common;

use std::io::{BufReader, BufWriter, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use common::terminate;
use envsync::config::{Config, HOST_VAR, PANIC_VAR, PORT_VAR, PREFIX_VAR};
use envsync::protocol::{read_command, write_reply, Command};
use envsync::remote::{ConnectionState, RemoteStore, TcpRemote};
use envsync::{EnvShim, MemoryEnv, MemoryStore, PanicPolicy, RealBackend, TcpConnector};

/// Serve one client from `store`, answering at most `limit` commands
fn spawn_server(store: MemoryStore, limit: usize) -> (u16, Arc<Mutex<Vec<Command>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut writer = BufWriter::new(stream);
        for _ in 0..limit {
            let Ok(command) = read_command(&mut reader) else {
                return;
            };
            let reply = store.apply(&command);
            log.lock().push(command);
            if write_reply(&mut writer, &reply).is_err() {
                return;
            }
        }
    });

    (port, seen)
}

/// Answer each command in turn with the next raw chunk of bytes
fn spawn_raw_server(replies: Vec<&'static [u8]>) -> (u16, Arc<Mutex<Vec<Command>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut writer = BufWriter::new(stream);
        for raw in replies {
            let Ok(command) = read_command(&mut reader) else {
                return;
            };
            log.lock().push(command);
            if writer.write_all(raw).and_then(|_| writer.flush()).is_err() {
                return;
            }
        }
    });

    (port, seen)
}

fn env_for(port: u16) -> MemoryEnv {
    MemoryEnv::with_vars([
        (HOST_VAR, "127.0.0.1".to_string()),
        (PORT_VAR, port.to_string()),
        (PREFIX_VAR, "t:".to_string()),
    ])
}

fn attach_tcp(env: &MemoryEnv) -> EnvShim<MemoryEnv> {
    EnvShim::attach_with(env.clone(), &TcpConnector, PanicPolicy::with_terminator(terminate))
        .unwrap()
}

#[test]
fn test_tcp_round_trip() {
    let store = MemoryStore::new();
    store.insert("t:PRELOADED", "yes");
    let (port, seen) = spawn_server(store.clone(), usize::MAX);
    let env = env_for(port);

    let mut shim = attach_tcp(&env);
    assert_eq!(shim.connection_state(), ConnectionState::Connected);
    assert_eq!(env.get("PRELOADED"), Some("yes".to_string()));

    shim.set("NEW", "value", false).unwrap();
    assert_eq!(shim.get("NEW"), Some("value".to_string()));
    shim.unset("PRELOADED").unwrap();
    shim.detach();

    assert_eq!(store.value("t:NEW").as_deref(), Some(&b"value"[..]));
    assert_eq!(store.value("t:PRELOADED"), None);

    let commands = seen.lock().clone();
    assert_eq!(
        commands,
        vec![
            Command::Keys {
                pattern: "t:*".to_string()
            },
            Command::Get {
                key: "t:PRELOADED".to_string()
            },
            Command::Set {
                key: "t:NEW".to_string(),
                value: "value".to_string(),
                only_if_absent: true,
            },
            Command::Get {
                key: "t:NEW".to_string()
            },
            Command::Del {
                key: "t:PRELOADED".to_string()
            },
        ]
    );
}

#[test]
fn test_tcp_refused_connection_degrades() {
    // Grab a free port, then close it so nothing listens there
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let env = env_for(port);

    let mut shim = attach_tcp(&env);

    assert_eq!(shim.connection_state(), ConnectionState::Failed);
    shim.set("LOCAL", "only", true).unwrap();
    assert_eq!(shim.get("LOCAL"), Some("only".to_string()));
}

#[test]
fn test_tcp_server_hangup_keeps_local_result() {
    // Server answers the attach-time KEYS, then hangs up
    let (port, _) = spawn_server(MemoryStore::new(), 1);
    let env = env_for(port);
    let mut shim = attach_tcp(&env);

    shim.set("AFTER", "hangup", true).unwrap();

    assert_eq!(shim.get("AFTER"), Some("hangup".to_string()));
}

#[test]
fn test_tcp_remote_reads_error_reply() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut writer = BufWriter::new(stream);
        let _ = read_command(&mut reader);
        let _ = write_reply(
            &mut writer,
            &envsync::protocol::Reply::Error("WRONGTYPE bad".to_string()),
        );
    });

    let config = Config::builder()
        .port(port)
        .read_timeout(Duration::from_secs(5))
        .build();
    let mut remote = TcpRemote::connect(&config).unwrap();
    let stream_peer = remote.peer_addr().to_string();
    let reply = remote
        .execute(&Command::Get {
            key: "x".to_string(),
        })
        .unwrap();

    assert_eq!(
        reply,
        envsync::protocol::Reply::Error("WRONGTYPE bad".to_string())
    );
    assert!(stream_peer.ends_with(&port.to_string()));
}

#[test]
fn test_tcp_malformed_reply_abandons_connection() {
    // The reply to GET A is garbage followed by a well-formed bulk string
    // that must never be taken as the reply to GET B
    let (port, seen) = spawn_raw_server(vec![
        b"*0\r\n",
        b"?bad\r\n$5\r\nSTALE\r\n",
        b"$-1\r\n",
    ]);
    let env = env_for(port);
    env.set("B", "local", true).unwrap();
    let mut shim = attach_tcp(&env);

    assert_eq!(shim.get("A"), None);
    assert_eq!(shim.get("B"), Some("local".to_string()));
    shim.set("C", "after", true).unwrap();

    assert_eq!(env.get("C"), Some("after".to_string()));
    assert_eq!(
        seen.lock().clone(),
        vec![
            Command::Keys {
                pattern: "t:*".to_string()
            },
            Command::Get {
                key: "t:A".to_string()
            },
        ]
    );
}

#[test]
#[should_panic(expected = "terminated with status 33")]
fn test_tcp_abandoned_connection_counts_as_unreachable() {
    let (port, _) = spawn_raw_server(vec![b"*0\r\n", b"?bad\r\n"]);
    let env = env_for(port);
    let mut shim = attach_tcp(&env);
    shim.get("A");

    env.set(PANIC_VAR, "1", true).unwrap();
    shim.get("B");
}
