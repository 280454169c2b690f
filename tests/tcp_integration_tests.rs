//! Integration Tests for the TCP Server
//!
//! Drives a real listener over loopback and checks the full
//! request/reply cycle for each command.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use shard_cache::{serve, AppState, KvStore, ShardedStore};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

// == Helper Functions ==

async fn start_server(shard_count: usize, shard_capacity: usize) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store: Arc<dyn KvStore> = Arc::new(ShardedStore::new(shard_count, shard_capacity));
    let state = AppState::new(store, shard_capacity);
    let handle = tokio::spawn(serve(listener, state));
    (addr, handle)
}

struct Client {
    stream: BufReader<TcpStream>,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        Self {
            stream: BufReader::new(stream),
        }
    }

    async fn send(&mut self, bytes: &[u8]) {
        self.stream.get_mut().write_all(bytes).await.unwrap();
    }

    async fn line(&mut self) -> String {
        let mut line = String::new();
        self.stream.read_line(&mut line).await.unwrap();
        line
    }

    async fn set(&mut self, key: &str, value: &str) -> String {
        self.send(format!("SET {} {}\n{}\n", key, value.len(), value).as_bytes())
            .await;
        self.line().await
    }

    /// Returns the value for a hit or the error line for a miss.
    async fn get(&mut self, key: &str) -> Result<String, String> {
        self.send(format!("GET {}\n", key).as_bytes()).await;
        let header = self.line().await;
        let Some(len) = header.strip_prefix("VALUE ") else {
            return Err(header);
        };
        let len: usize = len.trim_end().parse().unwrap();
        let mut value = vec![0u8; len + 1];
        self.stream.read_exact(&mut value).await.unwrap();
        assert_eq!(value.pop(), Some(b'\n'));
        Ok(String::from_utf8(value).unwrap())
    }

    async fn stats(&mut self) -> Value {
        self.send(b"STATS\n").await;
        serde_json::from_str(&self.line().await).unwrap()
    }
}

// == SET / GET Tests ==

#[tokio::test]
async fn test_set_then_get() {
    let (addr, server) = start_server(4, 1024).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(client.set("user:1", "alice").await, "OK\n");
    assert_eq!(client.get("user:1").await, Ok("alice".to_string()));

    server.abort();
}

#[tokio::test]
async fn test_get_missing_key_returns_error() {
    let (addr, server) = start_server(4, 1024).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(
        client.get("ghost").await,
        Err("ERROR Key not found: ghost\n".to_string())
    );

    server.abort();
}

#[tokio::test]
async fn test_overwrite_replaces_value() {
    let (addr, server) = start_server(2, 1024).await;
    let mut client = Client::connect(addr).await;

    client.set("k", "first").await;
    client.set("k", "second!").await;
    assert_eq!(client.get("k").await, Ok("second!".to_string()));

    let stats = client.stats().await;
    assert_eq!(stats["entries"], 1);
    assert_eq!(stats["memory_used"], 7);

    server.abort();
}

#[tokio::test]
async fn test_size_mismatch_stores_nothing() {
    let (addr, server) = start_server(2, 1024).await;
    let mut client = Client::connect(addr).await;

    client.send(b"SET k 5\nabc\n").await;
    assert_eq!(
        client.line().await,
        "ERROR Size mismatch: declared 5 bytes, received 3\n"
    );
    assert_eq!(
        client.get("k").await,
        Err("ERROR Key not found: k\n".to_string())
    );

    server.abort();
}

#[tokio::test]
async fn test_value_larger_than_shard_is_rejected() {
    let (addr, server) = start_server(1, 10).await;
    let mut client = Client::connect(addr).await;

    assert_eq!(
        client.set("big", "0123456789A").await,
        "ERROR Value too large: 11 bytes exceeds shard capacity of 10 bytes\n"
    );
    // Connection stays usable
    assert_eq!(client.set("ok", "tiny").await, "OK\n");

    server.abort();
}

// == DELETE Tests ==

#[tokio::test]
async fn test_delete_is_silent() {
    let (addr, server) = start_server(2, 1024).await;
    let mut client = Client::connect(addr).await;

    client.set("k", "v").await;
    client.send(b"DELETE k\n").await;
    client.send(b"DELETE never-existed\n").await;

    // The next line read belongs to STATS, not to either DELETE
    let stats = client.stats().await;
    assert_eq!(stats["entries"], 0);
    assert_eq!(stats["memory_used"], 0);
    assert!(client.get("k").await.is_err());

    server.abort();
}

// == Eviction Tests ==

#[tokio::test]
async fn test_least_recently_used_is_evicted() {
    let (addr, server) = start_server(1, 10).await;
    let mut client = Client::connect(addr).await;

    client.set("a", "aaaa").await;
    client.set("b", "bbbb").await;
    // Reading "a" makes "b" the oldest
    assert!(client.get("a").await.is_ok());
    assert_eq!(client.set("c", "cccc").await, "OK\n");

    assert_eq!(
        client.get("b").await,
        Err("ERROR Key not found: b\n".to_string())
    );
    assert_eq!(client.get("a").await, Ok("aaaa".to_string()));
    assert_eq!(client.get("c").await, Ok("cccc".to_string()));

    let stats = client.stats().await;
    assert_eq!(stats["evictions"], 1);
    assert_eq!(stats["memory_used"], 8);

    server.abort();
}

// == Parsing Tests ==

#[tokio::test]
async fn test_verbs_are_case_insensitive() {
    let (addr, server) = start_server(2, 1024).await;
    let mut client = Client::connect(addr).await;

    client.send(b"set k 2\nhi\n").await;
    assert_eq!(client.line().await, "OK\n");
    client.send(b"GeT k\n").await;
    assert_eq!(client.line().await, "VALUE 2\n");
    assert_eq!(client.line().await, "hi\n");

    server.abort();
}

#[tokio::test]
async fn test_key_too_long_is_rejected() {
    let (addr, server) = start_server(2, 1024).await;
    let mut client = Client::connect(addr).await;

    let key = "k".repeat(101);
    assert_eq!(
        client.get(&key).await,
        Err("ERROR Key too long: 101 bytes exceeds limit of 100\n".to_string())
    );

    server.abort();
}

#[tokio::test]
async fn test_unknown_command_keeps_connection_open() {
    let (addr, server) = start_server(2, 1024).await;
    let mut client = Client::connect(addr).await;

    client.send(b"FLUSHALL\n").await;
    assert_eq!(
        client.line().await,
        "ERROR Malformed command: unknown command: FLUSHALL\n"
    );
    assert_eq!(client.set("k", "v").await, "OK\n");

    server.abort();
}

// == STATS / DUMP Tests ==

#[tokio::test]
async fn test_stats_counts_hits_and_misses() {
    let (addr, server) = start_server(3, 100).await;
    let mut client = Client::connect(addr).await;

    client.set("a", "1").await;
    client.set("b", "22").await;
    let _ = client.get("a").await;
    let _ = client.get("missing").await;

    let stats = client.stats().await;
    assert_eq!(stats["sets"], 2);
    assert_eq!(stats["gets"], 2);
    assert_eq!(stats["success"], 1);
    assert_eq!(stats["entries"], 2);
    assert_eq!(stats["memory_used"], 3);
    assert_eq!(stats["capacity"], 300);
    assert_eq!(stats["hit_rate"], 0.5);

    server.abort();
}

#[tokio::test]
async fn test_dump_lists_entries_and_terminates() {
    let (addr, server) = start_server(4, 1024).await;
    let mut client = Client::connect(addr).await;

    client.set("x", "1").await;
    client.set("y", "two").await;
    client.send(b"DUMP\n").await;

    let mut lines = Vec::new();
    loop {
        let line = client.line().await;
        if line == "END\n" {
            break;
        }
        lines.push(line);
    }
    lines.sort();
    assert_eq!(lines, vec!["K: x V: 1\n", "K: y V: two\n"]);

    server.abort();
}

// == Concurrency Tests ==

#[tokio::test]
async fn test_concurrent_clients() {
    let (addr, server) = start_server(4, 4096).await;

    let mut clients = Vec::new();
    for id in 0..8 {
        clients.push(tokio::spawn(async move {
            let mut client = Client::connect(addr).await;
            for i in 0..20 {
                let key = format!("c{}:k{}", id, i);
                let value = format!("v{}", i);
                assert_eq!(client.set(&key, &value).await, "OK\n");
                assert_eq!(client.get(&key).await, Ok(value));
            }
        }));
    }
    for client in clients {
        client.await.unwrap();
    }

    let mut client = Client::connect(addr).await;
    let stats = client.stats().await;
    assert_eq!(stats["sets"], 160);
    assert_eq!(stats["gets"], 160);
    assert_eq!(stats["entries"], 160);

    server.abort();
}
