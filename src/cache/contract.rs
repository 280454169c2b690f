//! Store Contract Module
//!
//! The operation set every store exposes to the transport layer.

use bytes::Bytes;

use crate::cache::StoreStats;
use crate::error::Result;

// == KV Store ==
/// Capability interface satisfied by both a single shard and the sharded
/// store, so the transport is written once against either.
///
/// Every method is synchronous; locks are held only for the duration of
/// the call.
pub trait KvStore: Send + Sync {
    /// Stores `value` under `key`, evicting least recently used entries
    /// when the target shard is out of room.
    fn set(&self, key: &str, value: Bytes) -> Result<()>;

    /// Returns the value under `key` and marks it as recently used.
    fn get(&self, key: &str) -> Result<Bytes>;

    /// Removes `key`. Absent keys are a no-op.
    fn delete(&self, key: &str);

    /// Returns every resident key/value pair.
    fn snapshot(&self) -> Vec<(String, Bytes)>;

    /// Returns a snapshot of the usage counters.
    fn stats(&self) -> StoreStats;

    /// Textual listing of every resident entry, one line each.
    fn dump(&self) -> String {
        self.snapshot()
            .iter()
            .map(|(key, value)| dump_line(key, value))
            .collect()
    }
}

/// Formats one entry of a dump listing.
pub fn dump_line(key: &str, value: &[u8]) -> String {
    format!("K: {} V: {}\n", key, String::from_utf8_lossy(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_line() {
        assert_eq!(dump_line("a", b"xyz"), "K: a V: xyz\n");
        assert_eq!(dump_line("b", b""), "K: b V: \n");
    }

    #[test]
    fn test_dump_line_lossy() {
        assert_eq!(dump_line("k", &[0x66, 0xff]), "K: k V: f\u{fffd}\n");
    }
}
