//! Sharded Store Module
//!
//! Composes independent [`ShardStore`]s into one logical store. Each key is
//! routed to exactly one shard by a CRC-32C hash of its bytes, so operations
//! on different shards never contend for the same lock.

use bytes::Bytes;

use crate::cache::{KvStore, ShardStore, StoreStats};
use crate::error::Result;

// == Sharded Store ==
/// A fixed set of LRU shards behind one [`KvStore`] interface.
///
/// The shard count is chosen at construction and never changes, so routing
/// needs no rehashing.
#[derive(Debug)]
pub struct ShardedStore {
    shards: Vec<ShardStore>,
}

impl ShardedStore {
    // == Constructor ==
    /// Creates `shard_count` shards of `shard_capacity` bytes each.
    ///
    /// A shard count of zero is treated as one.
    pub fn new(shard_count: usize, shard_capacity: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| ShardStore::new(shard_capacity))
            .collect();
        Self { shards }
    }

    // == Routing ==
    /// Index of the shard that owns `key`.
    pub fn shard_for(&self, key: &str) -> usize {
        crc32c::crc32c(key.as_bytes()) as usize % self.shards.len()
    }

    // == Shard Access ==
    pub fn shards(&self) -> &[ShardStore] {
        &self.shards
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn route(&self, key: &str) -> &ShardStore {
        &self.shards[self.shard_for(key)]
    }
}

impl KvStore for ShardedStore {
    fn set(&self, key: &str, value: Bytes) -> Result<()> {
        self.route(key).set(key, value)
    }

    fn get(&self, key: &str) -> Result<Bytes> {
        self.route(key).get(key)
    }

    fn delete(&self, key: &str) {
        self.route(key).delete(key)
    }

    /// Concatenates shard snapshots in shard order; each shard is locked
    /// only while its own entries are copied.
    fn snapshot(&self) -> Vec<(String, Bytes)> {
        self.shards
            .iter()
            .flat_map(|shard| shard.snapshot())
            .collect()
    }

    fn stats(&self) -> StoreStats {
        self.shards
            .iter()
            .map(|shard| shard.stats())
            .sum()
    }
}
