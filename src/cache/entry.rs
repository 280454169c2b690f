//! Cache Entry Module
//!
//! Defines a resident key/value record with recency and usage metadata.

use bytes::Bytes;

// == Cache Entry ==
/// Represents a single resident entry of a shard.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: Bytes,
    /// Logical time of the last successful read or write
    pub last_access: u64,
    /// Number of successful writes of this key
    pub sets: u64,
    /// Number of reads that returned this entry. Misses never reach an
    /// entry, so they are only counted shard-wide.
    pub hits: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a freshly written entry.
    ///
    /// # Arguments
    /// * `key` - The key to store under
    /// * `value` - The value to store
    /// * `now` - Logical access time of the write
    pub fn new(key: String, value: Bytes, now: u64) -> Self {
        Self {
            key,
            value,
            last_access: now,
            sets: 1,
            hits: 0,
        }
    }

    // == Replace ==
    /// Swaps in a new value, keeping the usage counters.
    ///
    /// Returns the size of the value that was replaced.
    pub fn replace(&mut self, value: Bytes, now: u64) -> usize {
        let old_size = self.size();
        self.value = value;
        self.last_access = now;
        self.sets += 1;
        old_size
    }

    // == Touch ==
    /// Records a successful read at `now`.
    pub fn touch(&mut self, now: u64) {
        self.last_access = now;
        self.hits += 1;
    }

    // == Size ==
    /// Bytes charged against the shard capacity.
    pub fn size(&self) -> usize {
        self.value.len()
    }
}
