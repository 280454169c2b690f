//! Shard Store Module
//!
//! One LRU cache partition: a key map, a recency index and a byte budget,
//! all behind a single mutex.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::cache::{CacheEntry, KvStore, RecencyIndex, RecencySlot, StoreStats};
use crate::error::{CacheError, Result};

// == Shard State ==
/// Everything the shard lock protects.
#[derive(Debug)]
struct ShardState {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU ordering over `entries`
    recency: RecencyIndex,
    /// Fixed byte budget
    capacity: usize,
    /// Sum of resident value lengths
    current_size: usize,
    /// Logical clock, bumped on every access
    clock: u64,
    /// Usage counters
    stats: StoreStats,
}

impl ShardState {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyIndex::new(),
            capacity,
            current_size: 0,
            clock: 0,
            stats: StoreStats::with_capacity(capacity),
        }
    }

    fn set(&mut self, key: &str, value: Bytes) -> Result<()> {
        let size = value.len();
        if size > self.capacity {
            return Err(CacheError::ValueTooLarge {
                size,
                capacity: self.capacity,
            });
        }

        let now = self.clock + 1;

        // The entry being rewritten sits out of the index while room is made,
        // so eviction can never pick it.
        let old_size = self.entries.get(key).map_or(0, CacheEntry::size);
        let held = self.recency.remove(key);
        self.current_size -= old_size;

        let evicted = match self.make_room(size) {
            Ok(evicted) => evicted,
            Err(err) => {
                self.current_size += old_size;
                if let Some(slot) = held {
                    self.recency.push(&slot.key, slot.last_access);
                }
                return Err(err);
            }
        };

        self.clock = now;
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.replace(value, now);
            }
            None => {
                self.entries
                    .insert(key.to_string(), CacheEntry::new(key.to_string(), value, now));
            }
        }
        self.recency.push(key, now);
        self.current_size += size;
        for _ in 0..evicted {
            self.stats.record_eviction();
        }
        self.stats.record_set();
        Ok(())
    }

    /// Evicts least recently used entries until `incoming` more bytes fit.
    ///
    /// Returns the number of evicted entries. If the index runs dry first,
    /// every popped entry is put back and nothing has changed.
    fn make_room(&mut self, incoming: usize) -> Result<usize> {
        let mut evicted = Vec::new();
        while self.current_size + incoming > self.capacity {
            let Some(slot) = self.recency.pop_min() else {
                let needed = self.current_size + incoming;
                self.restore(evicted);
                return Err(CacheError::InsufficientCapacity {
                    needed,
                    capacity: self.capacity,
                });
            };
            let entry = self.entries.remove(&slot.key);
            if let Some(entry) = &entry {
                self.current_size -= entry.size();
            }
            evicted.push((slot, entry));
        }
        Ok(evicted.iter().filter(|(_, entry)| entry.is_some()).count())
    }

    /// Puts back entries popped by a failed `make_room`.
    fn restore(&mut self, evicted: Vec<(RecencySlot, Option<CacheEntry>)>) {
        for (slot, entry) in evicted.into_iter().rev() {
            if let Some(entry) = entry {
                self.current_size += entry.size();
                self.entries.insert(slot.key.clone(), entry);
            }
            self.recency.push(&slot.key, slot.last_access);
        }
    }

    fn get(&mut self, key: &str) -> Result<Bytes> {
        match self.entries.get_mut(key) {
            Some(entry) => {
                self.clock += 1;
                entry.touch(self.clock);
                self.recency.fix(key, self.clock);
                self.stats.record_get(true);
                Ok(entry.value.clone())
            }
            None => {
                self.stats.record_get(false);
                Err(CacheError::KeyNotFound(key.to_string()))
            }
        }
    }

    fn delete(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.recency.remove(key);
            self.current_size -= entry.size();
        }
    }

    fn snapshot(&self) -> Vec<(String, Bytes)> {
        self.entries
            .values()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.entries.len(),
            memory_used: self.current_size,
            ..self.stats
        }
    }
}

// == Shard Store ==
/// A single LRU cache with a fixed byte capacity.
///
/// Every operation takes the shard lock for its whole duration and either
/// commits fully or leaves the shard untouched.
#[derive(Debug)]
pub struct ShardStore {
    state: Mutex<ShardState>,
    capacity: usize,
}

impl ShardStore {
    // == Constructor ==
    /// Creates an empty shard.
    ///
    /// # Arguments
    /// * `capacity` - Byte budget, measured as the sum of value lengths
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(ShardState::new(capacity)),
            capacity,
        }
    }

    // == Capacity ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Contains ==
    /// Checks residency without touching recency or counters.
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries in the shard.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Panics if the map, the recency index and the size counter disagree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let state = self.state.lock();
        state.recency.assert_consistent();
        assert_eq!(state.entries.len(), state.recency.len());
        for key in state.entries.keys() {
            assert!(state.recency.contains(key), "{key} missing from index");
        }
        let total: usize = state.entries.values().map(CacheEntry::size).sum();
        assert_eq!(state.current_size, total);
        assert!(state.current_size <= state.capacity);
    }
}

impl KvStore for ShardStore {
    fn set(&self, key: &str, value: Bytes) -> Result<()> {
        self.state.lock().set(key, value)
    }

    fn get(&self, key: &str) -> Result<Bytes> {
        self.state.lock().get(key)
    }

    fn delete(&self, key: &str) {
        self.state.lock().delete(key)
    }

    fn snapshot(&self) -> Vec<(String, Bytes)> {
        self.state.lock().snapshot()
    }

    fn stats(&self) -> StoreStats {
        self.state.lock().stats()
    }
}
