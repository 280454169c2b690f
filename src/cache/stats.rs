//! Cache Statistics Module
//!
//! Tracks per-shard usage counters and folds them into store-wide totals.

use serde::Serialize;

// == Store Stats ==
/// Snapshot of cache usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of successful writes
    pub sets: u64,
    /// Number of reads, hit or miss
    pub gets: u64,
    /// Number of reads that found their key
    pub success: u64,
    /// Number of entries removed to make room for writes
    pub evictions: u64,
    /// Current number of resident entries
    pub entries: usize,
    /// Sum of resident value lengths in bytes
    pub memory_used: usize,
    /// Byte budget
    pub capacity: usize,
}

impl StoreStats {
    // == Constructor ==
    /// Creates an empty snapshot for a store with the given byte budget.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Calculates the read hit rate.
    ///
    /// Returns success / gets, or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.success as f64 / self.gets as f64
        }
    }

    // == Record Set ==
    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    // == Record Get ==
    /// Counts a read and, when it found its key, a success.
    pub fn record_get(&mut self, hit: bool) {
        self.gets += 1;
        if hit {
            self.success += 1;
        }
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Merge ==
    /// Adds every field of `other` into the matching field of `self`.
    pub fn merge(&mut self, other: &StoreStats) {
        self.sets += other.sets;
        self.gets += other.gets;
        self.success += other.success;
        self.evictions += other.evictions;
        self.entries += other.entries;
        self.memory_used += other.memory_used;
        self.capacity += other.capacity;
    }
}

impl std::iter::Sum for StoreStats {
    fn sum<I: Iterator<Item = StoreStats>>(iter: I) -> Self {
        iter.fold(StoreStats::default(), |mut total, stats| {
            total.merge(&stats);
            total
        })
    }
}
