//! Recency Index Module
//!
//! Indexed binary min-heap ordering keys by last access time.

use std::collections::HashMap;

// == Recency Slot ==
/// One heap slot: a key and the logical time it was last touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencySlot {
    pub key: String,
    pub last_access: u64,
}

// == Recency Index ==
/// Array-backed min-heap over `last_access`, paired with a key to slot
/// position map so that `fix` and `remove` never scan.
///
/// The root is always the least recently used key.
#[derive(Debug, Default)]
pub struct RecencyIndex {
    /// Heap-ordered slots
    heap: Vec<RecencySlot>,
    /// Current slot of every key in `heap`
    positions: HashMap<String, usize>,
}

impl RecencyIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push ==
    /// Inserts `key` with the given access time.
    ///
    /// Pushing a key that is already indexed behaves like [`fix`](Self::fix).
    pub fn push(&mut self, key: &str, last_access: u64) {
        if self.fix(key, last_access) {
            return;
        }
        let pos = self.heap.len();
        self.heap.push(RecencySlot {
            key: key.to_string(),
            last_access,
        });
        self.positions.insert(key.to_string(), pos);
        self.sift_up(pos);
    }

    // == Fix ==
    /// Updates the access time of `key` and restores heap order around it.
    ///
    /// Returns false if the key is not indexed.
    pub fn fix(&mut self, key: &str, last_access: u64) -> bool {
        match self.positions.get(key).copied() {
            Some(pos) => {
                self.heap[pos].last_access = last_access;
                self.fix_at(pos);
                true
            }
            None => false,
        }
    }

    // == Pop Min ==
    /// Removes and returns the least recently used slot.
    ///
    /// Returns None when the index is empty.
    pub fn pop_min(&mut self) -> Option<RecencySlot> {
        if self.heap.is_empty() {
            None
        } else {
            Some(self.remove_at(0))
        }
    }

    // == Remove ==
    /// Fully detaches `key` from the index.
    pub fn remove(&mut self, key: &str) -> Option<RecencySlot> {
        let pos = self.positions.get(key).copied()?;
        Some(self.remove_at(pos))
    }

    // == Peek Min ==
    /// Returns the least recently used slot without removing it.
    #[cfg(test)]
    pub(crate) fn peek_min(&self) -> Option<&RecencySlot> {
        self.heap.first()
    }

    // == Position ==
    /// Current heap slot of `key`.
    #[cfg(test)]
    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    // == Contains ==
    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    // == Length ==
    /// Returns the number of indexed keys.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    // == Heap Internals ==
    fn remove_at(&mut self, pos: usize) -> RecencySlot {
        let slot = self.heap.swap_remove(pos);
        self.positions.remove(&slot.key);
        if pos < self.heap.len() {
            self.record_position(pos);
            self.fix_at(pos);
        }
        slot
    }

    fn fix_at(&mut self, pos: usize) {
        if !self.sift_down(pos) {
            self.sift_up(pos);
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].last_access >= self.heap[parent].last_access {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    /// Returns true if the slot moved.
    fn sift_down(&mut self, start: usize) -> bool {
        let len = self.heap.len();
        let mut pos = start;
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.heap[right].last_access < self.heap[left].last_access {
                child = right;
            }
            if self.heap[child].last_access >= self.heap[pos].last_access {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
        pos > start
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.record_position(a);
        self.record_position(b);
    }

    fn record_position(&mut self, pos: usize) {
        if let Some(slot) = self.positions.get_mut(&self.heap[pos].key) {
            *slot = pos;
        }
    }

    /// Panics if heap order or the position map is broken.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.heap.len(), self.positions.len(), "orphaned slots");
        for (pos, slot) in self.heap.iter().enumerate() {
            assert_eq!(self.positions.get(&slot.key), Some(&pos), "stale position");
            if pos > 0 {
                let parent = &self.heap[(pos - 1) / 2];
                assert!(parent.last_access <= slot.last_access, "heap order");
            }
        }
    }
}
