//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache core and the wire protocol.
///
/// The `Display` text of each variant is what a client sees after `ERROR `.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A single value is larger than a whole shard
    #[error("Value too large: {size} bytes exceeds shard capacity of {capacity} bytes")]
    ValueTooLarge { size: usize, capacity: usize },

    /// Eviction drained the shard without freeing enough room
    #[error("Insufficient capacity: needed {needed} bytes, shard capacity is {capacity} bytes")]
    InsufficientCapacity { needed: usize, capacity: usize },

    /// Declared value length does not match the bytes received
    #[error("Size mismatch: declared {declared} bytes, received {received}")]
    SizeMismatch { declared: usize, received: usize },

    /// Key not found in cache
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Key is longer than the protocol allows
    #[error("Key too long: {len} bytes exceeds limit of {max}")]
    KeyTooLong { len: usize, max: usize },

    /// Wrong verb, argument count or argument format
    #[error("Malformed command: {0}")]
    MalformedCommand(String),
}

impl CacheError {
    // == Protocol Line ==
    /// Renders the error as a single protocol reply line.
    pub fn to_reply_line(&self) -> String {
        format!("ERROR {}\n", self)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
