//! Cache Module
//!
//! Provides size-bounded LRU shards and a hash-sharded store built from them.

mod contract;
mod entry;
mod recency;
mod shard;
mod sharded;
mod stats;


// Re-export public types
pub use contract::{dump_line, KvStore};
pub use entry::CacheEntry;
pub use recency::{RecencyIndex, RecencySlot};
pub use shard::ShardStore;
pub use sharded::ShardedStore;
pub use stats::StoreStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 100;
