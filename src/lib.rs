//! Shard Cache - A sharded in-memory LRU cache server
//!
//! Keys are spread over independently locked LRU shards, each with a fixed
//! byte budget, and served to remote clients over a line-based TCP protocol.

pub mod cache;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tasks;

pub use cache::{KvStore, ShardStore, ShardedStore, StoreStats};
pub use config::Config;
pub use error::{CacheError, Result};
pub use server::{serve, AppState};
pub use tasks::spawn_stats_reporter;
