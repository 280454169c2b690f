//! Command Handlers
//!
//! Executes parsed commands against the shared store.

use std::sync::Arc;

use bytes::Bytes;

use crate::cache::{KvStore, ShardedStore};
use crate::config::Config;
use crate::protocol::{Command, Reply, StatsResponse};

/// Application state shared across all connections.
///
/// Built once at startup and cloned into every connection task.
#[derive(Clone)]
pub struct AppState {
    /// The store every command runs against
    pub store: Arc<dyn KvStore>,
    /// Largest value a SET may declare
    pub max_value_len: usize,
}

impl AppState {
    /// Creates a new AppState around an existing store.
    pub fn new(store: Arc<dyn KvStore>, max_value_len: usize) -> Self {
        Self {
            store,
            max_value_len,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds a sharded store with the configured shard count and capacity.
    pub fn from_config(config: &Config) -> Self {
        let store = ShardedStore::new(config.shard_count, config.shard_capacity);
        Self::new(Arc::new(store), config.shard_capacity)
    }
}

/// Runs a command against the store.
///
/// `payload` is the already length-checked value line of a `SET` and is
/// ignored by every other command.
pub fn dispatch(state: &AppState, command: Command, payload: Bytes) -> Reply {
    match command {
        Command::Set { key, .. } => set_handler(state, &key, payload),
        Command::Get { key } => get_handler(state, &key),
        Command::Delete { key } => delete_handler(state, &key),
        Command::Stats => stats_handler(state),
        Command::Dump => dump_handler(state),
    }
}

/// Handler for SET
pub fn set_handler(state: &AppState, key: &str, value: Bytes) -> Reply {
    match state.store.set(key, value) {
        Ok(()) => Reply::Ok,
        Err(err) => Reply::Error(err),
    }
}

/// Handler for GET
pub fn get_handler(state: &AppState, key: &str) -> Reply {
    match state.store.get(key) {
        Ok(value) => Reply::Value(value),
        Err(err) => Reply::Error(err),
    }
}

/// Handler for DELETE
///
/// Always succeeds and writes nothing back.
pub fn delete_handler(state: &AppState, key: &str) -> Reply {
    state.store.delete(key);
    Reply::Silent
}

/// Handler for STATS
pub fn stats_handler(state: &AppState) -> Reply {
    Reply::Stats(StatsResponse::from(state.store.stats()))
}

/// Handler for DUMP
///
/// Each shard is locked for the length of its own traversal.
pub fn dump_handler(state: &AppState) -> Reply {
    Reply::Dump(state.store.dump())
}
