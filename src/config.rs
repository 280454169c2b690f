//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::thread;

/// Default byte budget of a single shard.
pub const DEFAULT_SHARD_CAPACITY: usize = 1024 * 1024; // 1 MiB

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte capacity of each shard (sum of resident value lengths)
    pub shard_capacity: usize,
    /// Number of independent shards, always at least 1
    pub shard_count: usize,
    /// TCP server port
    pub server_port: u16,
    /// Seconds between stats log lines, 0 disables the reporter
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SHARD_CAPACITY` - Bytes per shard (default: 1 MiB)
    /// - `SHARD_COUNT` - Number of shards (default: available parallelism)
    /// - `SERVER_PORT` - TCP server port (default: 7070)
    /// - `STATS_INTERVAL` - Stats log frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            shard_capacity: env_or("SHARD_CAPACITY", defaults.shard_capacity),
            shard_count: env_or("SHARD_COUNT", defaults.shard_count).max(1),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            stats_interval: env_or("STATS_INTERVAL", defaults.stats_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_capacity: DEFAULT_SHARD_CAPACITY,
            shard_count: default_shard_count(),
            server_port: 7070,
            stats_interval: 60,
        }
    }
}

/// One shard per available core, detected once at startup.
fn default_shard_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.shard_capacity, DEFAULT_SHARD_CAPACITY);
        assert!(config.shard_count >= 1);
        assert_eq!(config.server_port, 7070);
        assert_eq!(config.stats_interval, 60);
    }

    #[test]
    fn test_config_from_env() {
        // Env vars are process-global; keep every env assertion in this test
        env::remove_var("SHARD_CAPACITY");
        env::remove_var("SHARD_COUNT");
        env::remove_var("SERVER_PORT");
        env::remove_var("STATS_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.shard_capacity, DEFAULT_SHARD_CAPACITY);
        assert_eq!(config.shard_count, default_shard_count());
        assert_eq!(config.server_port, 7070);
        assert_eq!(config.stats_interval, 60);

        env::set_var("SHARD_CAPACITY", "4096");
        env::set_var("SHARD_COUNT", "0");
        env::set_var("SERVER_PORT", "not-a-port");
        let config = Config::from_env();
        assert_eq!(config.shard_capacity, 4096);
        assert_eq!(config.shard_count, 1);
        assert_eq!(config.server_port, 7070);

        env::remove_var("SHARD_CAPACITY");
        env::remove_var("SHARD_COUNT");
        env::remove_var("SERVER_PORT");
    }
}
