//! Reply encoding for the line-based wire protocol
//!
//! Defines what the server writes back for each command.

use bytes::Bytes;
use serde::Serialize;

use crate::cache::StoreStats;
use crate::error::CacheError;

/// Marks the end of a DUMP listing.
pub const DUMP_TERMINATOR: &str = "END\n";

/// Response to a single command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `OK`
    Ok,
    /// `VALUE <len>` followed by the value line
    Value(Bytes),
    /// Nothing is written (DELETE)
    Silent,
    /// One line of JSON
    Stats(StatsResponse),
    /// Dump listing followed by `END`
    Dump(String),
    /// `ERROR <message>`
    Error(CacheError),
}

impl Reply {
    /// Serializes the reply into the bytes sent to the client.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Reply::Ok => b"OK\n".to_vec(),
            Reply::Value(value) => {
                let mut out = format!("VALUE {}\n", value.len()).into_bytes();
                out.extend_from_slice(value);
                out.push(b'\n');
                out
            }
            Reply::Silent => Vec::new(),
            Reply::Stats(stats) => match serde_json::to_vec(stats) {
                Ok(mut out) => {
                    out.push(b'\n');
                    out
                }
                Err(err) => format!("ERROR {}\n", err).into_bytes(),
            },
            Reply::Dump(listing) => {
                let mut out = String::with_capacity(listing.len() + DUMP_TERMINATOR.len());
                out.push_str(listing);
                out.push_str(DUMP_TERMINATOR);
                out.into_bytes()
            }
            Reply::Error(err) => err.to_reply_line().into_bytes(),
        }
    }
}

/// Body of the STATS reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResponse {
    /// Number of successful writes
    pub sets: u64,
    /// Number of reads
    pub gets: u64,
    /// Number of reads that found their key
    pub success: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Current number of entries
    pub entries: usize,
    /// Sum of resident value lengths
    pub memory_used: usize,
    /// Total byte budget across shards
    pub capacity: usize,
    /// success / gets
    pub hit_rate: f64,
}

impl From<StoreStats> for StatsResponse {
    fn from(stats: StoreStats) -> Self {
        Self {
            sets: stats.sets,
            gets: stats.gets,
            success: stats.success,
            evictions: stats.evictions,
            entries: stats.entries,
            memory_used: stats.memory_used,
            capacity: stats.capacity,
            hit_rate: stats.hit_rate(),
        }
    }
}
