//! Wire protocol for the cache server
//!
//! Newline-terminated ASCII commands with case-insensitive verbs:
//!
//! ```text
//! SET <key> <len>\n<value>\n   -> OK
//! GET <key>\n                  -> VALUE <len>\n<value>\n
//! DELETE <key>\n               -> (no reply)
//! STATS\n                      -> one JSON line
//! DUMP\n                       -> K: <key> V: <value> lines, then END
//! ```
//!
//! Failures reply with a single `ERROR <message>` line.

pub mod command;
pub mod reply;

// Re-export commonly used types
pub use command::{Command, MAX_COMMAND_LINE};
pub use reply::{Reply, StatsResponse, DUMP_TERMINATOR};
