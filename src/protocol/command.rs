//! Command parsing for the line-based wire protocol
//!
//! Turns one command line into a typed [`Command`].

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

/// Longest command line accepted, terminator excluded.
pub const MAX_COMMAND_LINE: usize = 256;

/// A parsed client request.
///
/// `Set` carries only the declared payload length; the payload itself is
/// the next line on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SET <key> <length>`
    Set { key: String, len: usize },
    /// `GET <key>`
    Get { key: String },
    /// `DELETE <key>`
    Delete { key: String },
    /// `STATS`
    Stats,
    /// `DUMP`
    Dump,
}

impl Command {
    /// Parses a command line with its terminator already stripped.
    ///
    /// Verbs are case-insensitive and arguments may be separated by any
    /// run of spaces.
    pub fn parse(line: &[u8]) -> Result<Self> {
        let line = std::str::from_utf8(line).map_err(|_| {
            CacheError::MalformedCommand("command line is not valid UTF-8".to_string())
        })?;
        let mut parts = line.split_ascii_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| CacheError::MalformedCommand("empty command".to_string()))?;
        let args: Vec<&str> = parts.collect();

        match verb.to_ascii_uppercase().as_str() {
            "SET" => match args.as_slice() {
                [key, len] => {
                    let key = validate_key(key)?;
                    let len = len.parse().map_err(|_| {
                        CacheError::MalformedCommand(format!("invalid value length: {}", len))
                    })?;
                    Ok(Command::Set { key, len })
                }
                _ => Err(usage("SET <key> <length>")),
            },
            "GET" => match args.as_slice() {
                [key] => Ok(Command::Get {
                    key: validate_key(key)?,
                }),
                _ => Err(usage("GET <key>")),
            },
            "DELETE" => match args.as_slice() {
                [key] => Ok(Command::Delete {
                    key: validate_key(key)?,
                }),
                _ => Err(usage("DELETE <key>")),
            },
            "STATS" if args.is_empty() => Ok(Command::Stats),
            "STATS" => Err(usage("STATS")),
            "DUMP" if args.is_empty() => Ok(Command::Dump),
            "DUMP" => Err(usage("DUMP")),
            _ => Err(CacheError::MalformedCommand(format!(
                "unknown command: {}",
                verb
            ))),
        }
    }
}

fn validate_key(key: &str) -> Result<String> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::KeyTooLong {
            len: key.len(),
            max: MAX_KEY_LENGTH,
        });
    }
    Ok(key.to_string())
}

fn usage(form: &str) -> CacheError {
    CacheError::MalformedCommand(format!("incorrect number of arguments: {}", form))
}
