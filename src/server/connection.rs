//! Connection Handling
//!
//! Serves one client: reads a command line, reads the value line for SET,
//! runs the command and writes the reply, strictly one request at a time.

use std::io;

use bytes::Bytes;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter,
};
use tracing::{debug, warn};

use super::handlers::{self, AppState};
use crate::error::CacheError;
use crate::protocol::{Command, Reply, MAX_COMMAND_LINE};

/// Outcome of reading one newline-terminated line.
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    /// The peer closed the stream before sending anything
    Eof,
    /// A line of at most `limit` bytes is in the buffer, terminator stripped
    Complete,
    /// The line was longer than `limit`; it was consumed but not kept
    Overflow { len: usize },
}

/// Handles a client connection until it closes.
///
/// Request failures are written back as `ERROR` lines and never end the
/// connection; only I/O errors do.
pub async fn handle_connection<S>(stream: S, state: AppState) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let mut writer = BufWriter::new(write_half);
    let mut line = Vec::with_capacity(MAX_COMMAND_LINE);

    loop {
        line.clear();
        let reply = match read_line(&mut reader, &mut line, MAX_COMMAND_LINE).await? {
            LineRead::Eof => break,
            LineRead::Overflow { len } => Reply::Error(CacheError::MalformedCommand(format!(
                "command line of {} bytes exceeds limit of {}",
                len, MAX_COMMAND_LINE
            ))),
            LineRead::Complete if line.iter().all(u8::is_ascii_whitespace) => continue,
            LineRead::Complete => match Command::parse(&line) {
                Ok(command) => {
                    debug!("Received command: {:?}", command);
                    let payload = match command {
                        Command::Set { len, .. } => {
                            read_payload(&mut reader, len, state.max_value_len).await?
                        }
                        _ => Ok(Bytes::new()),
                    };
                    match payload {
                        Ok(value) => handlers::dispatch(&state, command, value),
                        Err(err) => Reply::Error(err),
                    }
                }
                Err(err) => Reply::Error(err),
            },
        };

        if let Reply::Error(err) = &reply {
            warn!("Request failed: {}", err);
        }

        let out = reply.encode();
        if !out.is_empty() {
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }

    Ok(())
}

/// Reads the value line that follows `SET` and checks it against the
/// declared length.
///
/// A declared length above `max_len` is rejected without buffering the
/// payload. The outer `io::Result` carries stream failures, the inner one
/// request failures.
async fn read_payload<R>(
    reader: &mut R,
    declared: usize,
    max_len: usize,
) -> io::Result<Result<Bytes, CacheError>>
where
    R: AsyncBufRead + Unpin,
{
    if declared > max_len {
        read_line(reader, &mut Vec::new(), 0).await?;
        return Ok(Err(CacheError::ValueTooLarge {
            size: declared,
            capacity: max_len,
        }));
    }

    let mut payload = Vec::with_capacity(declared + 2);
    let received = match read_line(reader, &mut payload, declared).await? {
        LineRead::Eof => 0,
        LineRead::Overflow { len } => len,
        LineRead::Complete => payload.len(),
    };

    if received != declared {
        return Ok(Err(CacheError::SizeMismatch { declared, received }));
    }
    Ok(Ok(Bytes::from(payload)))
}

/// Reads up to and including the next `\n`, keeping at most `limit` bytes
/// of content in `buf`. A trailing `\r\n` or `\n` is stripped.
///
/// Longer lines are drained from the reader chunk by chunk without being
/// stored. A final line without a terminator counts as complete.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut consumed = 0;
    let mut terminator = 0;
    let mut previous: Option<u8> = None;
    let mut overflowed = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }

        let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
            Some(end) => (&available[..=end], true),
            None => (available, false),
        };
        let used = chunk.len();

        if done {
            let carriage_return = if used >= 2 {
                chunk[used - 2] == b'\r'
            } else {
                previous == Some(b'\r')
            };
            terminator = if carriage_return { 2 } else { 1 };
        }
        previous = chunk.last().copied();

        if !overflowed {
            if buf.len() + used <= limit + 2 {
                buf.extend_from_slice(chunk);
            } else {
                overflowed = true;
                buf.clear();
            }
        }

        consumed += used;
        reader.consume(used);
        if done {
            break;
        }
    }

    if consumed == 0 {
        return Ok(LineRead::Eof);
    }

    let len = consumed - terminator;
    if overflowed || len > limit {
        buf.clear();
        return Ok(LineRead::Overflow { len });
    }
    buf.truncate(len);
    Ok(LineRead::Complete)
}
