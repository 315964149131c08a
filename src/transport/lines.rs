//! Bounded newline framing over async readers.
//!
//! Both standard input and SSE response bodies are consumed one line at a
//! time with a hard cap on line length, so a peer that never sends a newline
//! cannot grow memory without bound.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Maximum accepted line length (1 MiB).
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Errors produced while framing lines.
#[derive(Error, Debug)]
pub enum LineError {
    /// The line grew past the configured limit before a newline was seen.
    #[error("line exceeds {limit} bytes")]
    TooLong {
        /// The limit that was exceeded
        limit: usize,
    },

    /// The underlying reader failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads one line into `buf`, without the trailing `\n` (or `\r\n`).
///
/// `buf` is cleared first. Returns `Ok(false)` once the reader is exhausted
/// and nothing was read. A final line without a terminating newline is
/// still returned.
///
/// The reader cannot resynchronize after `LineError::TooLong`: the remainder
/// of the oversized line is left unread.
pub async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>, max: usize) -> Result<bool, LineError>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut saw_any = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            trim_cr(buf);
            return Ok(saw_any);
        }
        saw_any = true;

        match available.iter().position(|b| *b == b'\n') {
            Some(idx) => {
                if buf.len() + idx > max {
                    return Err(LineError::TooLong { limit: max });
                }
                buf.extend_from_slice(&available[..idx]);
                reader.consume(idx + 1);
                trim_cr(buf);
                return Ok(true);
            }
            None => {
                let len = available.len();
                if buf.len() + len > max {
                    return Err(LineError::TooLong { limit: max });
                }
                buf.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }
}

fn trim_cr(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}
