//! Server-Sent Events framing.
//!
//! Only the `data:` field and blank-line event boundaries are understood.
//! `event:`, `id:` and `retry:` lines, and comments, are skipped.

use crate::bridge::classifier::is_forwardable;
use crate::bridge::queue::PayloadSender;
use crate::transport::lines::{LineError, read_line};
use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;

const DATA_PREFIX: &[u8] = b"data:";

/// Reassembles event payloads from SSE lines.
///
/// Values of consecutive `data:` lines are concatenated directly, with no
/// separator, until a blank line ends the event.
#[derive(Debug, Default)]
pub struct SseFrameParser {
    data: Vec<u8>,
}

impl SseFrameParser {
    /// Create an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its terminator).
    ///
    /// Returns the accumulated payload when `line` is blank and at least one
    /// non-empty `data:` value was seen since the previous boundary. The
    /// accumulator is reset at every boundary.
    pub fn feed_line(&mut self, line: &[u8]) -> Option<Vec<u8>> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            return Some(std::mem::take(&mut self.data));
        }

        if let Some(value) = line.strip_prefix(DATA_PREFIX) {
            self.data.extend_from_slice(value.trim_ascii());
        }
        None
    }

    /// Bytes of the event currently being assembled.
    pub fn pending(&self) -> &[u8] {
        &self.data
    }
}

/// Why [`read_sse_stream`] returned.
#[derive(Debug)]
pub enum StreamEnd {
    /// The server closed the stream.
    Eof,
    /// Reading the body failed or a line was oversized.
    Failed(LineError),
    /// Cancellation was observed.
    Cancelled,
    /// The output queue is gone; nobody is listening any more.
    QueueClosed,
}

/// Parse an SSE body and enqueue every event classified as a JSON-RPC
/// response.
///
/// An event still pending when the stream ends (no trailing blank line) is
/// dropped. Reconnecting is left to the caller.
pub async fn read_sse_stream<R>(
    mut reader: R,
    queue: &PayloadSender,
    cancel: &CancellationToken,
    max_line_bytes: usize,
) -> StreamEnd
where
    R: AsyncBufRead + Unpin,
{
    let mut parser = SseFrameParser::new();
    let mut line = Vec::new();

    loop {
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return StreamEnd::Cancelled,
            read = read_line(&mut reader, &mut line, max_line_bytes) => read,
        };

        match read {
            Ok(true) => {}
            Ok(false) => {
                if !parser.pending().is_empty() {
                    tracing::debug!(
                        bytes = parser.pending().len(),
                        "SSE stream ended mid-event, dropping partial event"
                    );
                }
                return StreamEnd::Eof;
            }
            Err(e) => return StreamEnd::Failed(e),
        }

        let Some(event) = parser.feed_line(&line) else {
            continue;
        };

        if !is_forwardable(&event) {
            tracing::trace!(data = %String::from_utf8_lossy(&event), "Skipping non-response SSE event");
            continue;
        }

        if !queue.send(event, cancel).await {
            return if cancel.is_cancelled() {
                StreamEnd::Cancelled
            } else {
                StreamEnd::QueueClosed
            };
        }
    }
}
