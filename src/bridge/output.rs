//! The single writer to standard output.

use crate::bridge::queue::PayloadReceiver;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Drains the shared queue in FIFO order and writes each payload as one line.
///
/// This is the only component that touches the output stream, so payloads
/// from the two workers are never interleaved mid-line.
pub struct OutputMultiplexer<W> {
    writer: W,
}

impl<W> OutputMultiplexer<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wrap an output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Run until the queue is closed and empty, or a write fails.
    ///
    /// Returns the number of payloads written. After a write failure the
    /// receiver is dropped and anything still queued is lost. Both workers
    /// then see a closed queue on their next send and return; the bridge
    /// itself keeps waiting for cancellation.
    pub async fn run(mut self, mut queue: PayloadReceiver) -> usize {
        let mut written = 0;

        while let Some(payload) = queue.recv().await {
            if let Err(e) = self.write_payload(&payload).await {
                tracing::error!(error = %e, "Failed to write to standard output, output stopped");
                return written;
            }
            written += 1;
        }

        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!(error = %e, "Failed to close output stream");
        }
        written
    }

    async fn write_payload(&mut self, payload: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(payload).await?;
        if payload.last() != Some(&b'\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await
    }
}
