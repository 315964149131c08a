//! The bounded queue both workers feed and the output multiplexer drains.

use crate::bridge::error_helpers::error_envelope;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Bytes destined for standard output.
pub type Payload = Vec<u8>;

/// Receiving half, owned by the output multiplexer.
pub type PayloadReceiver = mpsc::Receiver<Payload>;

/// Create the shared queue with the given capacity.
pub fn payload_channel(capacity: usize) -> (PayloadSender, PayloadReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (PayloadSender { tx }, rx)
}

/// Producer handle onto the shared queue.
///
/// The queue closes once every `PayloadSender` has been dropped, so a worker
/// closes its side simply by returning.
#[derive(Debug, Clone)]
pub struct PayloadSender {
    tx: mpsc::Sender<Payload>,
}

impl PayloadSender {
    /// Enqueue a payload, waiting for room.
    ///
    /// Returns `false` if cancellation fired first or the queue is closed;
    /// the payload is dropped in both cases.
    pub async fn send(&self, payload: Payload, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            res = self.tx.send(payload) => match res {
                Ok(()) => true,
                Err(_) => {
                    tracing::debug!("Output queue closed, dropping payload");
                    false
                }
            },
        }
    }

    /// Enqueue a synthesized error for `stage` without waiting.
    ///
    /// Error reporting is best-effort: when the queue is full or closed the
    /// error is logged and dropped.
    pub fn send_error(&self, stage: &str, cause: impl Display) {
        let cause = cause.to_string();
        match self.tx.try_send(error_envelope(stage, &cause)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(stage, cause = %cause, "Output queue full, dropping error response");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(stage, cause = %cause, "Output queue closed, dropping error response");
            }
        }
    }
}
