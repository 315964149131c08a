//! SSE subscription → output queue, reconnecting forever.

use crate::bridge::queue::PayloadSender;
use crate::bridge::settings::{ConnectionSettings, PROFILE_HEADER};
use crate::bridge::sse::{StreamEnd, read_sse_stream};
use crate::error::Result;
use futures::TryStreamExt;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Keeps a standing subscription to the server's SSE endpoint.
///
/// Connection failures and non-200 statuses are retried after a fixed delay,
/// without limit. A stream that ends, cleanly or not, is reconnected at once.
/// Only cancellation (or a closed output queue) stops the worker.
#[derive(Debug, Clone)]
pub struct InboundWorker {
    client: reqwest::Client,
    sse_url: Url,
    profile: Option<String>,
    reconnect_delay: Duration,
    max_line_bytes: usize,
}

impl InboundWorker {
    /// Create a worker with its own HTTP client.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        Ok(Self {
            client: settings.http_client()?,
            sse_url: settings.sse_url.clone(),
            profile: settings.profile_header().map(str::to_string),
            reconnect_delay: settings.reconnect_delay,
            max_line_bytes: settings.max_line_bytes,
        })
    }

    /// Run until `cancel` fires (or the output queue goes away).
    pub async fn run(&self, queue: PayloadSender, cancel: CancellationToken) {
        let mut attempt: u64 = 0;

        while !cancel.is_cancelled() {
            attempt += 1;

            match self.connect(&cancel).await {
                Some(response) => {
                    tracing::debug!(url = %self.sse_url, attempt, "SSE stream connected");
                    let body = StreamReader::new(Box::pin(
                        response.bytes_stream().map_err(std::io::Error::other),
                    ));
                    match read_sse_stream(body, &queue, &cancel, self.max_line_bytes).await {
                        StreamEnd::Cancelled => break,
                        StreamEnd::QueueClosed => {
                            tracing::debug!("Output queue closed, inbound worker finished");
                            return;
                        }
                        StreamEnd::Eof => {
                            tracing::debug!(url = %self.sse_url, "SSE stream closed by server, reconnecting");
                            continue;
                        }
                        StreamEnd::Failed(e) => {
                            tracing::debug!(url = %self.sse_url, error = %e, "SSE stream failed, reconnecting");
                            continue;
                        }
                    }
                }
                None if cancel.is_cancelled() => break,
                None => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        tracing::debug!("Inbound worker cancelled");
    }

    /// Open the stream. Returns `None` on any failure (already logged) or
    /// when cancelled mid-connect.
    async fn connect(&self, cancel: &CancellationToken) -> Option<reqwest::Response> {
        let mut builder = self
            .client
            .get(self.sse_url.clone())
            .header(ACCEPT, "text/event-stream");
        if let Some(profile) = &self.profile {
            builder = builder.header(PROFILE_HEADER, profile);
        }

        let request = match builder.build() {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to build SSE request");
                return None;
            }
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            res = self.client.execute(request) => res,
        };

        match response {
            Ok(response) if response.status() == StatusCode::OK => Some(response),
            Ok(response) => {
                tracing::debug!(url = %self.sse_url, status = response.status().as_u16(), "SSE endpoint returned non-200 status");
                None
            }
            Err(e) => {
                tracing::debug!(url = %self.sse_url, error = %e, "SSE request failed");
                None
            }
        }
    }
}
