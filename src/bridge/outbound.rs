//! Standard input → HTTP POST → output queue.

use crate::bridge::queue::PayloadSender;
use crate::bridge::settings::{ConnectionSettings, PROFILE_HEADER};
use crate::error::Result;
use crate::transport::lines::{LineError, read_line};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Forwards newline-delimited JSON-RPC requests to the server.
///
/// Each non-empty input line becomes exactly one POST, and each POST yields
/// exactly one payload on the queue: the verbatim response body on HTTP 200,
/// or a synthesized JSON-RPC error otherwise. Transport failures never stop
/// the worker; only end of input, an oversized line, or cancellation do.
#[derive(Debug, Clone)]
pub struct OutboundWorker {
    client: reqwest::Client,
    post_url: Url,
    profile: Option<String>,
    max_line_bytes: usize,
}

impl OutboundWorker {
    /// Create a worker with its own HTTP client.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        Ok(Self {
            client: settings.http_client()?,
            post_url: settings.post_url()?,
            profile: settings.profile_header().map(str::to_string),
            max_line_bytes: settings.max_line_bytes,
        })
    }

    /// URL requests are POSTed to.
    pub fn post_url(&self) -> &Url {
        &self.post_url
    }

    /// Run until `input` is exhausted or `cancel` fires.
    pub async fn run<R>(&self, mut input: R, queue: PayloadSender, cancel: CancellationToken)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::new();

        loop {
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Outbound worker cancelled");
                    return;
                }
                read = read_line(&mut input, &mut line, self.max_line_bytes) => read,
            };

            match read {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!("Standard input closed, outbound worker finished");
                    return;
                }
                Err(LineError::TooLong { limit }) => {
                    tracing::error!(limit, "Input line too long, no further requests will be read");
                    return;
                }
                Err(LineError::Io(e)) => {
                    tracing::error!(error = %e, "Failed to read standard input");
                    return;
                }
            }

            if line.is_empty() {
                continue;
            }

            match self.forward(std::mem::take(&mut line), &queue, &cancel).await {
                Forwarded::Body(payload) => {
                    if !queue.send(payload, &cancel).await {
                        return;
                    }
                }
                Forwarded::Reported => {}
                Forwarded::Cancelled => return,
            }
        }
    }

    /// POST one request line.
    async fn forward(
        &self,
        body: Vec<u8>,
        queue: &PayloadSender,
        cancel: &CancellationToken,
    ) -> Forwarded {
        let mut builder = self
            .client
            .post(self.post_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(profile) = &self.profile {
            builder = builder.header(PROFILE_HEADER, profile);
        }

        let request = match builder.build() {
            Ok(request) => request,
            Err(e) => {
                queue.send_error("build request", e);
                return Forwarded::Reported;
            }
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Forwarded::Cancelled,
            res = self.client.execute(request) => res,
        };
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %self.post_url, error = %e, "POST failed");
                queue.send_error("post request", e);
                return Forwarded::Reported;
            }
        };

        let status = response.status();
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Forwarded::Cancelled,
            res = response.bytes() => res,
        };
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                queue.send_error("read response", e);
                return Forwarded::Reported;
            }
        };

        if status != StatusCode::OK {
            let text = String::from_utf8_lossy(&body);
            tracing::debug!(url = %self.post_url, status = status.as_u16(), body = %text, "POST returned non-200 status");
            queue.send_error("server error", format!("status {}: {}", status.as_u16(), text));
            return Forwarded::Reported;
        }

        Forwarded::Body(body.to_vec())
    }
}

/// Outcome of one POST.
enum Forwarded {
    /// HTTP 200; the body goes to the client verbatim.
    Body(Vec<u8>),
    /// The failure was already queued as an error response.
    Reported,
    /// Cancellation interrupted the request.
    Cancelled,
}
