use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::MAX_LINE_BYTES;
use std::time::Duration;
use url::Url;

/// Capacity of the shared output queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Header carrying the development profile.
pub const PROFILE_HEADER: &str = "X-Profile";

/// Immutable connection settings for one bridge run.
///
/// Derived from a validated [`Config`]; every worker gets its own copy.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Scheme and authority of the server, without path.
    pub base_url: Url,
    /// Endpoint of the SSE stream.
    pub sse_url: Url,
    /// Path JSON-RPC requests are POSTed to.
    pub post_path: String,
    /// Development profile name; empty when unset.
    pub profile: String,
    /// Diagnostics and profile header switch.
    pub debug: bool,
    /// Fixed delay between SSE reconnect attempts.
    pub reconnect_delay: Duration,
    /// Capacity of the shared output queue.
    pub queue_capacity: usize,
    /// Maximum length of one input or SSE line.
    pub max_line_bytes: usize,
}

impl ConnectionSettings {
    /// Build settings from a configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url()?,
            sse_url: config.sse_url()?,
            post_path: config.post_path().to_string(),
            profile: config.profile.clone(),
            debug: config.debug,
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_line_bytes: MAX_LINE_BYTES,
        })
    }

    /// `base_url + post_path`
    pub fn post_url(&self) -> Result<Url> {
        self.base_url
            .join(&self.post_path)
            .map_err(|e| Error::Transport(format!("invalid post url: {}", e)))
    }

    /// Value for the `X-Profile` header, sent only in debug mode.
    pub fn profile_header(&self) -> Option<&str> {
        if self.debug && !self.profile.is_empty() {
            Some(&self.profile)
        } else {
            None
        }
    }

    /// HTTP client for one worker.
    ///
    /// No request timeout is set: POST responses and the SSE stream may both
    /// stay open for a long time.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))
    }
}
