use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default SSE endpoint of the MCP server.
pub const DEFAULT_SSE_URL: &str = "http://localhost:8080/sse";

/// Default path (relative to the base URL) that JSON-RPC requests are POSTed to.
pub const DEFAULT_POST_PATH: &str = "/mcp";

/// Default delay between SSE reconnect attempts, in milliseconds.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;

/// File name looked up in the working directory and then the home directory.
pub const CONFIG_FILE_NAME: &str = ".mcp-bridge.yaml";

/// Prefix shared by all environment overrides (`MCP_BRIDGE_URL`, ...).
pub const ENV_PREFIX: &str = "MCP_BRIDGE_";

/// Bridge configuration.
///
/// Holds the SSE endpoint to connect to, the optional development profile and
/// the debug switch, plus the tuning knobs that have sensible defaults.
///
/// # YAML Schema
///
/// Every field is optional; missing fields take their defaults.
///
/// ```yaml
/// url: https://mcp.example.com/sse
/// profile: staging
/// debug: true
/// post_path: /mcp
/// reconnect_delay_ms: 2000
/// ```
///
/// # Examples
///
/// ```
/// use mcp_bridge::config::Config;
///
/// let config = Config::parse_from_str("url: http://localhost:9000/sse").unwrap();
/// assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:9000/");
/// assert_eq!(config.post_path(), "/mcp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SSE endpoint URL of the MCP server (e.g. `http://localhost:8080/sse`).
    pub url: String,

    /// Profile name forwarded as `X-Profile` when debug is on.
    pub profile: String,

    /// Enables diagnostics on stderr and the development profile header.
    pub debug: bool,

    /// Path appended to the base URL for JSON-RPC POSTs.
    pub post_path: String,

    /// Fixed delay between SSE reconnect attempts.
    pub reconnect_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_SSE_URL.to_string(),
            profile: String::new(),
            debug: false,
            post_path: DEFAULT_POST_PATH.to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
        }
    }
}

impl Config {
    /// Loads a configuration from a YAML file path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be read
    /// * The file contents are not valid YAML
    /// * The YAML does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigParse(format!("Failed to read config file: {}", e)))?;

        Self::parse_from_str(&content)
    }

    /// Parses a configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse YAML config: {}", e)))
    }

    /// Builds the layered configuration: defaults, then the config file, then
    /// `MCP_BRIDGE_*` environment variables.
    ///
    /// With `explicit` set, only that file is read and it must exist.
    /// Otherwise `.mcp-bridge.yaml` is looked up in the current directory and
    /// then in the home directory; a missing file is not an error.
    #[tracing::instrument(skip_all, fields(explicit = ?explicit))]
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let base = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::discover_file() {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "Loading configuration file");
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };

        base.apply_env(std::env::vars())
    }

    /// Applies `MCP_BRIDGE_*` overrides from the given variables.
    ///
    /// Unrelated variables are ignored. Empty values do not override.
    pub fn apply_env<I, K, V>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match name {
                "URL" => self.url = value.to_string(),
                "PROFILE" => self.profile = value.to_string(),
                "DEBUG" => self.debug = parse_bool(value).ok_or_else(|| {
                    Error::ConfigParse(format!("{}DEBUG must be a boolean, got {:?}", ENV_PREFIX, value))
                })?,
                "POST_PATH" => self.post_path = value.to_string(),
                "RECONNECT_DELAY_MS" => {
                    self.reconnect_delay_ms = value.parse().map_err(|e| {
                        Error::ConfigParse(format!("{}RECONNECT_DELAY_MS: {}", ENV_PREFIX, e))
                    })?
                }
                _ => {}
            }
        }
        Ok(self)
    }

    /// Returns the scheme + authority of the SSE URL, with path, query and
    /// fragment stripped.
    ///
    /// `http://localhost:8080/sse?x=1` becomes `http://localhost:8080/`.
    pub fn base_url(&self) -> Result<Url> {
        let mut url = self.sse_url()?;
        url.set_path("");
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// Parses the configured SSE endpoint.
    pub fn sse_url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|e| Error::ConfigInvalid(format!("invalid url: {}", e)))
    }

    /// Path JSON-RPC requests are POSTed to.
    pub fn post_path(&self) -> &str {
        &self.post_path
    }

    fn discover_file() -> Option<PathBuf> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dirs) = directories::BaseDirs::new() {
            candidates.push(dirs.home_dir().join(CONFIG_FILE_NAME));
        }
        candidates.into_iter().find(|p| p.is_file())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
