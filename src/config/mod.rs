//! Configuration module for MCP Bridge.
//!
//! This module resolves the `{url, profile, debug}` settings the bridge runs
//! with. Values are layered: defaults, an optional `.mcp-bridge.yaml` file,
//! `MCP_BRIDGE_*` environment variables, and finally command-line flags
//! applied by the binary.
//!
//! # Examples
//!
//! Loading the layered configuration:
//!
//! ```no_run
//! use mcp_bridge::config::{Config, validate_config};
//!
//! let config = Config::load(None).unwrap();
//! validate_config(&config).unwrap();
//! println!("Connecting to {}", config.url);
//! ```
//!
//! Creating a configuration programmatically:
//!
//! ```
//! use mcp_bridge::config::Config;
//!
//! let config = Config {
//!     url: "https://mcp.example.com/sse".to_string(),
//!     debug: true,
//!     ..Config::default()
//! };
//! assert_eq!(config.post_path(), "/mcp");
//! ```
mod parser;
pub mod validator;

pub use parser::{
    CONFIG_FILE_NAME, Config, DEFAULT_POST_PATH, DEFAULT_RECONNECT_DELAY_MS, DEFAULT_SSE_URL,
    ENV_PREFIX,
};
pub use validator::validate_config;
