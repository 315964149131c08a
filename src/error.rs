/// Error handling module for MCP Bridge.
///
/// This module defines the error types used throughout the library.
/// Transport failures inside the running bridge are recovered locally and
/// never surface here; these errors cover configuration, installation and
/// the few conditions that end a bridge run.
///
/// # Example
///
/// ```
/// use mcp_bridge::error::{Error, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(_) => println!("Bridge stopped cleanly"),
///         Err(Error::ConfigInvalid(msg)) => println!("Fix the configuration: {}", msg),
///         Err(Error::Cancelled(reason)) => println!("Bridge cancelled: {}", reason),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Errors that can occur in the mcp-bridge library.
///
/// Each variant carries a human-readable description of what went wrong.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to parse configuration from a file or string.
    ///
    /// This error occurs when:
    /// - The configuration YAML is malformed
    /// - Field types are incorrect
    /// - An explicitly requested configuration file cannot be read
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration parsed but contains invalid values.
    ///
    /// This error occurs when:
    /// - The server URL is empty or not a valid URL
    /// - The URL scheme is neither `http` nor `https`
    /// - The POST path or reconnect delay is unusable
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Error in the HTTP transport layer.
    ///
    /// This error occurs when:
    /// - The HTTP client cannot be constructed
    /// - A URL cannot be derived from the configured endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error in serializing or deserializing data.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The host application configuration could not be updated.
    ///
    /// This error occurs when:
    /// - The host config file is not valid JSON
    /// - The file or its directory cannot be read or written
    /// - The platform config directory cannot be determined
    #[error("Install error: {0}")]
    Install(String),

    /// The bridge was cancelled for a reason other than a plain shutdown.
    #[error("Bridge cancelled: {0}")]
    Cancelled(String),

    /// Any other error not covered by the above categories.
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for mcp-bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
