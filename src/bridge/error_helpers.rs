//! Synthesized JSON-RPC errors for local transport failures.
//!
//! The client must get a well-formed reply to every request even when the
//! server cannot be reached, so outbound failures are turned into an
//! internal-error response with a `null` id.

use crate::transport::json_rpc::{JsonRpcResponse, error_codes};
use serde_json::Value;
use std::fmt::Display;

/// Build the error envelope for a failed `stage` (e.g. `"post request"`).
///
/// The message is `"<stage>: <cause>"`.
///
/// # Examples
///
/// ```
/// use mcp_bridge::bridge::error_helpers::error_envelope;
///
/// let bytes = error_envelope("post request", "connection refused");
/// let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
/// assert_eq!(value["error"]["code"], -32603);
/// assert_eq!(value["error"]["message"], "post request: connection refused");
/// assert!(value["id"].is_null());
/// ```
pub fn error_envelope(stage: &str, cause: impl Display) -> Vec<u8> {
    let response = JsonRpcResponse::error(
        Value::Null,
        error_codes::INTERNAL_ERROR,
        format!("{}: {}", stage, cause),
        None,
    );

    match serde_json::to_vec(&response) {
        Ok(bytes) => bytes,
        Err(e) => {
            // Only reachable if serde_json cannot encode a plain string.
            tracing::error!(error = %e, "Failed to serialize JSON-RPC error envelope");
            br#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"internal error"},"id":null}"#
                .to_vec()
        }
    }
}
