//! Decides which server-pushed SSE payloads are JSON-RPC responses.

use serde_json::{Map, Value};

/// Returns `true` when `data` is a JSON object with a top-level `result` or
/// `error` member.
///
/// Anything else, including malformed JSON and endpoint advertisements such
/// as `{"url":"/mcp"}`, is transport signaling and must not reach the client.
pub fn is_forwardable(data: &[u8]) -> bool {
    match serde_json::from_slice::<Map<String, Value>>(data) {
        Ok(object) => object.contains_key("result") || object.contains_key("error"),
        Err(_) => false,
    }
}
