use serde::Serialize;
use serde_json::Value;

/// JSON-RPC protocol version
pub const JSON_RPC_VERSION: &str = "2.0";

/// Standard JSON-RPC error codes
pub mod error_codes {
    /// Internal JSON-RPC error; used for every locally synthesized bridge failure
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// A JSON-RPC error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC error response
///
/// `id` is always serialized, including when it is `null`, because a
/// response that cannot be correlated with a request must still carry the
/// member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC protocol version
    pub jsonrpc: String,
    /// Error details
    pub error: JsonRpcError,
    /// Request ID
    pub id: Value,
}

impl JsonRpcResponse {
    /// Create a new error JSON-RPC response
    pub fn error(
        id: impl Into<Value>,
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            error: JsonRpcError {
                code,
                message: message.into(),
                data,
            },
            id: id.into(),
        }
    }
}
