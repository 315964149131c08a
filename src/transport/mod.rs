pub mod json_rpc;
pub mod lines;

pub use json_rpc::{JsonRpcError, JsonRpcResponse, error_codes};
pub use lines::{LineError, MAX_LINE_BYTES, read_line};
