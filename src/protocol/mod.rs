//! MCP surface over JSON-RPC 2.0.
//!
//! # Data Flow
//! ```text
//! POST body
//!     → jsonrpc.rs (parse, reject batches and bad framing)
//!     → handler.rs (method → table listing or Dispatcher call)
//!     → types.rs payloads wrapped in a JsonRpcResponse
//! ```

pub mod handler;
pub mod jsonrpc;
pub mod types;

pub use handler::McpHandler;
pub use jsonrpc::{parse_request, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
