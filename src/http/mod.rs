//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, middleware)
//!     → request.rs (request ID, Accept negotiation)
//!     → POST {mount}: protocol::McpHandler → response.rs (JSON or SSE)
//!     → GET {mount}/capabilities: capability summaries
//!     → anything else: passthrough.rs → backend, response returned as-is
//! ```

pub mod passthrough;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, GatewayServer};
