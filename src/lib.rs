//! Memory gateway library.
//!
//! Turns the HTTP routes of a memory-layer backend into a JSON-RPC
//! tool/resource surface, keeping the backend's native routes reachable
//! through a passthrough.

pub mod backend;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod protocol;
pub mod routing;

pub use config::GatewayConfig;
pub use dispatch::Dispatcher;
pub use error::{GatewayError, GatewayResult};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::CapabilityTable;
