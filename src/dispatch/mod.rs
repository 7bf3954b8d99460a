//! Gateway dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! InvocationRequest (name, args) | resource URI
//!     → CapabilityTable lookup (NotFound if absent or excluded)
//!     → render_path (placeholders from args)
//!     → BackendClient::call (one call, JSON body or query string)
//!     → InvocationResult (verbatim body) | GatewayError
//! ```

pub mod dispatcher;

pub use dispatcher::{Dispatcher, InvocationRequest, InvocationResult};
