//! Client for the memory gateway's JSON-RPC capability surface.
//!
//! ```no_run
//! # async fn run() -> Result<(), gateway_sdk::ClientError> {
//! use gateway_sdk::{GatewayClient, SearchRequest};
//!
//! let client = GatewayClient::new("http://localhost:8002");
//! client.initialize().await?;
//! let hits = client.search(&SearchRequest::new("redis caching", "demo")).await?;
//! println!("{}", hits.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::{ClientError, GatewayClient, DEFAULT_MOUNT_PATH};
pub use types::{
    CallToolResult, CapabilitySummary, Content, IngestTextRequest, ReadResourceResult, Resource,
    ResourceContents, ResourceTemplate, SearchRequest, Tool,
};
