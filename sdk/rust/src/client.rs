use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::types::{
    CallToolResult, CapabilitySummary, IngestTextRequest, ReadResourceResult, Resource,
    ResourceTemplate, SearchRequest, Tool,
};

pub const DEFAULT_MOUNT_PATH: &str = "/mcp";
const PROTOCOL_VERSION: &str = "2025-06-18";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// JSON-RPC client for a running gateway.
pub struct GatewayClient {
    client: Client,
    base_url: String,
    mount_path: String,
    next_id: AtomicU64,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_mount_path(mut self, mount_path: &str) -> Self {
        self.mount_path = mount_path.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a session; returns the server's `initialize` result.
    pub async fn initialize(&self) -> Result<Value, ClientError> {
        let result = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": { "name": "gateway-sdk", "version": env!("CARGO_PKG_VERSION") }
                }),
            )
            .await?;
        self.notify("notifications/initialized").await?;
        Ok(result)
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.request("ping", json!({})).await.map(|_| ())
    }

    pub async fn list_tools(&self) -> Result<Vec<Tool>, ClientError> {
        self.list("tools/list", "tools").await
    }

    pub async fn list_resources(&self) -> Result<Vec<Resource>, ClientError> {
        self.list("resources/list", "resources").await
    }

    pub async fn list_resource_templates(&self) -> Result<Vec<ResourceTemplate>, ClientError> {
        self.list("resources/templates/list", "resourceTemplates").await
    }

    pub async fn list_capabilities(&self) -> Result<Vec<CapabilitySummary>, ClientError> {
        self.list("capabilities/list", "capabilities").await
    }

    /// Call a tool. Backend failures come back as `is_error` results.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ClientError> {
        let result = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ClientError> {
        let result = self.request("resources/read", json!({ "uri": uri })).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn ingest_text(&self, request: &IngestTextRequest) -> Result<CallToolResult, ClientError> {
        self.call_typed("ingest_text", request).await
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<CallToolResult, ClientError> {
        self.call_typed("search", request).await
    }

    /// Native `GET /` on the backend, through the gateway passthrough.
    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(format!("{}/", self.base_url)).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn call_typed<T: Serialize>(&self, name: &str, args: &T) -> Result<CallToolResult, ClientError> {
        self.call_tool(name, serde_json::to_value(args)?).await
    }

    async fn list<T: DeserializeOwned>(&self, method: &str, field: &str) -> Result<Vec<T>, ClientError> {
        let mut result = self.request(method, json!({})).await?;
        let items = result.get_mut(field).map(Value::take).unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(items)?)
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.mount_path)
    }

    async fn notify(&self, method: &str) -> Result<(), ClientError> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&json!({ "jsonrpc": "2.0", "method": method }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .client
            .post(self.endpoint())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let mut reply: Value = serde_json::from_str(&text)?;
        if let Some(error) = reply.get("error") {
            return Err(ClientError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                data: error.get("data").cloned(),
            });
        }
        Ok(reply.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }
}
