//! MCP method handling over the capability table.
//!
//! # Responsibilities
//! - Answer `initialize`, `ping` and the list methods from the table
//! - Route `tools/call` and `resources/read` through the dispatcher
//! - Shape dispatcher results and failures into MCP replies
//!
//! # Design Decisions
//! - One handler per capability kind: tools are Actions, resources and
//!   templates are the two readable kinds; the table itself knows nothing
//!   about the transport
//! - Backend failures on `tools/call` are in-band (`isError: true`), on
//!   `resources/read` they are JSON-RPC errors carrying status and body

use serde_json::{json, Map, Value};

use crate::dispatch::{Dispatcher, InvocationResult};
use crate::error::GatewayError;
use crate::protocol::jsonrpc::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, METHOD_NOT_FOUND,
    RESOURCE_NOT_FOUND,
};
use crate::protocol::types::{
    negotiate_version, CallToolParams, CallToolResult, Content, Implementation, InitializeResult,
    ReadResourceParams, ReadResourceResult, Resource, ResourceContents, ResourceTemplate, Tool,
};
use crate::routing::classifier::CapabilityKind;
use crate::routing::table::CapabilityEntry;

/// Handles JSON-RPC requests addressed to the capability surface.
#[derive(Debug, Clone)]
pub struct McpHandler {
    dispatcher: Dispatcher,
    server_info: Implementation,
}

impl McpHandler {
    pub fn new(dispatcher: Dispatcher, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            dispatcher,
            server_info: Implementation {
                name: name.into(),
                version: version.into(),
            },
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one request. Notifications produce no reply.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);
        let params = request.params.unwrap_or(Value::Null);

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(&params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(params).await,
            "resources/list" => Ok(self.list_resources()),
            "resources/templates/list" => Ok(self.list_resource_templates()),
            "resources/read" => self.read_resource(params).await,
            "capabilities/list" => Ok(json!({ "capabilities": self.dispatcher.list_capabilities() })),
            other => Err(JsonRpcError::new(METHOD_NOT_FOUND, format!("Method not found: {}", other))),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn initialize(&self, params: &Value) -> Value {
        let requested = params.get("protocolVersion").and_then(Value::as_str);
        let version = negotiate_version(requested);
        tracing::info!(client_version = ?requested, negotiated = version, "Client initialized");

        let table = self.dispatcher.table();
        let instructions = format!(
            "Memory layer gateway: {} tools, {} resources, {} resource templates. \
             Administrative operations are not available through this surface.",
            table.of_kind(CapabilityKind::Action).count(),
            table.of_kind(CapabilityKind::Resource).count(),
            table.of_kind(CapabilityKind::TemplatedResource).count(),
        );

        let result = InitializeResult {
            protocol_version: version.to_string(),
            capabilities: json!({
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false }
            }),
            server_info: self.server_info.clone(),
            instructions: Some(instructions),
        };
        to_value(result)
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Tool> = self
            .dispatcher
            .table()
            .of_kind(CapabilityKind::Action)
            .map(|entry| Tool {
                name: entry.name.clone(),
                description: entry.description.clone(),
                input_schema: input_schema(entry),
            })
            .collect();
        json!({ "tools": tools })
    }

    fn list_resources(&self) -> Value {
        let resources: Vec<Resource> = self
            .dispatcher
            .table()
            .of_kind(CapabilityKind::Resource)
            .map(|entry| Resource {
                uri: entry.uri.clone().unwrap_or_default(),
                name: entry.name.clone(),
                description: entry.description.clone(),
                mime_type: "application/json".to_string(),
            })
            .collect();
        json!({ "resources": resources })
    }

    fn list_resource_templates(&self) -> Value {
        let templates: Vec<ResourceTemplate> = self
            .dispatcher
            .table()
            .of_kind(CapabilityKind::TemplatedResource)
            .map(|entry| ResourceTemplate {
                uri_template: entry.uri.clone().unwrap_or_default(),
                name: entry.name.clone(),
                description: entry.description.clone(),
                mime_type: "application/json".to_string(),
            })
            .collect();
        json!({ "resourceTemplates": templates })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid tools/call params: {}", e)))?;

        // Only actions live in the tool namespace.
        let is_tool = self
            .dispatcher
            .table()
            .get(&params.name)
            .is_some_and(|e| e.kind == CapabilityKind::Action);
        if !is_tool {
            let err = GatewayError::NotFound(params.name);
            return Err(JsonRpcError::from_gateway(&err, INVALID_PARAMS));
        }

        let args = match params.arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                let err = GatewayError::InvalidArguments("tool arguments must be an object".to_string());
                return Err(JsonRpcError::from_gateway(&err, INVALID_PARAMS));
            }
        };

        match self.dispatcher.invoke(&params.name, args).await {
            Ok(result) => Ok(to_value(tool_success(&result))),
            Err(GatewayError::Backend { status, body }) => Ok(to_value(CallToolResult {
                content: vec![Content::Text { text: body.clone() }],
                structured_content: Some(json!({ "status": status, "body": body })),
                is_error: true,
            })),
            Err(err) => Err(JsonRpcError::from_gateway(&err, INVALID_PARAMS)),
        }
    }

    async fn read_resource(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: ReadResourceParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid resources/read params: {}", e)))?;

        let result = self
            .dispatcher
            .read(&params.uri)
            .await
            .map_err(|err| JsonRpcError::from_gateway(&err, RESOURCE_NOT_FOUND))?;

        Ok(to_value(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: params.uri,
                mime_type: result.mime_type().to_string(),
                text: result.body,
            }],
        }))
    }
}

fn tool_success(result: &InvocationResult) -> CallToolResult {
    CallToolResult {
        content: vec![Content::Text {
            text: result.body.clone(),
        }],
        structured_content: result.json().filter(Value::is_object),
        is_error: false,
    }
}

/// Declared schema, or an open object requiring the path placeholders.
fn input_schema(entry: &CapabilityEntry) -> Value {
    if let Some(schema) = &entry.route.input_schema {
        return schema.clone();
    }

    let properties: Map<String, Value> = entry
        .params
        .iter()
        .map(|p| (p.clone(), json!({ "type": "string" })))
        .collect();
    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": true
    });
    if !entry.params.is_empty() {
        schema["required"] = json!(entry.params);
    }
    schema
}

fn to_value<T: serde::Serialize>(value: T) -> Value {
    // Plain data structs with string keys always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::BackendClient;
    use crate::config::BackendConfig;
    use crate::routing::catalog::memory_layer_routes;
    use crate::routing::matcher::SensitivePrefixMatcher;
    use crate::routing::table::CapabilityTable;

    fn handler() -> McpHandler {
        let matcher = SensitivePrefixMatcher::new(["/cache/"]);
        let table = Arc::new(CapabilityTable::build(memory_layer_routes(&matcher), "memory"));
        // Nothing listens here; these tests never reach the backend.
        let client = BackendClient::new(&BackendConfig {
            url: "http://127.0.0.1:9".into(),
            ..BackendConfig::default()
        })
        .unwrap();
        McpHandler::new(Dispatcher::new(table, client), "test-gateway", "0.0.0")
    }

    fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: Some(json!(id)),
            method: method.into(),
            params: Some(params),
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let reply = handler()
            .handle(request(1, "initialize", json!({ "protocolVersion": "2025-03-26" })))
            .await
            .unwrap();
        let result = reply.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "test-gateway");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_lists_follow_table() {
        let h = handler();

        let tools = h.handle(request(1, "tools/list", json!({}))).await.unwrap().result.unwrap();
        let names: Vec<&str> = tools["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["ingest_conversation", "ingest_text", "ingest_code", "ingest_json", "search", "search_code"]
        );
        assert!(!names.contains(&"cache_clear"));

        let resources = h.handle(request(2, "resources/list", json!({}))).await.unwrap().result.unwrap();
        assert_eq!(resources["resources"].as_array().unwrap().len(), 2);

        let templates = h
            .handle(request(3, "resources/templates/list", json!({})))
            .await
            .unwrap()
            .result
            .unwrap();
        assert_eq!(templates["resourceTemplates"][0]["uriTemplate"], "memory://stats/{project_id}");
        assert_eq!(templates["resourceTemplates"][0]["name"], "stats");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let reply = handler()
            .handle(request(4, "tools/call", json!({ "name": "nonexistent_tool", "arguments": {} })))
            .await
            .unwrap();
        let error = reply.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert!(error.message.contains("nonexistent_tool"));
    }

    #[tokio::test]
    async fn test_resources_are_not_tools() {
        let reply = handler()
            .handle(request(5, "tools/call", json!({ "name": "cache_stats" })))
            .await
            .unwrap();
        assert!(reply.error.is_some());
    }

    #[tokio::test]
    async fn test_non_object_arguments_rejected() {
        let reply = handler()
            .handle(request(6, "tools/call", json!({ "name": "ingest_text", "arguments": [1, 2] })))
            .await
            .unwrap();
        assert_eq!(reply.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_method_and_notifications() {
        let h = handler();
        let reply = h.handle(request(7, "prompts/list", json!({}))).await.unwrap();
        assert_eq!(reply.error.unwrap().code, METHOD_NOT_FOUND);

        let note = JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: None,
            method: "notifications/initialized".into(),
            params: None,
        };
        assert!(h.handle(note).await.is_none());
    }

    #[test]
    fn test_default_input_schema_requires_params() {
        let matcher = SensitivePrefixMatcher::default();
        let table = CapabilityTable::build(
            vec![crate::routing::RouteDescriptor::new(
                crate::routing::HttpMethod::Put,
                "/projects/{project_id}",
                &matcher,
            )],
            "memory",
        );
        let schema = input_schema(table.get("projects").unwrap());
        assert_eq!(schema["required"], json!(["project_id"]));
        assert_eq!(schema["properties"]["project_id"]["type"], "string");
    }
}
