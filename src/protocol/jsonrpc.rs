//! JSON-RPC 2.0 framing.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GatewayError;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// Backend answered with an error status.
pub const BACKEND_ERROR: i64 = -32000;
/// Unknown resource URI.
pub const RESOURCE_NOT_FOUND: i64 = -32002;

/// An inbound request or notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent (or null) for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Map a gateway failure. `not_found_code` differs between the tool and
    /// resource namespaces.
    pub fn from_gateway(err: &GatewayError, not_found_code: i64) -> Self {
        match err {
            GatewayError::NotFound(name) => JsonRpcError::new(not_found_code, err.to_string())
                .with_data(json!({ "name": name })),
            GatewayError::InvalidArguments(_) => JsonRpcError::new(INVALID_PARAMS, err.to_string()),
            GatewayError::Backend { status, body } => JsonRpcError::new(BACKEND_ERROR, err.to_string())
                .with_data(json!({ "status": status, "body": body })),
            GatewayError::Transport(_) | GatewayError::Discovery(_) => {
                JsonRpcError::new(INTERNAL_ERROR, err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Parse a request body. Failures come back as ready-to-send error responses.
pub fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        JsonRpcResponse::error(Value::Null, JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e)))
    })?;

    if value.is_array() {
        return Err(JsonRpcResponse::error(
            Value::Null,
            JsonRpcError::new(INVALID_REQUEST, "Batch requests are not supported"),
        ));
    }

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(id.clone(), JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)))
    })?;

    if request.jsonrpc != JSONRPC_VERSION {
        return Err(JsonRpcResponse::error(
            id,
            JsonRpcError::new(INVALID_REQUEST, format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
        ));
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let req = parse_request(br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).unwrap();
        assert_eq!(req.id, Some(json!(1)));
        assert_eq!(req.method, "tools/list");
        assert!(req.params.is_none());
        assert!(!req.is_notification());

        let note = parse_request(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(note.is_notification());
    }

    #[test]
    fn test_parse_failures() {
        let err = parse_request(b"{not json").unwrap_err();
        assert_eq!(err.error.unwrap().code, PARSE_ERROR);

        let err = parse_request(br#"[{"jsonrpc":"2.0","id":1,"method":"ping"}]"#).unwrap_err();
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);

        let err = parse_request(br#"{"jsonrpc":"1.0","id":7,"method":"ping"}"#).unwrap_err();
        assert_eq!(err.id, json!(7));
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);

        let err = parse_request(br#"{"jsonrpc":"2.0","id":"a"}"#).unwrap_err();
        assert_eq!(err.id, json!("a"));
    }

    #[test]
    fn test_response_serialization_omits_empty_fields() {
        let ok = serde_json::to_value(JsonRpcResponse::success(json!(1), json!({}))).unwrap();
        assert_eq!(ok, json!({ "jsonrpc": "2.0", "id": 1, "result": {} }));

        let err = serde_json::to_value(JsonRpcResponse::error(
            json!(2),
            JsonRpcError::new(METHOD_NOT_FOUND, "nope"),
        ))
        .unwrap();
        assert_eq!(err, json!({ "jsonrpc": "2.0", "id": 2, "error": { "code": -32601, "message": "nope" } }));
    }

    #[test]
    fn test_gateway_error_mapping() {
        let backend = GatewayError::Backend { status: 422, body: "{\"detail\":\"text empty\"}".into() };
        let mapped = JsonRpcError::from_gateway(&backend, INVALID_PARAMS);
        assert_eq!(mapped.code, BACKEND_ERROR);
        assert_eq!(mapped.data.unwrap()["status"], 422);

        let missing = GatewayError::NotFound("memory://x".into());
        assert_eq!(JsonRpcError::from_gateway(&missing, RESOURCE_NOT_FOUND).code, RESOURCE_NOT_FOUND);
    }
}
