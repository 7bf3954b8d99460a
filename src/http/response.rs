//! Response shaping for the JSON-RPC surface and the passthrough.
//!
//! # Responsibilities
//! - Render a JSON-RPC reply as JSON or as a single SSE `message` event
//! - Strip hop-by-hop headers in both directions of the passthrough
//!
//! # Design Decisions
//! - SSE replies carry exactly one event; the stream ends after it
//! - Notifications are acknowledged with 202 and an empty body

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::protocol::JsonRpcResponse;

pub const MCP_SESSION_ID: HeaderName = HeaderName::from_static("mcp-session-id");

/// Headers meaningful only for a single transport hop.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, plus any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .collect();

    for name in HOP_BY_HOP.iter().copied().chain(listed.iter().map(String::as_str)) {
        headers.remove(name);
    }
}

/// Render a JSON-RPC reply in the representation the caller asked for.
pub fn rpc_reply(reply: &JsonRpcResponse, event_stream: bool) -> Response {
    let json = match serde_json::to_string(reply) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize JSON-RPC reply");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if event_stream {
        let frame = format!("event: message\ndata: {}\n\n", json);
        (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            ],
            Body::from(frame),
        )
            .into_response()
    } else {
        (
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            Body::from(json),
        )
            .into_response()
    }
}

/// Reply for an accepted notification.
pub fn accepted() -> Response {
    StatusCode::ACCEPTED.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-private"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-private", HeaderValue::from_static("1"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_rpc_reply_as_event_stream() {
        let reply = JsonRpcResponse::success(json!(1), json!({}));
        let response = rpc_reply(&reply, true);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text, "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n\n");
    }

    #[test]
    fn test_rpc_reply_as_json() {
        let reply = JsonRpcResponse::success(json!(1), json!({}));
        let response = rpc_reply(&reply, false);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }
}
