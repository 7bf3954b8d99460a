//! Native passthrough to the backend.
//!
//! Every request outside the capability mount path is forwarded unchanged:
//! method, path, query, headers (minus hop-by-hop and `Host`) and body. The
//! classifier's exclusions do not apply here.

use std::time::Instant;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::http::response::strip_hop_by_hop;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn forward(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();
    let method = parts.method.clone();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Passthrough body rejected");
            metrics::record_passthrough(method.as_str(), 413, start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path_and_query,
        "Forwarding native request"
    );

    match state.client.forward(method.clone(), &path_and_query, headers, body).await {
        Ok(upstream) => {
            let status = upstream.status;
            metrics::record_passthrough(method.as_str(), status.as_u16(), start);

            let mut headers = upstream.headers;
            strip_hop_by_hop(&mut headers);
            headers.remove(header::CONTENT_LENGTH);

            let mut response = Response::new(Body::from(upstream.body));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(err) => {
            let status = match err {
                GatewayError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            tracing::error!(request_id = %request_id, path = %path_and_query, error = %err, "Passthrough failed");
            metrics::record_passthrough(method.as_str(), status.as_u16(), start);
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
