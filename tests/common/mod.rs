//! Shared utilities for integration tests: a recording mock of the memory
//! layer and a helper that runs the gateway in front of it.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use memory_gateway::config::GatewayConfig;
use memory_gateway::lifecycle::{bootstrap, Shutdown};

/// A request as the mock backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Highest number of concurrently handled requests seen so far.
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }
}

/// Start the mock memory layer on an ephemeral port.
pub async fn start_mock_backend() -> MockBackend {
    let state = MockState::default();
    let app = Router::new().fallback(mock_handler).with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, state }
}

async fn mock_handler(State(state): State<MockState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let recorded = RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers.clone(),
        body,
    };
    state.requests.lock().unwrap().push(recorded.clone());

    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(current, Ordering::SeqCst);
    let response = route(&recorded).await;
    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    response
}

async fn route(req: &RecordedRequest) -> Response {
    let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();
    match (req.method.as_str(), segments.as_slice()) {
        ("GET", [""]) => Json(json!({ "status": "ok", "service": "memory-layer" })).into_response(),
        ("POST", ["ingest", "text"]) => {
            let body = req.json();
            if body["text"].as_str().unwrap_or("").is_empty() {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": "text must not be empty" })),
                )
                    .into_response();
            }
            Json(json!({
                "status": "success",
                "episode_id": "ep-1",
                "project_id": body["project_id"]
            }))
            .into_response()
        }
        ("POST", ["ingest", "json"]) => {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Json(json!({ "status": "success" })).into_response()
        }
        ("POST", ["search"]) => {
            let body = req.json();
            Json(json!({
                "query": body["query"],
                "results": [
                    { "text": "Use Redis with a TTL", "name": "RECOMMENDS", "score": 0.9 }
                ]
            }))
            .into_response()
        }
        ("GET", ["stats", project_id]) => Json(json!({
            "project_id": urlencoding::decode(project_id).map(|s| s.into_owned()).unwrap_or_default(),
            "episodes": 3
        }))
        .into_response(),
        ("GET", ["cache", "stats"]) => Json(json!({ "hits": 3, "misses": 1 })).into_response(),
        ("POST", ["cache", "clear"]) => Json(json!({ "cleared": true })).into_response(),
        ("GET", ["openapi.json"]) => Json(openapi_document()).into_response(),
        ("GET", ["old"]) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, "/")]).into_response(),
        ("POST", ["moved"]) => {
            (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, "/search")]).into_response()
        }
        ("PUT", ["memories", id]) => Json(json!({
            "id": id,
            "updated": req.json()
        }))
        .into_response(),
        ("GET", ["files", file]) if file.ends_with(".json") => Json(json!({
            "file": urlencoding::decode(file).map(|s| s.into_owned()).unwrap_or_default()
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" }))).into_response(),
    }
}

fn openapi_document() -> Value {
    json!({
        "openapi": "3.1.0",
        "paths": {
            "/ingest/text": {
                "post": {
                    "summary": "Ingest Text",
                    "requestBody": {
                        "content": { "application/json": {
                            "schema": { "$ref": "#/components/schemas/IngestText" }
                        } }
                    }
                }
            },
            "/stats/{project_id}": {
                "get": {
                    "summary": "Project Stats",
                    "parameters": [
                        { "name": "project_id", "in": "path", "required": true, "schema": { "type": "string" } }
                    ]
                }
            },
            "/admin/reset": { "post": { "summary": "Reset" } }
        },
        "components": { "schemas": {
            "IngestText": {
                "type": "object",
                "properties": { "text": { "type": "string" }, "project_id": { "type": "string" } },
                "required": ["text"]
            }
        } }
    })
}

/// A URL nothing listens on.
pub async fn dead_backend_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Gateway config pointing at `backend_url`, bound to an ephemeral port.
pub fn gateway_config(backend_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.backend.url = backend_url.to_string();
    config.backend.timeout_secs = 5;
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

pub struct RunningGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl RunningGateway {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for RunningGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Bootstrap and serve a gateway in the background.
pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let server = bootstrap(config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.triggered();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    RunningGateway { addr, shutdown }
}
