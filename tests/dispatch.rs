//! Dispatcher against a mock memory layer.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use memory_gateway::backend::BackendClient;
use memory_gateway::config::BackendConfig;
use memory_gateway::dispatch::{Dispatcher, InvocationRequest};
use memory_gateway::routing::catalog::memory_layer_routes;
use memory_gateway::routing::{CapabilityKind, CapabilityTable, HttpMethod, RouteDescriptor, SensitivePrefixMatcher};
use memory_gateway::GatewayError;

mod common;

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

fn matcher() -> SensitivePrefixMatcher {
    SensitivePrefixMatcher::new(["/cache/", "/admin/", "/langfuse/", "/config/", "/innocody/"])
}

fn dispatcher_with(url: &str, max_connections: usize, routes: Vec<RouteDescriptor>) -> Dispatcher {
    let table = Arc::new(CapabilityTable::build(routes, "memory"));
    let client = BackendClient::new(&BackendConfig {
        url: url.to_string(),
        timeout_secs: 5,
        max_connections,
        ..BackendConfig::default()
    })
    .unwrap();
    Dispatcher::new(table, client)
}

fn dispatcher(url: &str, max_connections: usize) -> Dispatcher {
    dispatcher_with(url, max_connections, memory_layer_routes(&matcher()))
}

fn routes(list: &[(HttpMethod, &str)]) -> Vec<RouteDescriptor> {
    let matcher = matcher();
    list.iter().map(|(m, p)| RouteDescriptor::new(*m, *p, &matcher)).collect()
}

#[tokio::test]
async fn test_action_round_trip() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher(&backend.url(), 20);

    let result = dispatcher
        .invoke("ingest_text", args(json!({ "text": "hello", "project_id": "demo" })))
        .await
        .unwrap();

    assert_eq!(result.status, 200);
    assert_eq!(result.kind, CapabilityKind::Action);
    assert_eq!(result.json().unwrap()["episode_id"], "ep-1");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/ingest/text");
    assert_eq!(requests[0].json(), json!({ "text": "hello", "project_id": "demo" }));
}

#[tokio::test]
async fn test_templated_read_substitutes_placeholder() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher(&backend.url(), 20);

    let result = dispatcher.read("memory://stats/my%20project").await.unwrap();
    assert_eq!(result.json().unwrap()["project_id"], "my project");

    let result = dispatcher
        .dispatch(InvocationRequest {
            name: "stats".into(),
            args: args(json!({ "project_id": "demo", "window": 7 })),
        })
        .await
        .unwrap();
    assert_eq!(result.json().unwrap()["episodes"], 3);

    let requests = backend.requests();
    assert_eq!(requests[0].path, "/stats/my%20project");
    assert_eq!(requests[1].path, "/stats/demo");
    assert_eq!(requests[1].query.as_deref(), Some("window=7"));
    assert!(requests[1].body.is_empty());
}

#[tokio::test]
async fn test_plain_resource_read() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher(&backend.url(), 20);

    let result = dispatcher.read("memory://cache/stats").await.unwrap();
    assert_eq!(result.capability, "cache_stats");
    assert_eq!(result.json().unwrap()["hits"], 3);

    let root = dispatcher.read("memory://root").await.unwrap();
    assert_eq!(root.json().unwrap()["status"], "ok");
    assert_eq!(backend.requests()[1].path, "/");
}

#[tokio::test]
async fn test_unknown_and_excluded_are_not_found() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher(&backend.url(), 20);

    let err = dispatcher.invoke("nonexistent_tool", Map::new()).await.unwrap_err();
    assert_eq!(err, GatewayError::NotFound("nonexistent_tool".into()));

    let err = dispatcher.invoke("cache_clear", Map::new()).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(_)));

    let err = dispatcher.read("memory://nowhere").await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(_)));

    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_backend_error_is_verbatim() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher(&backend.url(), 20);

    let err = dispatcher
        .invoke("ingest_text", args(json!({ "text": "", "project_id": "demo" })))
        .await
        .unwrap_err();

    match err {
        GatewayError::Backend { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, r#"{"detail":"text must not be empty"}"#);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_missing_placeholder_never_reaches_backend() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher(&backend.url(), 20);

    let err = dispatcher.invoke("stats", Map::new()).await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArguments(_)));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let url = common::dead_backend_url().await;
    let dispatcher = dispatcher(&url, 20);

    let err = dispatcher.invoke("search", args(json!({ "query": "x" }))).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn test_connection_cap_bounds_in_flight_calls() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher(&backend.url(), 2);

    let calls = (0..6).map(|_| dispatcher.invoke("ingest_json", Map::new()));
    let results = futures_util::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(backend.request_count(), 6);
    assert!(backend.peak_in_flight() <= 2);
    assert_eq!(dispatcher.client().available_permits(), 2);
}

#[tokio::test]
async fn test_put_action_sends_method_and_remaining_args() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher_with(&backend.url(), 20, routes(&[(HttpMethod::Put, "/memories/{id}")]));

    let result = dispatcher
        .invoke("memories", args(json!({ "id": "m-1", "text": "updated", "tags": ["a"] })))
        .await
        .unwrap();
    assert_eq!(result.kind, CapabilityKind::Action);
    assert_eq!(result.json().unwrap()["id"], "m-1");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].path, "/memories/m-1");
    assert_eq!(requests[0].json(), json!({ "text": "updated", "tags": ["a"] }));
}

#[tokio::test]
async fn test_redirect_is_returned_not_followed() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher_with(
        &backend.url(),
        20,
        routes(&[(HttpMethod::Post, "/moved"), (HttpMethod::Get, "/old")]),
    );

    let result = dispatcher.invoke("moved", args(json!({ "query": "x" }))).await.unwrap();
    assert_eq!(result.status, 307);

    let result = dispatcher.read("memory://old").await.unwrap();
    assert_eq!(result.status, 307);

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/moved");
    assert_eq!(requests[1].path, "/old");
}

#[tokio::test]
async fn test_read_placeholder_inside_segment() {
    let backend = common::start_mock_backend().await;
    let dispatcher = dispatcher_with(&backend.url(), 20, routes(&[(HttpMethod::Get, "/files/{name}.json")]));

    let result = dispatcher.read("memory://files/q3%20report.json").await.unwrap();
    assert_eq!(result.capability, "files_json");
    assert_eq!(result.json().unwrap()["file"], "q3 report.json");
    assert_eq!(backend.requests()[0].path, "/files/q3%20report.json");
}
