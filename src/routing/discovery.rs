//! Route discovery.
//!
//! # Data Flow
//! ```text
//! routes.discovery = "static"
//!     → routes.endpoints (when non-empty) or the built-in catalog
//! routes.discovery = "openapi"
//!     → GET {backend}{routes.openapi_path} once at startup
//!     → one descriptor per paths.{path}.{method}
//! ```
//!
//! # Design Decisions
//! - Runs once; the resulting list is never refreshed
//! - OpenAPI paths are walked in key order, methods in GET, POST, PUT,
//!   DELETE, PATCH order, so the same document always yields the same list
//! - Only `#/components/schemas/*` references one level deep are resolved

use serde_json::{json, Map, Value};

use crate::backend::BackendClient;
use crate::config::{DiscoveryMode, EndpointConfig, GatewayConfig};
use crate::error::GatewayError;
use crate::routing::catalog::memory_layer_routes;
use crate::routing::descriptor::{HttpMethod, RouteDescriptor};
use crate::routing::matcher::SensitivePrefixMatcher;

/// Load the backend's route descriptors according to configuration.
pub async fn load_routes(
    config: &GatewayConfig,
    client: &BackendClient,
) -> Result<Vec<RouteDescriptor>, GatewayError> {
    let matcher = SensitivePrefixMatcher::new(config.exclusion.sensitive_prefixes.iter().cloned());

    match config.routes.discovery {
        DiscoveryMode::Static if config.routes.endpoints.is_empty() => {
            tracing::info!("Using built-in memory-layer route catalog");
            Ok(memory_layer_routes(&matcher))
        }
        DiscoveryMode::Static => {
            tracing::info!(endpoints = config.routes.endpoints.len(), "Using configured endpoints");
            from_endpoints(&config.routes.endpoints, &matcher)
        }
        DiscoveryMode::OpenApi => {
            let path = &config.routes.openapi_path;
            tracing::info!(backend = %client.base_url(), path = %path, "Fetching OpenAPI document");
            let doc = client
                .get_json(path)
                .await
                .map_err(|e| GatewayError::Discovery(e.to_string()))?;
            from_openapi(&doc, &matcher)
        }
    }
}

/// Expand configured endpoint entries into descriptors.
pub fn from_endpoints(
    endpoints: &[EndpointConfig],
    matcher: &SensitivePrefixMatcher,
) -> Result<Vec<RouteDescriptor>, GatewayError> {
    let mut routes = Vec::new();
    for endpoint in endpoints {
        for raw in &endpoint.methods {
            let method: HttpMethod = raw
                .parse()
                .map_err(|e: crate::routing::descriptor::UnknownMethod| GatewayError::Discovery(e.to_string()))?;
            let mut route = RouteDescriptor::new(method, endpoint.path.as_str(), matcher);
            if let Some(description) = &endpoint.description {
                route = route.with_description(description.as_str());
            }
            // A shared name on a multi-method entry would collide; only the
            // first method keeps it and the table suffixes the rest.
            if let Some(name) = &endpoint.name {
                route = route.with_name(name.as_str());
            }
            routes.push(route);
        }
    }
    Ok(routes)
}

/// Build descriptors from an OpenAPI 3 document.
pub fn from_openapi(
    doc: &Value,
    matcher: &SensitivePrefixMatcher,
) -> Result<Vec<RouteDescriptor>, GatewayError> {
    let paths = doc
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| GatewayError::Discovery("OpenAPI document has no `paths` object".to_string()))?;

    let mut routes = Vec::new();
    for (path, item) in paths {
        for method in HttpMethod::ALL {
            let key = method.as_str().to_ascii_lowercase();
            let Some(operation) = item.get(&key) else {
                continue;
            };

            let mut route = RouteDescriptor::new(method, path.as_str(), matcher);
            let description = operation
                .get("summary")
                .or_else(|| operation.get("description"))
                .and_then(Value::as_str);
            if let Some(description) = description {
                route = route.with_description(description);
            }
            route = route.with_input_schema(operation_schema(doc, item, operation));
            routes.push(route);
        }
    }

    tracing::debug!(routes = routes.len(), "OpenAPI document parsed");
    Ok(routes)
}

/// Flatten path/query parameters and a JSON object body into one schema.
fn operation_schema(doc: &Value, item: &Value, operation: &Value) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();

    let params = item
        .get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .chain(operation.get("parameters").and_then(Value::as_array).into_iter().flatten());

    for param in params {
        let param = resolve_ref(doc, param);
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        let location = param.get("in").and_then(Value::as_str).unwrap_or("query");
        if location != "path" && location != "query" {
            continue;
        }
        let schema = param
            .get("schema")
            .map(|s| resolve_ref(doc, s).clone())
            .unwrap_or_else(|| json!({ "type": "string" }));
        properties.insert(name.to_string(), schema);

        let is_required = location == "path"
            || param.get("required").and_then(Value::as_bool).unwrap_or(false);
        if is_required && !required.iter().any(|r| r == name) {
            required.push(Value::String(name.to_string()));
        }
    }

    let body_schema = operation
        .pointer("/requestBody/content/application~1json/schema")
        .map(|s| resolve_ref(doc, s));
    if let Some(body) = body_schema {
        if let Some(props) = body.get("properties").and_then(Value::as_object) {
            for (name, schema) in props {
                properties.insert(name.clone(), schema.clone());
            }
        }
        for name in body.get("required").and_then(Value::as_array).into_iter().flatten() {
            if !required.contains(name) {
                required.push(name.clone());
            }
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    Value::Object(schema)
}

fn resolve_ref<'a>(doc: &'a Value, value: &'a Value) -> &'a Value {
    value
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| doc.pointer(pointer))
        .unwrap_or(value)
}
