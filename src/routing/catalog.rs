//! Built-in route catalog of the memory-layer service.

use crate::routing::descriptor::{HttpMethod, RouteDescriptor};
use crate::routing::matcher::SensitivePrefixMatcher;

const CATALOG: &[(HttpMethod, &str, &str)] = &[
    (HttpMethod::Get, "/", "Health check of the memory layer"),
    (HttpMethod::Post, "/ingest/conversation", "Ingest a conversation context (messages, context files, tool calls)"),
    (HttpMethod::Post, "/ingest/text", "Ingest a plain text memory"),
    (HttpMethod::Post, "/ingest/code", "Ingest a code change"),
    (HttpMethod::Post, "/ingest/json", "Ingest structured JSON data"),
    (HttpMethod::Post, "/search", "Search the knowledge graph"),
    (HttpMethod::Post, "/search/code", "Search recorded code changes"),
    (HttpMethod::Get, "/stats/{project_id}", "Statistics for a project"),
    (HttpMethod::Get, "/cache/stats", "Cache statistics"),
    (HttpMethod::Post, "/cache/clear", "Clear the cache"),
];

/// Descriptors for the memory-layer's declared routes.
pub fn memory_layer_routes(matcher: &SensitivePrefixMatcher) -> Vec<RouteDescriptor> {
    CATALOG
        .iter()
        .map(|(method, path, description)| {
            RouteDescriptor::new(*method, *path, matcher).with_description(*description)
        })
        .collect()
}
