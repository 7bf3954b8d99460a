//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Memory-layer backend the gateway forwards to.
    pub backend: BackendConfig,

    /// Capability surface settings (mount path, server identity).
    pub protocol: ProtocolConfig,

    /// Sensitive path prefixes kept off the capability surface.
    pub exclusion: ExclusionConfig,

    /// Where route descriptors come from.
    pub routes: RoutesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8002").
    pub bind_address: String,

    /// Maximum inbound request body in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8002".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Backend client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the memory-layer service.
    pub url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum in-flight backend calls. Excess calls wait for a slot.
    pub max_connections: usize,

    /// Idle keep-alive connections retained per host.
    pub max_idle_per_host: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            max_connections: 20,
            max_idle_per_host: 5,
        }
    }
}

/// Capability surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Path the JSON-RPC endpoint is mounted at.
    pub mount_path: String,

    /// Server name reported on `initialize`.
    pub server_name: String,

    /// Server version reported on `initialize`.
    pub server_version: String,

    /// URI scheme used for resources (`memory://stats/{project_id}`).
    pub resource_scheme: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            mount_path: "/mcp".to_string(),
            server_name: "ZepAI Memory Layer".to_string(),
            server_version: "2.0.0".to_string(),
            resource_scheme: "memory".to_string(),
        }
    }
}

/// Safety exclusion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// Substrings that mark a mutating route as sensitive.
    pub sensitive_prefixes: Vec<String>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            sensitive_prefixes: vec![
                "/cache/".to_string(),
                "/admin/".to_string(),
                "/langfuse/".to_string(),
                "/config/".to_string(),
                "/innocody/".to_string(),
            ],
        }
    }
}

/// How the backend's routes are learned.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Built-in catalog, or `routes.endpoints` when given.
    #[default]
    Static,
    /// Fetch the backend's OpenAPI document at startup.
    OpenApi,
}

/// Route source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub discovery: DiscoveryMode,

    /// Path of the OpenAPI document on the backend.
    pub openapi_path: String,

    /// Explicit endpoint list. Empty means the built-in catalog.
    pub endpoints: Vec<EndpointConfig>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryMode::Static,
            openapi_path: "/openapi.json".to_string(),
            endpoints: Vec::new(),
        }
    }
}

/// A single backend endpoint, possibly serving several methods.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// HTTP methods served at this path, classified independently.
    pub methods: Vec<String>,

    /// Path template, e.g. `/stats/{project_id}`.
    pub path: String,

    /// Capability name. Derived from the path when absent.
    #[serde(default)]
    pub name: Option<String>,

    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
