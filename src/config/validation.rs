//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, connection caps > 0)
//! - Check addresses and URLs parse
//! - Check route entries use known methods and absolute paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::descriptor::HttpMethod;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be > 0"));
    }

    match Url::parse(&config.backend.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "backend.url",
            format!("unsupported scheme: {}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("backend.url", e.to_string())),
    }
    if config.backend.timeout_secs == 0 {
        errors.push(ValidationError::new("backend.timeout_secs", "must be > 0"));
    }
    if config.backend.max_connections == 0 {
        errors.push(ValidationError::new("backend.max_connections", "must be > 0"));
    }

    let mount = &config.protocol.mount_path;
    if !mount.starts_with('/') || mount.len() < 2 || mount.ends_with('/') {
        errors.push(ValidationError::new(
            "protocol.mount_path",
            format!("must look like /name without a trailing slash: {}", mount),
        ));
    }
    let scheme = &config.protocol.resource_scheme;
    if scheme.is_empty()
        || !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    {
        errors.push(ValidationError::new(
            "protocol.resource_scheme",
            format!("invalid URI scheme: {:?}", scheme),
        ));
    }

    for (i, prefix) in config.exclusion.sensitive_prefixes.iter().enumerate() {
        if prefix.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("exclusion.sensitive_prefixes[{}]", i),
                "must not be empty",
            ));
        }
    }

    if !config.routes.openapi_path.starts_with('/') {
        errors.push(ValidationError::new(
            "routes.openapi_path",
            "must start with '/'",
        ));
    }

    for (i, endpoint) in config.routes.endpoints.iter().enumerate() {
        let field = format!("routes.endpoints[{}]", i);
        if !endpoint.path.starts_with('/') {
            errors.push(ValidationError::new(
                format!("{}.path", field),
                format!("must start with '/': {}", endpoint.path),
            ));
        }
        if endpoint.methods.is_empty() {
            errors.push(ValidationError::new(
                format!("{}.methods", field),
                "at least one method is required",
            ));
        }
        for method in &endpoint.methods {
            if method.parse::<HttpMethod>().is_err() {
                errors.push(ValidationError::new(
                    format!("{}.methods", field),
                    format!("unsupported method: {}", method),
                ));
            }
        }
    }

    if config.observability.log_format != "pretty" && config.observability.log_format != "json" {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected \"pretty\" or \"json\", got {:?}", config.observability.log_format),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
