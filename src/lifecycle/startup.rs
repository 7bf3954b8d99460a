//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the backend client and load the route list
//! - Classify routes into the capability table, logging every exclusion
//! - Hand a ready server to the caller; binding happens last
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::backend::BackendClient;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, GatewayConfig};
use crate::dispatch::Dispatcher;
use crate::error::GatewayError;
use crate::http::GatewayServer;
use crate::observability::metrics;
use crate::routing::classifier::CapabilityKind;
use crate::routing::descriptor::RouteDescriptor;
use crate::routing::discovery::load_routes;
use crate::routing::table::CapabilityTable;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics exporter: {0}")]
    Metrics(String),
}

/// Build the gateway from a configuration: client, routes, table, server.
pub async fn bootstrap(config: GatewayConfig) -> Result<GatewayServer, StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    let client = BackendClient::new(&config.backend)?;
    let routes = load_routes(&config, &client).await?;
    let table = Arc::new(build_table(routes, &config.protocol.resource_scheme));

    let dispatcher = Dispatcher::new(table, client);
    Ok(GatewayServer::new(config, dispatcher))
}

/// Classify `routes` into a table and report the result.
pub fn build_table(routes: Vec<RouteDescriptor>, scheme: &str) -> CapabilityTable {
    let discovered = routes.len();
    let table = CapabilityTable::build(routes, scheme);

    for route in table.excluded() {
        tracing::info!(
            method = %route.method,
            path = %route.path_template,
            "Route excluded from capability surface"
        );
    }
    for entry in table.entries() {
        tracing::debug!(
            capability = %entry.name,
            kind = entry.kind.as_str(),
            method = %entry.route.method,
            path = %entry.route.path_template,
            "Capability registered"
        );
    }
    tracing::info!(
        routes = discovered,
        actions = table.of_kind(CapabilityKind::Action).count(),
        resources = table.of_kind(CapabilityKind::Resource).count(),
        templated_resources = table.of_kind(CapabilityKind::TemplatedResource).count(),
        excluded = table.excluded().len(),
        "Capability table built"
    );

    metrics::record_table(&table);
    table
}

/// Bind the configured listener address.
pub async fn bind(config: &GatewayConfig) -> Result<TcpListener, StartupError> {
    let address = config.listener.bind_address.clone();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}
