//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: JSON-RPC endpoint, capability listing and the
//!   native passthrough fallback
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Serve on a bound listener until shutdown

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::http::passthrough;
use crate::http::request::{request_id, wants_event_stream, MakeRequestUuid};
use crate::http::response::{accepted, rpc_reply, MCP_SESSION_ID};
use crate::protocol::{parse_request, McpHandler};

/// Headroom over the backend timeout before the gateway gives up on a request.
const TIMEOUT_HEADROOM_SECS: u64 = 5;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<McpHandler>,
    pub client: BackendClient,
    pub max_body_size: usize,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    client: BackendClient,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, dispatcher: Dispatcher) -> Self {
        let client = dispatcher.client().clone();
        let handler = McpHandler::new(
            dispatcher,
            config.protocol.server_name.clone(),
            config.protocol.server_version.clone(),
        );
        let state = AppState {
            handler: Arc::new(handler),
            client: client.clone(),
            max_body_size: config.listener.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self { router, config, client }
    }

    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mount = config.protocol.mount_path.trim_end_matches('/');
        let timeout = Duration::from_secs(config.backend.timeout_secs + TIMEOUT_HEADROOM_SECS);

        Router::new()
            .route(mount, post(rpc_handler))
            .route(&format!("{}/capabilities", mount), get(capabilities_handler))
            .fallback(passthrough::forward)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(timeout))
                    .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_size)),
            )
    }

    /// The assembled router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` resolves, then drain.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.protocol.mount_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.client.close();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn rpc_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let request_id = request_id(&headers).to_string();
    let event_stream = wants_event_stream(&headers);

    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(reply) => {
            tracing::warn!(request_id = %request_id, "Malformed JSON-RPC request");
            return rpc_reply(&reply, event_stream);
        }
    };

    let method = request.method.clone();
    tracing::debug!(request_id = %request_id, method = %method, "JSON-RPC request");

    let Some(reply) = state.handler.handle(request).await else {
        return accepted();
    };

    let mut response = rpc_reply(&reply, event_stream);
    if method == "initialize" && reply.error.is_none() {
        let session_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&session_id) {
            response.headers_mut().insert(MCP_SESSION_ID, value);
        }
        tracing::info!(request_id = %request_id, session_id = %session_id, "Session opened");
    }
    response
}

async fn capabilities_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.handler.dispatcher().list_capabilities())
}
