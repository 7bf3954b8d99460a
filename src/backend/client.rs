//! HTTP client for the memory-layer backend.
//!
//! # Responsibilities
//! - Own the single reqwest client used for every backend call
//! - Cap in-flight backend calls with a semaphore
//! - Map connection and timeout failures to `GatewayError::Transport`
//!
//! # Design Decisions
//! - Constructed once at startup and injected, never a global
//! - Excess calls wait for a permit; nothing is rejected
//! - Status codes are returned as-is; callers decide what counts as failure
//! - One attempt per call, no retries
//! - Redirects are returned to the caller, never followed

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::BackendConfig;
use crate::error::GatewayError;

/// A fully buffered backend reply.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BackendResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Body as text, lossy for non UTF-8 content.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Bounded client for the backend service.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    permits: Arc<Semaphore>,
    max_connections: usize,
}

impl BackendClient {
    /// Build the client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(config.url.trim_end_matches('/'))
            .map_err(|e| GatewayError::Transport(format!("invalid backend url {}: {}", config.url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        tracing::info!(
            backend = %base_url,
            timeout_secs = config.timeout_secs,
            max_connections = config.max_connections,
            "Backend client ready"
        );

        Ok(Self {
            http,
            base_url,
            permits: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Currently free call slots.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Join a backend path (and optional query) onto the base URL.
    pub fn url_for(&self, path_and_query: &str) -> Result<Url, GatewayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path_and_query.starts_with('/') {
            format!("{}{}", base, path_and_query)
        } else {
            format!("{}/{}", base, path_and_query)
        };
        Url::parse(&joined).map_err(|e| GatewayError::InvalidArguments(format!("bad backend path {}: {}", path_and_query, e)))
    }

    /// Issue a capability call: JSON body for actions, query string for reads.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<BackendResponse, GatewayError> {
        let url = self.url_for(path)?;
        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await
    }

    /// Forward a native request unchanged.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<BackendResponse, GatewayError> {
        let url = self.url_for(path_and_query)?;
        let request = self.http.request(method, url).headers(headers).body(body);
        self.execute(request).await
    }

    /// GET a JSON document from the backend (used for route discovery).
    pub async fn get_json(&self, path: &str) -> Result<Value, GatewayError> {
        let response = self.call(Method::GET, path, &[], None).await?;
        if !response.status.is_success() {
            return Err(GatewayError::Backend {
                status: response.status.as_u16(),
                body: response.text(),
            });
        }
        serde_json::from_slice(&response.body)
            .map_err(|e| GatewayError::Discovery(format!("{} is not JSON: {}", path, e)))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<BackendResponse, GatewayError> {
        // Held until the body is fully read.
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GatewayError::Transport("backend client closed".to_string()))?;

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(BackendResponse { status, headers, body })
    }

    /// Stop handing out call slots. In-flight calls finish normally.
    pub fn close(&self) {
        self.permits.close();
    }
}
