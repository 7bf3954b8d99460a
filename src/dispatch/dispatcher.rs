//! Capability invocation.
//!
//! # Responsibilities
//! - Resolve a capability name (or resource URI) in the table
//! - Substitute path placeholders from the arguments
//! - Issue exactly one backend call and hand back its body verbatim
//!
//! # Design Decisions
//! - Field-level validation is left to the backend
//! - Status >= 400 becomes `GatewayError::Backend` with status and body intact
//! - No retries, no backoff, no timeout override at this layer

use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use serde_json::{Map, Value};

use crate::backend::BackendClient;
use crate::error::{GatewayError, GatewayResult};
use crate::observability::metrics;
use crate::routing::classifier::CapabilityKind;
use crate::routing::matcher::{Part, PathTemplate, Segment};
use crate::routing::table::{CapabilityEntry, CapabilitySummary, CapabilityTable};

/// A capability call as received from the protocol layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub name: String,
    pub args: Map<String, Value>,
}

/// Successful backend reply for an invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResult {
    pub capability: String,
    pub kind: CapabilityKind,
    pub status: u16,
    pub content_type: Option<String>,
    /// Backend body, verbatim.
    pub body: String,
}

impl InvocationResult {
    /// The body parsed as JSON, when it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// MIME type to report for resource contents.
    pub fn mime_type(&self) -> &str {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or("application/json")
    }
}

/// Routes invocations to the backend through the capability table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<CapabilityTable>,
    client: BackendClient,
}

impl Dispatcher {
    pub fn new(table: Arc<CapabilityTable>, client: BackendClient) -> Self {
        Self { table, client }
    }

    pub fn table(&self) -> &CapabilityTable {
        &self.table
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Summaries of every exposed capability, in table order.
    pub fn list_capabilities(&self) -> Vec<CapabilitySummary> {
        self.table.summaries()
    }

    /// Invoke a capability by name.
    pub async fn invoke(&self, name: &str, args: Map<String, Value>) -> GatewayResult<InvocationResult> {
        let entry = self
            .table
            .get(name)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(name.to_string()))?;
        self.invoke_entry(&entry, args).await
    }

    /// Invoke a request value produced by the protocol layer.
    pub async fn dispatch(&self, request: InvocationRequest) -> GatewayResult<InvocationResult> {
        self.invoke(&request.name, request.args).await
    }

    /// Read a resource by URI.
    pub async fn read(&self, uri: &str) -> GatewayResult<InvocationResult> {
        let (entry, args) = self
            .table
            .resolve_uri(uri)
            .map(|(entry, args)| (entry.clone(), args))
            .ok_or_else(|| GatewayError::NotFound(uri.to_string()))?;
        self.invoke_entry(&entry, args).await
    }

    async fn invoke_entry(
        &self,
        entry: &CapabilityEntry,
        mut args: Map<String, Value>,
    ) -> GatewayResult<InvocationResult> {
        let start = Instant::now();
        let result = self.call_backend(entry, &mut args).await;

        match &result {
            Ok(r) => {
                tracing::debug!(capability = %entry.name, status = r.status, "Invocation succeeded");
                metrics::record_invocation(&entry.name, entry.kind, "success", start);
            }
            Err(e) => {
                tracing::warn!(capability = %entry.name, error = %e, "Invocation failed");
                metrics::record_invocation(&entry.name, entry.kind, e.kind(), start);
            }
        }
        result
    }

    async fn call_backend(
        &self,
        entry: &CapabilityEntry,
        args: &mut Map<String, Value>,
    ) -> GatewayResult<InvocationResult> {
        let path = render_path(&entry.template, &entry.route.path_template, args)?;

        tracing::debug!(
            capability = %entry.name,
            method = %entry.route.method,
            path = %path,
            "Forwarding invocation"
        );

        let response = match entry.kind {
            CapabilityKind::Action => {
                let body = Value::Object(std::mem::take(args));
                self.client
                    .call(entry.route.method.to_reqwest(), &path, &[], Some(&body))
                    .await?
            }
            CapabilityKind::Resource | CapabilityKind::TemplatedResource => {
                let query = query_pairs(args);
                self.client.call(Method::GET, &path, &query, None).await?
            }
        };

        let status = response.status.as_u16();
        if status >= 400 {
            return Err(GatewayError::Backend {
                status,
                body: response.text(),
            });
        }

        Ok(InvocationResult {
            capability: entry.name.clone(),
            kind: entry.kind,
            status,
            content_type: response.content_type().map(str::to_string),
            body: response.text(),
        })
    }
}

/// Fill `{param}` placeholders from `args`, removing the used keys.
pub fn render_path(
    template: &PathTemplate,
    raw_template: &str,
    args: &mut Map<String, Value>,
) -> GatewayResult<String> {
    let mut path = String::new();
    for segment in template.segments() {
        path.push('/');
        match segment {
            Segment::Literal(lit) => path.push_str(lit),
            Segment::Pattern(parts) => {
                for part in parts {
                    match part {
                        Part::Literal(lit) => path.push_str(lit),
                        Part::Param(name) => path.push_str(&path_value(name, args)?),
                    }
                }
            }
        }
    }

    if path.is_empty() || (raw_template.len() > 1 && raw_template.ends_with('/')) {
        path.push('/');
    }
    Ok(path)
}

/// Take and percent-encode the value for placeholder `name`.
fn path_value(name: &str, args: &mut Map<String, Value>) -> GatewayResult<String> {
    let value = args
        .remove(name)
        .ok_or_else(|| GatewayError::InvalidArguments(format!("missing path parameter `{}`", name)))?;
    let text = scalar_text(&value).ok_or_else(|| {
        GatewayError::InvalidArguments(format!("path parameter `{}` must be a string, number or boolean", name))
    })?;
    Ok(urlencoding::encode(&text).into_owned())
}

/// Remaining read arguments as query pairs. Arrays repeat the key, nulls are
/// skipped, objects are sent as JSON text.
pub fn query_pairs(args: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in args {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            Value::Object(_) => pairs.push((key.clone(), value.to_string())),
            scalar => {
                if let Some(text) = scalar_text(scalar) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
