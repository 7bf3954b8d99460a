//! Gateway error types.
//!
//! Every failure from the backend or the transport propagates to the caller
//! unchanged. Nothing here is retried.

use thiserror::Error;

/// Errors surfaced by capability resolution and invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Unknown capability name or resource URI. Excluded routes land here too.
    #[error("capability not found: {0}")]
    NotFound(String),

    /// Arguments that cannot address the backend route at all.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Backend answered with status >= 400; status and body are verbatim.
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    /// The backend could not be reached or timed out.
    #[error("backend transport error: {0}")]
    Transport(String),

    /// Route discovery failed at startup.
    #[error("route discovery failed: {0}")]
    Discovery(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

impl GatewayError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::NotFound(_) => "not_found",
            GatewayError::InvalidArguments(_) => "invalid_arguments",
            GatewayError::Backend { .. } => "backend_error",
            GatewayError::Transport(_) => "transport_error",
            GatewayError::Discovery(_) => "discovery_error",
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
