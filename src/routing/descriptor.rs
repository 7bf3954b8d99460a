//! Route descriptors: the typed input of the classifier.
//!
//! A descriptor is one (method, path) pair of the backend. Source entries
//! that list several methods expand into one descriptor per method.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::routing::matcher::{PathMatcher, SensitivePrefixMatcher};

/// HTTP methods the gateway understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Ordering used when a source lists methods without an order of its own.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    /// Everything except GET can change backend state.
    pub fn is_mutating(self) -> bool {
        !matches!(self, HttpMethod::Get)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for method names outside [`HttpMethod`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Whether a path falls inside a sensitive namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyTag {
    Normal,
    Sensitive,
}

/// One backend endpoint for one method.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    pub path_template: String,
    pub safety: SafetyTag,
    pub description: Option<String>,
    pub name_override: Option<String>,
    /// JSON schema for the arguments, when the source declares one.
    pub input_schema: Option<serde_json::Value>,
}

impl RouteDescriptor {
    /// Create a descriptor, tagging it against the sensitive prefix set.
    pub fn new(
        method: HttpMethod,
        path_template: impl Into<String>,
        matcher: &SensitivePrefixMatcher,
    ) -> Self {
        let path_template = path_template.into();
        let safety = if matcher.matches(&path_template) {
            SafetyTag::Sensitive
        } else {
            SafetyTag::Normal
        };
        Self {
            method,
            path_template,
            safety,
            description: None,
            name_override: None,
            input_schema: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Expand a multi-method entry into one descriptor per method, in order.
    pub fn expand(
        methods: &[HttpMethod],
        path_template: &str,
        matcher: &SensitivePrefixMatcher,
    ) -> Vec<Self> {
        methods
            .iter()
            .map(|m| Self::new(*m, path_template, matcher))
            .collect()
    }
}
