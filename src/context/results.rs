//! Search-analysis results file model.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::FormatError;

/// Top-level results document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchAnalysis {
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub project_id: Option<Value>,
    #[serde(default)]
    pub success_rate: Option<Value>,
    #[serde(default)]
    pub total_queries: Option<Value>,
    #[serde(default)]
    pub detailed_results: Vec<QueryResult>,
}

/// One analysed query with its per-strategy outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_context: Option<String>,
    #[serde(default)]
    pub results: BTreeMap<String, StrategyResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl StrategyResult {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

impl SearchAnalysis {
    /// Read and parse a results file.
    pub fn from_file(path: &Path) -> Result<Self, FormatError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Like `from_file`, but a missing or malformed file yields empty data.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(data) => data,
            Err(FormatError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Results file not found");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load results file");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn find(&self, query: &str) -> Option<&QueryResult> {
        self.detailed_results.iter().find(|r| r.query == query)
    }
}

/// Render a loosely typed header field, `unknown` when absent.
pub fn display_field(value: &Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
