//! Offline context formatter.
//!
//! Turns a saved search-analysis results file (the output of running the
//! memory layer's search strategies over a fixed query set) into prose
//! context blocks an agent can load as background knowledge.
//!
//! # Data Flow
//! ```text
//! search_analysis_results.json
//!     → results.rs (SearchAnalysis, empty on missing or malformed file)
//!     → formatter.rs (clean content, extract knowledge items, render)
//!     → prompts.rs (example question/response pairs, file output)
//! ```

pub mod formatter;
pub mod prompts;
pub mod results;

pub use formatter::{clean_content, extract_knowledge_items, ContextFormatter, KnowledgeItem, DEFAULT_STRATEGY};
pub use prompts::ExamplePrompt;
pub use results::{QueryResult, SearchAnalysis, StrategyResult};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
