//! Prose rendering of search results.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::context::results::{display_field, SearchAnalysis};

pub const DEFAULT_STRATEGY: &str = "rrf";

static NON_ASCII: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x00-\x7F]+").expect("Invalid non-ascii regex"));
static LONG_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"={80,}").expect("Invalid rule regex"));
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").expect("Invalid blank-line regex"));

/// One knowledge item pulled out of a search result payload.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeItem {
    pub relationship: String,
    pub summary: String,
    /// Pre-rendered `Score: 0.000`.
    pub score: String,
    pub raw: Value,
}

/// Strip non-ASCII, shorten long `=` rules and collapse blank-line runs.
pub fn clean_content(content: &str) -> String {
    let content = NON_ASCII.replace_all(content, "");
    let content = LONG_RULE.replace_all(&content, "=".repeat(50).as_str());
    let content = BLANK_RUNS.replace_all(&content, "\n\n");
    content.trim().to_string()
}

/// Parse a result payload's `results[]`. Content that is not JSON yields
/// no items.
pub fn extract_knowledge_items(content: &str) -> Vec<KnowledgeItem> {
    let data: Value = match serde_json::from_str(content) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "Search content is not JSON");
            return Vec::new();
        }
    };

    let Some(results) = data.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .map(|result| {
            let text = str_field(result, "text").unwrap_or("");
            let summary = str_field(result, "summary").unwrap_or(text);
            let name = str_field(result, "name").unwrap_or("Unknown");
            let score = result.get("score").and_then(Value::as_f64).unwrap_or(0.0);

            let mut full = summary.to_string();
            if let Some(path) = str_field(result, "file_path").filter(|s| !s.is_empty()) {
                let _ = write!(full, " (File: {})", path);
            }
            if let Some(kind) = str_field(result, "change_type").filter(|s| !s.is_empty()) {
                let _ = write!(full, " [Type: {}]", kind);
            }
            if let Some(severity) = str_field(result, "severity").filter(|s| !s.is_empty()) {
                let _ = write!(full, " [Severity: {}]", severity);
            }

            KnowledgeItem {
                relationship: title_case(&name.replace('_', " ")),
                summary: full,
                score: format!("Score: {:.3}", score),
                raw: result.clone(),
            }
        })
        .collect()
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// Renders context blocks from a loaded results document.
#[derive(Debug, Clone, Default)]
pub struct ContextFormatter {
    data: SearchAnalysis,
}

impl ContextFormatter {
    pub fn new(data: SearchAnalysis) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &SearchAnalysis {
        &self.data
    }

    /// Context block for a single query.
    pub fn format_query_context(&self, query: &str, strategy: &str) -> String {
        let Some(query_data) = self.data.find(query) else {
            return format!("No search results found for query: '{}'", query);
        };

        let result = query_data.results.get(strategy);
        let Some(result) = result.filter(|r| r.is_success()) else {
            return format!(
                "No successful results for query '{}' with strategy '{}'",
                query, strategy
            );
        };

        let items = extract_knowledge_items(&clean_content(&result.content));

        let mut out = String::new();
        let _ = write!(
            out,
            "KNOWLEDGE CONTEXT FOR: \"{}\"\n{}\n\nSEARCH STRATEGY: {}\nEXPECTED CONTEXT: {}\n\nRELEVANT KNOWLEDGE FOUND:\n",
            query,
            "=".repeat(60),
            strategy.to_uppercase(),
            query_data.expected_context.as_deref().unwrap_or("N/A"),
        );

        for (i, item) in items.iter().enumerate() {
            let _ = write!(
                out,
                "\n{}. RELATIONSHIP: {}\n   KNOWLEDGE: {}\n   RELEVANCE: {}\n",
                i + 1,
                item.relationship,
                item.summary,
                item.score
            );
        }
        if items.is_empty() {
            out.push_str("\nNo structured knowledge items found in results.");
        }

        out.push_str(
            "\nUSAGE INSTRUCTIONS FOR AGENT:\n\
             - Use this knowledge to provide context-aware responses\n\
             - Reference specific relationships and patterns found\n\
             - Combine multiple knowledge items for comprehensive answers\n\
             - Mention that this information comes from past coding sessions\n",
        );
        out
    }

    /// Context block covering every analysed query.
    pub fn format_all_queries_context(&self, strategy: &str) -> String {
        let rule = "=".repeat(80);
        let mut out = String::new();
        let _ = write!(
            out,
            "COMPREHENSIVE KNOWLEDGE CONTEXT\n{rule}\n\n\
             PROJECT: {}\nANALYSIS DATE: {}\nSEARCH SUCCESS RATE: {}\nSTRATEGY: {}\n\n\
             This context contains knowledge extracted from past coding conversations,\n\
             bug fixes, performance optimizations, and implementation patterns.\n\n",
            display_field(&self.data.project_id),
            display_field(&self.data.timestamp),
            display_field(&self.data.success_rate),
            strategy.to_uppercase(),
        );

        for (i, result) in self.data.detailed_results.iter().enumerate() {
            let n = i + 1;
            let _ = write!(
                out,
                "\nKNOWLEDGE DOMAIN {}: {}\n{}\nQUERY: \"{}\"\nEXPECTED TOPICS: {}\n\n",
                n,
                result.description.to_uppercase(),
                "-".repeat(60),
                result.query,
                result.expected_context.as_deref().unwrap_or("N/A"),
            );

            match result.results.get(strategy) {
                Some(sr) if sr.is_success() => {
                    let items = extract_knowledge_items(&clean_content(&sr.content));
                    for (j, item) in items.iter().enumerate() {
                        let _ = write!(
                            out,
                            "  {}.{} {}\n      \u{2192} {}\n",
                            n,
                            j + 1,
                            item.relationship,
                            item.summary
                        );
                    }
                    if items.is_empty() {
                        out.push_str("  No structured knowledge found.\n");
                    }
                }
                other => {
                    let status = other.and_then(|sr| sr.status.as_deref()).unwrap_or("unknown");
                    let _ = writeln!(out, "  Search failed: {}", status);
                }
            }
        }

        let _ = write!(out, "\n\nAGENT USAGE GUIDELINES:\n{rule}\n\n{}", USAGE_GUIDELINES);
        out
    }
}

const USAGE_GUIDELINES: &str = "\
1. CONTEXT INTEGRATION:
   - Use this knowledge to enhance responses about coding topics
   - Reference specific patterns and solutions from past sessions
   - Combine knowledge from multiple domains for comprehensive answers

2. RESPONSE PATTERNS:
   - \"Based on past coding sessions, we've seen...\"
   - \"A similar pattern was used when...\"
   - \"Previous implementations show that...\"
   - \"From our knowledge base, the recommended approach is...\"

3. KNOWLEDGE DOMAINS COVERED:
   - Async/await refactoring patterns
   - Null pointer error fixes and defensive programming
   - API implementation with security considerations
   - Performance optimization (N+1 queries, caching)
   - Redis caching strategies and best practices

4. CONFIDENCE LEVELS:
   - High confidence: Multiple knowledge items support the answer
   - Medium confidence: Some relevant patterns found
   - Low confidence: Limited or indirect knowledge available

5. WHEN TO USE:
   - User asks about coding patterns or best practices
   - User needs examples of past implementations
   - User wants to learn from previous solutions
   - User asks \"how did we handle X before?\"
";
