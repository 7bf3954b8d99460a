//! Example prompts and file output.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::formatter::{ContextFormatter, DEFAULT_STRATEGY};
use crate::context::FormatError;

pub const DEFAULT_CONTEXT_FILE: &str = "agent_knowledge_context.txt";
pub const DEFAULT_PROMPTS_FILE: &str = "agent_example_prompts.json";

/// A user question paired with the context an agent would receive and a
/// sample answer built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamplePrompt {
    pub user_question: String,
    pub agent_context: String,
    pub sample_response: String,
}

const ASYNC_RESPONSE: &str = r#"Based on past coding sessions, here's the recommended approach for async/await conversion:

**From our knowledge base:**
- Convert `def` to `async def` for database functions
- Use `await` for all I/O operations (database calls, API requests)
- Switch to async libraries like `asyncpg` for PostgreSQL
- Update all callers to use `await` when calling the converted functions

**Implementation pattern we've used:**
```python
# Before: user = get_user_data(user_id)
# After:  user = await get_user_data(user_id)
```

This pattern has shown significant performance improvements in previous implementations, with response times improving from 450ms to 85ms (81% faster) and the ability to handle 10x concurrent requests."#;

const NULL_FIX_RESPONSE: &str = r#"Based on similar issues we've resolved before, this is typically a defensive programming problem:

**From past bug fixes:**
- The error occurs when `customer_email` can be None for guest checkouts
- Code assumes all payments have customer emails without checking
- Solution: Use defensive programming with proper null checks

**Recommended fix pattern:**
```python
# Before: theme = user_data['user_preferences']['theme']
# After:  
preferences = user_data.get('user_preferences', {})
theme = preferences.get('theme', 'default')
```

**Additional improvements from our knowledge base:**
- Add default value initialization for new users
- Include comprehensive test cases for null scenarios
- Add logging for None cases to track frequency"#;

impl ContextFormatter {
    /// Two worked examples: async refactoring and null-pointer fixes.
    pub fn example_prompts(&self) -> Vec<ExamplePrompt> {
        vec![
            ExamplePrompt {
                user_question: "How should I convert my synchronous database functions to async/await?".to_string(),
                agent_context: self.format_query_context("async await refactoring", DEFAULT_STRATEGY),
                sample_response: ASYNC_RESPONSE.to_string(),
            },
            ExamplePrompt {
                user_question: "I'm getting NoneType errors in my payment processing. How should I fix this?"
                    .to_string(),
                agent_context: self.format_query_context("null pointer error fix", DEFAULT_STRATEGY),
                sample_response: NULL_FIX_RESPONSE.to_string(),
            },
        ]
    }

    /// Write the all-queries context for `strategy` to `path`.
    pub fn save_formatted_context(&self, path: &Path, strategy: &str) -> Result<(), FormatError> {
        fs::write(path, self.format_all_queries_context(strategy))?;
        tracing::info!(path = %path.display(), "Agent context saved");
        Ok(())
    }

    /// Write the example prompts as pretty JSON to `path`.
    pub fn save_example_prompts(&self, path: &Path) -> Result<(), FormatError> {
        let json = serde_json::to_string_pretty(&self.example_prompts())?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Example prompts saved");
        Ok(())
    }
}
