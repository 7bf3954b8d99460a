use std::path::PathBuf;

use clap::Parser;
use memory_gateway::context::prompts::{DEFAULT_CONTEXT_FILE, DEFAULT_PROMPTS_FILE};
use memory_gateway::context::results::display_field;
use memory_gateway::context::{ContextFormatter, SearchAnalysis, DEFAULT_STRATEGY};
use memory_gateway::observability::logging::init_cli_tracing;

/// Queries previewed on stdout.
const PREVIEW_QUERIES: &[&str] = &[
    "async await refactoring",
    "null pointer error fix",
    "bulk user update API",
    "performance optimization N+1 queries",
    "Redis caching strategy",
];
const PREVIEW_CHARS: usize = 300;

#[derive(Parser)]
#[command(name = "format-context")]
#[command(about = "Turn saved search-analysis results into agent context files", long_about = None)]
struct Cli {
    /// Search-analysis results file
    #[arg(default_value = "search_analysis_results.json")]
    results: PathBuf,

    /// Search strategy whose results are rendered
    #[arg(short, long, default_value = DEFAULT_STRATEGY)]
    strategy: String,

    /// Output file for the full context
    #[arg(long, default_value = DEFAULT_CONTEXT_FILE)]
    context_out: PathBuf,

    /// Output file for the example prompts
    #[arg(long, default_value = DEFAULT_PROMPTS_FILE)]
    prompts_out: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_cli_tracing();
    let cli = Cli::parse();

    let data = SearchAnalysis::load_or_empty(&cli.results);
    if data.is_empty() {
        eprintln!("No search results data available");
        return Ok(());
    }
    let formatter = ContextFormatter::new(data);

    let data = formatter.data();
    println!("Loaded results for project: {}", display_field(&data.project_id));
    println!("Total queries analyzed: {}", display_field(&data.total_queries));
    println!("Success rate: {}", display_field(&data.success_rate));

    for query in PREVIEW_QUERIES {
        println!("\n[QUERY] {}", query);
        let context = formatter.format_query_context(query, &cli.strategy);
        if context.chars().count() > PREVIEW_CHARS {
            let preview: String = context.chars().take(PREVIEW_CHARS).collect();
            println!("{}...", preview);
        } else {
            println!("{}", context);
        }
    }

    formatter.save_formatted_context(&cli.context_out, &cli.strategy)?;
    formatter.save_example_prompts(&cli.prompts_out)?;

    println!("\nFiles created:");
    println!("1. {} - Complete knowledge context for agent", cli.context_out.display());
    println!("2. {} - Example user questions and responses", cli.prompts_out.display());
    Ok(())
}
