//! CSV semantic search example
//!
//! Probes Ollama for the embedding model, binds the tool to a CSV and runs a few
//! queries. If Ollama is not running the tool still works, it just answers with
//! the "disabled" message.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example csv_search -- path/to/data.csv "Which rows mention London?"
//! ```
//!
//! # Requirements
//!
//! - Ollama running locally (http://localhost:11434) or at `OLLAMA_HOST`
//! - The embedding model pulled: `ollama pull mxbai-embed-large`
//! - For summaries, the chat model named by `AGENT_TOOLS_LLM_MODEL`

use agent_tools::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let csv = args.next().unwrap_or_else(|| "demos/data/people.csv".to_string());
    let question = args.next().unwrap_or_else(|| "Who works in London?".to_string());

    let config = RagConfig::from_env()?;
    let capability = SearchCapability::probe(config, Arc::new(OllamaGateway::new())).await;
    println!("Semantic search available: {}\n", capability.is_available());

    let tool = CsvSearchTool::new(capability.clone()).bind_csv(&csv).await;
    let query = HashMap::from([("query".to_string(), json!(question))]);

    println!("Raw rows:\n{}\n", tool.run_async(&query).await);

    let summarizing = CsvSearchTool::new(capability).with_summarize(true).bind_csv(&csv).await;
    println!("Summary:\n{}", summarizing.run_async(&query).await);

    Ok(())
}
