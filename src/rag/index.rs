use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where an indexed row came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub app_id: String,
    /// Path or URL the row was loaded from
    pub url: String,
    /// 1-based data row number, header excluded
    pub row: usize,
}

/// One CSV row rendered as `header: value` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// A retrieved row with its similarity to the question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Ask the LLM for an answer instead of returning the raw prompt
    pub summarize: bool,
    /// Restrict retrieval to rows from this source
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryAnswer {
    /// The summary when summarizing, otherwise the rendered prompt
    pub answer: String,
    pub sources: Vec<Snippet>,
}

impl QueryAnswer {
    /// Retrieved row contents separated by blank lines
    pub fn joined_sources(&self) -> String {
        self.sources
            .iter()
            .map(|snippet| snippet.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Semantic search over tabular sources
#[async_trait]
pub trait SemanticIndex: Send + Sync {
    /// Load and index a source, returning the number of rows indexed
    async fn add(&self, source: &str) -> Result<usize>;

    async fn query(&self, question: &str, options: &QueryOptions) -> Result<QueryAnswer>;
}
