use crate::error::Result;
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::LlmMessage;
use crate::rag::config::RagConfig;
use crate::rag::index::{QueryAnswer, QueryOptions, SemanticIndex, Snippet};
use crate::rag::loader::CsvLoader;
use crate::rag::store::{SearchFilter, VectorRecord, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

const QA_INSTRUCTIONS: &str = "You are a Q&A expert system. Your answers must be grounded in \
the context provided with each query. Do not use prior knowledge. If the context does not contain \
the answer, say that the provided data does not answer the question.";

/// Semantic index backed by an [`LlmGateway`] for embeddings and summaries
pub struct EmbeddingIndex {
    gateway: Arc<dyn LlmGateway>,
    config: RagConfig,
    loader: CsvLoader,
    store: RwLock<VectorStore>,
}

impl EmbeddingIndex {
    pub fn new(gateway: Arc<dyn LlmGateway>, config: RagConfig) -> Self {
        Self {
            gateway,
            config,
            loader: CsvLoader::new(),
            store: RwLock::new(VectorStore::new()),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Number of rows currently indexed, across all sources
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.gateway.calculate_embeddings(text, Some(&self.config.embedding_model)).await
    }
}

#[async_trait]
impl SemanticIndex for EmbeddingIndex {
    async fn add(&self, source: &str) -> Result<usize> {
        let documents = self.loader.load(source, &self.config.app_id).await?;

        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            let embedding = self.embed(&document.content).await?;
            records.push(VectorRecord::new(document, embedding));
        }

        let count = records.len();
        self.store.write().await.replace_source(&self.config.app_id, source, records);
        info!("Indexed {} rows from {}", count, source);

        Ok(count)
    }

    async fn query(&self, question: &str, options: &QueryOptions) -> Result<QueryAnswer> {
        let query_embedding = self.embed(question).await?;

        let filter = SearchFilter {
            app_id: Some(&self.config.app_id),
            url: options.source.as_deref(),
        };
        let sources =
            self.store.read().await.search(&query_embedding, &filter, self.config.number_documents);
        debug!("Retrieved {} snippets for query", sources.len());

        let prompt = render_prompt(question, &sources);

        let answer = if options.summarize {
            let config = CompletionConfig {
                temperature: self.config.temperature,
                ..Default::default()
            };
            let response = self
                .gateway
                .complete(&self.config.llm_model, &[LlmMessage::user(prompt)], &config)
                .await?;
            response.content.unwrap_or_default()
        } else {
            prompt
        };

        Ok(QueryAnswer { answer, sources })
    }
}

fn render_prompt(question: &str, sources: &[Snippet]) -> String {
    let context = sources
        .iter()
        .map(|snippet| snippet.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nContext information:\n----------------------\n{}\n----------------------\n\nQuery: {}\nAnswer:",
        QA_INSTRUCTIONS, context, question
    )
}
