//! Optional semantic search capability.
//!
//! The capability is acquired once with [`SearchCapability::probe`]. If anything
//! goes wrong (feature not compiled in, backend unreachable, embedding model
//! missing, bad configuration) the result is [`SearchCapability::Absent`] and every
//! call routed through it resolves to [`UNAVAILABLE_MESSAGE`] instead of an error.
//! A failed probe is never retried; build a new capability to try again.

use crate::error::CapabilityError;
use crate::llm::gateway::LlmGateway;
use crate::rag::{QueryAnswer, QueryOptions, RagConfig, SemanticIndex};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Returned by capability queries when semantic search cannot be used
pub const UNAVAILABLE_MESSAGE: &str = "The semantic search capability is not available \
(or failed to load). Build with the 'semantic-search' feature and make sure Ollama is running \
with the configured embedding model pulled to enable CSV semantic search.";

#[derive(Clone)]
pub enum SearchCapability {
    Present(Arc<dyn SemanticIndex>),
    Absent(CapabilityError),
}

impl SearchCapability {
    /// Try to acquire the semantic index, falling back to `Absent` on any failure
    pub async fn probe(config: RagConfig, gateway: Arc<dyn LlmGateway>) -> Self {
        match acquire(config, gateway).await {
            Ok(index) => {
                info!("CSV semantic search capability acquired");
                SearchCapability::Present(index)
            }
            Err(reason) => {
                warn!("CSV semantic search disabled: {}", reason);
                SearchCapability::Absent(reason)
            }
        }
    }

    /// Wrap an index that is already known to work
    pub fn from_index(index: Arc<dyn SemanticIndex>) -> Self {
        SearchCapability::Present(index)
    }

    pub fn absent(reason: CapabilityError) -> Self {
        SearchCapability::Absent(reason)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SearchCapability::Present(_))
    }

    pub fn unavailable_reason(&self) -> Option<&CapabilityError> {
        match self {
            SearchCapability::Present(_) => None,
            SearchCapability::Absent(reason) => Some(reason),
        }
    }

    /// Register a source; a no-op when absent, failures are logged and swallowed
    ///
    /// Returns whether the source was indexed.
    pub async fn add(&self, source: &str) -> bool {
        match self {
            SearchCapability::Present(index) => match index.add(source).await {
                Ok(_) => true,
                Err(e) => {
                    warn!("Failed to index {}: {}", source, CapabilityError::from(e));
                    false
                }
            },
            SearchCapability::Absent(_) => {
                debug!("Ignoring source {} while semantic search is unavailable", source);
                false
            }
        }
    }

    pub async fn try_query(
        &self,
        question: &str,
        options: &QueryOptions,
    ) -> std::result::Result<QueryAnswer, CapabilityError> {
        match self {
            SearchCapability::Present(index) => {
                index.query(question, options).await.map_err(CapabilityError::from)
            }
            SearchCapability::Absent(reason) => Err(reason.clone()),
        }
    }

    /// Query and collapse the outcome to text
    ///
    /// With `summarize` the LLM answer is returned, otherwise the retrieved rows
    /// separated by blank lines.
    pub async fn query(&self, question: &str, options: &QueryOptions) -> String {
        match self.try_query(question, options).await {
            Ok(answer) if options.summarize => answer.answer,
            Ok(answer) => answer.joined_sources(),
            Err(reason) => {
                if self.is_available() {
                    warn!("Semantic search query failed: {}", reason);
                }
                UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }
}

impl fmt::Debug for SearchCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchCapability::Present(_) => f.write_str("SearchCapability::Present"),
            SearchCapability::Absent(reason) => {
                f.debug_tuple("SearchCapability::Absent").field(reason).finish()
            }
        }
    }
}

#[cfg(feature = "semantic-search")]
async fn acquire(
    config: RagConfig,
    gateway: Arc<dyn LlmGateway>,
) -> std::result::Result<Arc<dyn SemanticIndex>, CapabilityError> {
    use crate::rag::EmbeddingIndex;

    config.validate()?;

    let models = gateway.get_available_models().await.map_err(|e| {
        CapabilityError::DependencyMissing(format!("embedding backend unreachable: {}", e))
    })?;

    if !model_listed(&models, &config.embedding_model) {
        return Err(CapabilityError::Incompatible(format!(
            "embedding model '{}' is not available on the backend",
            config.embedding_model
        )));
    }

    Ok(Arc::new(EmbeddingIndex::new(gateway, config)))
}

#[cfg(not(feature = "semantic-search"))]
async fn acquire(
    _config: RagConfig,
    _gateway: Arc<dyn LlmGateway>,
) -> std::result::Result<Arc<dyn SemanticIndex>, CapabilityError> {
    Err(CapabilityError::DependencyMissing(
        "built without the 'semantic-search' feature".to_string(),
    ))
}

// "mxbai-embed-large" matches "mxbai-embed-large:latest"
#[cfg(feature = "semantic-search")]
fn model_listed(models: &[String], wanted: &str) -> bool {
    models
        .iter()
        .any(|name| name == wanted || (!wanted.contains(':') && name.split(':').next() == Some(wanted)))
}
