use crate::error::{AgentToolsError, Result};
use crate::llm::gateways::DEFAULT_EMBEDDING_MODEL;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default chat model used to summarize retrieved rows
pub const DEFAULT_LLM_MODEL: &str = "llama3.2";

/// Settings for the semantic index behind the CSV search tool
///
/// Every field has a default, so a partial JSON object such as
/// `{"embedding_model": "nomic-embed-text"}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Namespace for indexed rows; queries only see rows added under the same id
    pub app_id: String,
    pub embedding_model: String,
    pub llm_model: String,
    /// How many rows are retrieved as context for each query
    pub number_documents: usize,
    pub temperature: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            app_id: uuid::Uuid::new_v4().to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            number_documents: 3,
            temperature: 0.0,
        }
    }
}

impl RagConfig {
    /// Build from `AGENT_TOOLS_*` environment variables, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a dictionary-style JSON configuration
    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| AgentToolsError::ConfigError(format!("invalid RAG config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(app_id) = lookup("AGENT_TOOLS_APP_ID") {
            config.app_id = app_id;
        }
        if let Some(model) = lookup("AGENT_TOOLS_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Some(model) = lookup("AGENT_TOOLS_LLM_MODEL") {
            config.llm_model = model;
        }
        if let Some(raw) = lookup("AGENT_TOOLS_NUMBER_DOCUMENTS") {
            config.number_documents = raw.trim().parse().map_err(|_| {
                AgentToolsError::ConfigError(format!(
                    "AGENT_TOOLS_NUMBER_DOCUMENTS must be a positive integer, got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(raw) = lookup("AGENT_TOOLS_TEMPERATURE") {
            config.temperature = raw.trim().parse().map_err(|_| {
                AgentToolsError::ConfigError(format!(
                    "AGENT_TOOLS_TEMPERATURE must be a number, got '{}'",
                    raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(AgentToolsError::ConfigError("app_id must not be empty".to_string()));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(AgentToolsError::ConfigError(
                "embedding_model must not be empty".to_string(),
            ));
        }
        if self.llm_model.trim().is_empty() {
            return Err(AgentToolsError::ConfigError("llm_model must not be empty".to_string()));
        }
        if self.number_documents == 0 {
            return Err(AgentToolsError::ConfigError(
                "number_documents must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AgentToolsError::ConfigError(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}
