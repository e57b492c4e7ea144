pub mod ollama;

pub use ollama::{OllamaConfig, OllamaGateway, DEFAULT_EMBEDDING_MODEL};
