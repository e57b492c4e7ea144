//! Semantic search over CSV data.
//!
//! The index types and configuration are always available so callers can name
//! them; the loader, the vector store and [`EmbeddingIndex`] are only compiled
//! with the `semantic-search` feature.

pub mod config;
#[cfg(feature = "semantic-search")]
pub mod embedding_index;
pub mod index;
#[cfg(feature = "semantic-search")]
pub mod loader;
#[cfg(feature = "semantic-search")]
pub mod store;

pub use config::RagConfig;
#[cfg(feature = "semantic-search")]
pub use embedding_index::EmbeddingIndex;
pub use index::{Document, DocumentMetadata, QueryAnswer, QueryOptions, SemanticIndex, Snippet};
