use crate::rag::index::{Document, DocumentMetadata, Snippet};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: Uuid,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: DocumentMetadata,
}

impl VectorRecord {
    pub fn new(document: Document, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: document.content,
            embedding,
            metadata: document.metadata,
        }
    }
}

/// Restricts a search to one app and optionally one source
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchFilter<'a> {
    pub app_id: Option<&'a str>,
    pub url: Option<&'a str>,
}

impl SearchFilter<'_> {
    fn accepts(&self, metadata: &DocumentMetadata) -> bool {
        self.app_id.map_or(true, |app_id| metadata.app_id == app_id)
            && self.url.map_or(true, |url| metadata.url == url)
    }
}

/// In-memory embedding store with brute-force cosine search
#[derive(Debug, Default)]
pub struct VectorStore {
    records: Vec<VectorRecord>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record of `(app_id, url)` and store `records` in their place
    ///
    /// Adding the same source twice therefore never duplicates rows.
    pub fn replace_source(&mut self, app_id: &str, url: &str, records: Vec<VectorRecord>) {
        self.records.retain(|r| !(r.metadata.app_id == app_id && r.metadata.url == url));
        self.records.extend(records);
    }

    /// Most similar records first, at most `limit` of them
    pub fn search(&self, query: &[f32], filter: &SearchFilter<'_>, limit: usize) -> Vec<Snippet> {
        let mut scored: Vec<(f32, &VectorRecord)> = self
            .records
            .iter()
            .filter(|record| filter.accepts(&record.metadata))
            .map(|record| (cosine_similarity(query, &record.embedding), record))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, record)| Snippet {
                content: record.content.clone(),
                metadata: record.metadata.clone(),
                score,
            })
            .collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
