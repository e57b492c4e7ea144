use crate::error::{AgentToolsError, Result};
use crate::rag::index::{Document, DocumentMetadata};
use reqwest::Client;
use tracing::debug;

/// Turns a CSV file or URL into one [`Document`] per data row
///
/// The first record is the header. Each following record becomes
/// `"header1: value1, header2: value2"` so the row keeps its column names when
/// embedded on its own.
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    client: Client,
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self, source: &str, app_id: &str) -> Result<Vec<Document>> {
        let raw = if is_url(source) {
            debug!("Fetching CSV from {}", source);
            let response = self.client.get(source).send().await?;
            if !response.status().is_success() {
                return Err(AgentToolsError::ApiError(format!(
                    "Failed to fetch CSV {}: {}",
                    source,
                    response.status()
                )));
            }
            response.text().await?
        } else {
            debug!("Reading CSV from {}", source);
            tokio::fs::read_to_string(source).await?
        };

        parse_rows(&raw, source, app_id)
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Parse CSV text into row documents
///
/// Fully blank rows are skipped but still counted, so `row` always points at
/// the record's position in the source.
pub fn parse_rows(raw: &str, source: &str, app_id: &str) -> Result<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers = reader.headers()?.clone();
    let mut documents = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|value| value.is_empty()) {
            continue;
        }

        let content = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{}: {}", header, value))
            .collect::<Vec<_>>()
            .join(", ");

        documents.push(Document {
            content,
            metadata: DocumentMetadata {
                app_id: app_id.to_string(),
                url: source.to_string(),
                row: index + 1,
            },
        });
    }

    if documents.is_empty() {
        return Err(AgentToolsError::ToolError(format!(
            "CSV source {} contains no data rows",
            source
        )));
    }

    Ok(documents)
}
