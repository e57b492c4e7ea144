use crate::capability::SearchCapability;
use crate::error::{AgentToolsError, Result};
use crate::llm::tools::{LlmTool, ToolDescriptor};
use crate::rag::QueryOptions;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tracing::debug;

/// Returned by the tool for well-formed calls when semantic search is unavailable
pub const DISABLED_MESSAGE: &str = "CSV semantic search tool is disabled: missing the \
'semantic-search' capability. Build with the 'semantic-search' feature and start Ollama with \
the configured embedding model to enable.";

pub const MISSING_QUERY_MESSAGE: &str = "Please provide a query to search the CSV's content.";

pub const MISSING_CSV_MESSAGE: &str = "Please provide a CSV to search.";

const DEFAULT_NAME: &str = "Search a CSV's content";
const DEFAULT_DESCRIPTION: &str =
    "A tool that can be used to semantic search a query from a CSV's content.";

/// Arguments when the tool was bound to a CSV at construction
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FixedCsvSearchArgs {
    /// Mandatory search query you want to use to search the CSV's content
    pub query: String,
}

/// Arguments when the caller chooses the CSV on every call
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CsvSearchArgs {
    /// Mandatory search query you want to use to search the CSV's content
    pub query: String,
    /// Mandatory csv path you want to search
    pub csv: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgsSchema {
    Open,
    Fixed,
}

#[derive(Debug)]
struct SearchRequest<'a> {
    query: &'a str,
    csv: Option<&'a str>,
}

/// Semantic search over CSV content, exposed as an agent tool
///
/// Every outcome is a string: search results, a prompt for missing arguments,
/// or [`DISABLED_MESSAGE`] when the capability could not be acquired.
///
/// # Examples
///
/// ```ignore
/// let capability = SearchCapability::probe(RagConfig::from_env()?, Arc::new(OllamaGateway::new())).await;
/// let tool = CsvSearchTool::new(capability).bind_csv("sales.csv").await;
///
/// let answer = tool.run_async(&HashMap::from([
///     ("query".to_string(), json!("Which region sold the most?")),
/// ])).await;
/// ```
#[derive(Clone)]
pub struct CsvSearchTool {
    capability: SearchCapability,
    name: String,
    description: String,
    custom_description: bool,
    summarize: bool,
    schema: ArgsSchema,
    source: Arc<Mutex<Option<String>>>,
}

impl CsvSearchTool {
    /// Tool that expects both `query` and `csv` on every call
    pub fn new(capability: SearchCapability) -> Self {
        Self {
            capability,
            name: DEFAULT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            custom_description: false,
            summarize: false,
            schema: ArgsSchema::Open,
            source: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self.custom_description = true;
        self
    }

    /// Answer with an LLM summary instead of the matching rows
    pub fn with_summarize(mut self, summarize: bool) -> Self {
        self.summarize = summarize;
        self
    }

    /// Bind the tool to one CSV so callers only pass `query`
    ///
    /// The CSV is indexed right away. Indexing failures are logged and ignored;
    /// queries then simply find nothing.
    pub async fn bind_csv(mut self, csv: impl Into<String>) -> Self {
        let csv = csv.into();
        if !self.custom_description {
            self.description =
                format!("A tool that can be used to semantic search a query the {} CSV's content.", csv);
        }
        self.schema = ArgsSchema::Fixed;
        self.add(&csv).await;
        self
    }

    pub fn is_available(&self) -> bool {
        self.capability.is_available()
    }

    /// The most recently added source, used to scope queries
    pub fn source(&self) -> Option<String> {
        self.source.lock().ok().and_then(|guard| guard.clone())
    }

    /// Index a CSV and remember it for later queries; a no-op when unavailable
    pub async fn add(&self, csv: &str) {
        if !self.capability.is_available() {
            return;
        }
        if let Ok(mut source) = self.source.lock() {
            *source = Some(csv.to_string());
        }
        self.capability.add(csv).await;
    }

    /// Async entry point for callers already running inside a runtime
    pub async fn run_async(&self, args: &HashMap<String, Value>) -> String {
        match self.check_request(args) {
            Ok(request) => self.search(request).await,
            Err(message) => message.to_string(),
        }
    }

    fn check_request<'a>(
        &self,
        args: &'a HashMap<String, Value>,
    ) -> std::result::Result<SearchRequest<'a>, &'static str> {
        let query = args.get("query").and_then(Value::as_str).ok_or(MISSING_QUERY_MESSAGE)?;
        let csv = args.get("csv").and_then(Value::as_str);

        if csv.is_none() && self.schema == ArgsSchema::Open {
            return Err(MISSING_CSV_MESSAGE);
        }

        if !self.capability.is_available() {
            return Err(DISABLED_MESSAGE);
        }

        Ok(SearchRequest { query, csv })
    }

    async fn search(&self, request: SearchRequest<'_>) -> String {
        if let Some(csv) = request.csv {
            self.add(csv).await;
        }

        let options = QueryOptions {
            summarize: self.summarize,
            source: self.source(),
        };
        debug!("Searching CSV content (source: {:?})", options.source);

        let content = self.capability.query(request.query, &options).await;
        format!("Relevant Content:\n{}", content)
    }

    fn parameters(&self) -> Value {
        let schema = match self.schema {
            ArgsSchema::Open => schemars::schema_for!(CsvSearchArgs),
            ArgsSchema::Fixed => schemars::schema_for!(FixedCsvSearchArgs),
        };
        serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }
}

impl LlmTool for CsvSearchTool {
    fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let request = match self.check_request(args) {
            Ok(request) => request,
            Err(message) => return Ok(Value::String(message.to_string())),
        };

        let output = block_on(self.search(request))?;
        Ok(Value::String(output))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function(self.name.clone(), self.description.clone(), self.parameters())
    }

    fn clone_box(&self) -> Box<dyn LlmTool> {
        Box::new(self.clone())
    }
}

// The tool trait is synchronous while the capability is async. Inside a
// multi-threaded runtime we block in place. A current-thread runtime cannot
// block in place, so the future runs on a scoped thread with its own runtime.
// Without any runtime we make one here.
fn block_on<F>(future: F) -> Result<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(tokio::task::block_in_place(|| handle.block_on(future)))
        }
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(|| current_thread_runtime().map(|runtime| runtime.block_on(future)))
                .join()
                .unwrap_or_else(|_| {
                    Err(AgentToolsError::ToolError("CSV search thread panicked".to_string()))
                })
        }),
        Err(_) => Ok(current_thread_runtime()?.block_on(future)),
    }
}

fn current_thread_runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::UNAVAILABLE_MESSAGE;
    use crate::error::CapabilityError;
    use crate::rag::{DocumentMetadata, QueryAnswer, SemanticIndex, Snippet};
    use async_trait::async_trait;
    use serde_json::json;

    /// Index over fixed rows per source, recording every call
    #[derive(Default)]
    struct FakeIndex {
        added: Mutex<Vec<String>>,
        queries: Mutex<Vec<(String, QueryOptions)>>,
        fail_queries: bool,
    }

    #[async_trait]
    impl SemanticIndex for FakeIndex {
        async fn add(&self, source: &str) -> Result<usize> {
            self.added.lock().unwrap().push(source.to_string());
            Ok(2)
        }

        async fn query(&self, question: &str, options: &QueryOptions) -> Result<QueryAnswer> {
            self.queries.lock().unwrap().push((question.to_string(), options.clone()));
            if self.fail_queries {
                return Err(AgentToolsError::GatewayError("timeout".to_string()));
            }
            let url = options.source.clone().unwrap_or_default();
            let sources = ["name: Ada", "name: Grace"]
                .iter()
                .enumerate()
                .map(|(i, content)| Snippet {
                    content: content.to_string(),
                    metadata: DocumentMetadata {
                        app_id: "app".to_string(),
                        url: url.clone(),
                        row: i + 1,
                    },
                    score: 0.9,
                })
                .collect();
            Ok(QueryAnswer {
                answer: format!("Ada and Grace appear in {}", url),
                sources,
            })
        }
    }

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), json!(v))).collect()
    }

    fn unavailable() -> SearchCapability {
        SearchCapability::absent(CapabilityError::DependencyMissing("not built".to_string()))
    }

    fn available() -> (Arc<FakeIndex>, SearchCapability) {
        let index = Arc::new(FakeIndex::default());
        (index.clone(), SearchCapability::from_index(index))
    }

    #[test]
    fn test_unavailable_with_valid_args_returns_disabled_message() {
        let tool = CsvSearchTool::new(unavailable());

        let result = tool.run(&args(&[("query", "X"), ("csv", "file.csv")])).unwrap();

        assert_eq!(result, json!(DISABLED_MESSAGE));
        assert!(DISABLED_MESSAGE.contains("missing the 'semantic-search' capability"));
    }

    #[test]
    fn test_unavailable_still_validates_arguments_first() {
        let tool = CsvSearchTool::new(unavailable());

        assert_eq!(tool.run(&args(&[])).unwrap(), json!(MISSING_QUERY_MESSAGE));
        assert_eq!(tool.run(&args(&[("csv", "file.csv")])).unwrap(), json!(MISSING_QUERY_MESSAGE));
        assert_eq!(tool.run(&args(&[("query", "X")])).unwrap(), json!(MISSING_CSV_MESSAGE));
    }

    #[tokio::test]
    async fn test_sync_run_on_current_thread_runtime() {
        let (index, capability) = available();
        let tool = CsvSearchTool::new(capability);

        let result = tool.run(&args(&[("query", "X"), ("csv", "a.csv")])).unwrap();

        assert_eq!(result, json!("Relevant Content:\nname: Ada\n\nname: Grace"));
        assert_eq!(*index.added.lock().unwrap(), vec!["a.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_add_is_noop() {
        let tool = CsvSearchTool::new(unavailable());

        tool.add("file.csv").await;

        assert!(tool.source().is_none());
        assert!(!tool.is_available());
    }

    #[test]
    fn test_missing_query() {
        let (index, capability) = available();
        let tool = CsvSearchTool::new(capability);

        let result = tool.run(&args(&[("csv", "people.csv")])).unwrap();

        assert_eq!(result, json!(MISSING_QUERY_MESSAGE));
        assert!(index.added.lock().unwrap().is_empty());
    }

    #[test]
    fn test_non_string_query_counts_as_missing() {
        let (_index, capability) = available();
        let tool = CsvSearchTool::new(capability);
        let call = HashMap::from([
            ("query".to_string(), json!(42)),
            ("csv".to_string(), json!("people.csv")),
        ]);

        assert_eq!(tool.run(&call).unwrap(), json!(MISSING_QUERY_MESSAGE));
    }

    #[test]
    fn test_missing_csv_on_open_schema() {
        let (_index, capability) = available();
        let tool = CsvSearchTool::new(capability);

        let result = tool.run(&args(&[("query", "who?")])).unwrap();

        assert_eq!(result, json!(MISSING_CSV_MESSAGE));
    }

    #[test]
    fn test_run_adds_csv_then_returns_joined_snippets() {
        let (index, capability) = available();
        let tool = CsvSearchTool::new(capability);

        let result = tool.run(&args(&[("query", "X"), ("csv", "people.csv")])).unwrap();

        assert_eq!(result, json!("Relevant Content:\nname: Ada\n\nname: Grace"));
        assert_eq!(*index.added.lock().unwrap(), vec!["people.csv".to_string()]);

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].0, "X");
        assert_eq!(queries[0].1.source.as_deref(), Some("people.csv"));
        assert!(!queries[0].1.summarize);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_inside_multi_thread_runtime() {
        let (_index, capability) = available();
        let tool = CsvSearchTool::new(capability).with_summarize(true);

        let result = tool.run(&args(&[("query", "X"), ("csv", "people.csv")])).unwrap();

        assert_eq!(result, json!("Relevant Content:\nAda and Grace appear in people.csv"));
    }

    #[tokio::test]
    async fn test_bind_csv_indexes_and_fixes_schema() {
        let (index, capability) = available();
        let tool = CsvSearchTool::new(capability).bind_csv("people.csv").await;

        assert_eq!(*index.added.lock().unwrap(), vec!["people.csv".to_string()]);
        assert_eq!(tool.source().as_deref(), Some("people.csv"));

        let descriptor = tool.descriptor();
        assert_eq!(
            descriptor.function.description,
            "A tool that can be used to semantic search a query the people.csv CSV's content."
        );
        assert_eq!(descriptor.required_parameters(), vec!["query"]);

        let result = tool.run_async(&args(&[("query", "X")])).await;
        assert_eq!(result, "Relevant Content:\nname: Ada\n\nname: Grace");
    }

    #[tokio::test]
    async fn test_bind_csv_keeps_custom_description() {
        let (_index, capability) = available();
        let tool = CsvSearchTool::new(capability)
            .with_name("staff_search")
            .with_description("Search the staff directory")
            .bind_csv("staff.csv")
            .await;

        let descriptor = tool.descriptor();
        assert_eq!(descriptor.function.name, "staff_search");
        assert_eq!(descriptor.function.description, "Search the staff directory");
        assert!(tool.matches("staff_search"));
    }

    #[tokio::test]
    async fn test_bind_csv_on_unavailable_capability() {
        let tool = CsvSearchTool::new(unavailable()).bind_csv("people.csv").await;

        assert!(tool.source().is_none());
        assert_eq!(tool.run_async(&args(&[("query", "X")])).await, DISABLED_MESSAGE);
    }

    #[tokio::test]
    async fn test_later_csv_replaces_scope() {
        let (index, capability) = available();
        let tool = CsvSearchTool::new(capability).bind_csv("first.csv").await;

        tool.run_async(&args(&[("query", "X"), ("csv", "second.csv")])).await;

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].1.source.as_deref(), Some("second.csv"));
    }

    #[tokio::test]
    async fn test_query_failure_collapses_to_unavailable_message() {
        let index = Arc::new(FakeIndex {
            fail_queries: true,
            ..Default::default()
        });
        let tool = CsvSearchTool::new(SearchCapability::from_index(index));

        let result = tool.run_async(&args(&[("query", "X"), ("csv", "people.csv")])).await;

        assert_eq!(result, format!("Relevant Content:\n{}", UNAVAILABLE_MESSAGE));
    }

    #[test]
    fn test_default_descriptor_requires_query_and_csv() {
        let tool = CsvSearchTool::new(unavailable());
        let descriptor = tool.descriptor();

        assert_eq!(descriptor.function.name, "Search a CSV's content");
        assert_eq!(descriptor.function.description, DEFAULT_DESCRIPTION);

        let mut required = descriptor.required_parameters();
        required.sort();
        assert_eq!(required, vec!["csv", "query"]);

        let properties = &descriptor.function.parameters["properties"];
        assert!(properties["csv"]["description"]
            .as_str()
            .unwrap()
            .contains("Mandatory csv path"));
    }

    #[test]
    fn test_clone_box_shares_source() {
        let (_index, capability) = available();
        let tool = CsvSearchTool::new(capability);
        let boxed = tool.clone_box();

        boxed.run(&args(&[("query", "X"), ("csv", "people.csv")])).unwrap();

        assert_eq!(tool.source().as_deref(), Some("people.csv"));
    }

    #[cfg(feature = "semantic-search")]
    mod end_to_end {
        use super::*;
        use crate::llm::gateway::{CompletionConfig, LlmGateway};
        use crate::llm::models::{LlmGatewayResponse, LlmMessage};
        use crate::rag::RagConfig;
        use std::io::Write;
        use tempfile::NamedTempFile;

        /// Lists the embedding model and embeds text by which city it mentions
        struct CityGateway;

        #[async_trait]
        impl LlmGateway for CityGateway {
            async fn complete(
                &self,
                _model: &str,
                _messages: &[LlmMessage],
                _config: &CompletionConfig,
            ) -> Result<LlmGatewayResponse> {
                Ok(LlmGatewayResponse::default())
            }

            async fn get_available_models(&self) -> Result<Vec<String>> {
                Ok(vec!["mxbai-embed-large:latest".to_string()])
            }

            async fn calculate_embeddings(&self, text: &str, _model: Option<&str>) -> Result<Vec<f32>> {
                Ok(["London", "Arlington"]
                    .iter()
                    .map(|city| if text.contains(city) { 1.0 } else { 0.1 })
                    .collect())
            }
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn test_bound_csv_search_through_embedding_index() {
            let mut file = NamedTempFile::new().unwrap();
            file.write_all(b"name,city\nAda,London\nGrace,Arlington\n").unwrap();
            let path = file.path().to_string_lossy().to_string();

            let config = RagConfig {
                number_documents: 2,
                ..Default::default()
            };
            let capability = SearchCapability::probe(config, Arc::new(CityGateway)).await;
            assert!(capability.is_available());

            let tool = CsvSearchTool::new(capability).bind_csv(path.clone()).await;
            assert_eq!(tool.source().as_deref(), Some(path.as_str()));

            let result = tool.run(&args(&[("query", "Who lives in London?")])).unwrap();

            let content = result.as_str().unwrap().strip_prefix("Relevant Content:\n").unwrap();
            let rows: Vec<&str> = content.split("\n\n").collect();
            assert_eq!(rows, vec!["name: Ada, city: London", "name: Grace, city: Arlington"]);
        }
    }
}
