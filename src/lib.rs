pub mod capability;
pub mod error;
pub mod llm;
pub mod rag;

pub use error::{AgentToolsError, CapabilityError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::capability::SearchCapability;
    pub use crate::error::{AgentToolsError, CapabilityError, Result};
    pub use crate::llm::gateways::OllamaGateway;
    pub use crate::llm::tools::{CsvSearchTool, CurrentDateTimeTool, LlmTool, ToolDescriptor};
    pub use crate::llm::{CompletionConfig, LlmGateway, LlmMessage};
    pub use crate::rag::RagConfig;
}
