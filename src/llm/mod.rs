pub mod gateway;
pub mod gateways;
pub mod models;
pub mod tools;

pub use gateway::{CompletionConfig, LlmGateway};
pub use models::{LlmGatewayResponse, LlmMessage, MessageRole};
pub use tools::{FunctionDescriptor, LlmTool, ToolDescriptor};
