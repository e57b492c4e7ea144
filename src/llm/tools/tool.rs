use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;

/// Descriptor an agent framework uses to advertise a tool to the LLM
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Build a `"function"` descriptor
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Names listed under `parameters.required`
    pub fn required_parameters(&self) -> Vec<String> {
        self.function.parameters["required"]
            .as_array()
            .map(|names| names.iter().filter_map(|n| n.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }
}

/// Trait for tools callable by an agent
///
/// Tools answer with a JSON value; the tools in this crate always answer with a
/// string so the agent can put the result straight into its context.
pub trait LlmTool: Send + Sync {
    /// Execute the tool with given arguments
    fn run(&self, args: &HashMap<String, Value>) -> Result<Value>;

    /// Get tool descriptor for LLM
    fn descriptor(&self) -> ToolDescriptor;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.descriptor().function.name == name
    }

    /// Clone the tool into a Box
    ///
    /// Implementations should return `Box::new(self.clone())`.
    fn clone_box(&self) -> Box<dyn LlmTool>;
}
