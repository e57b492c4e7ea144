//! Error types and result aliases for the agent-tools crate.
//!
//! [`AgentToolsError`] covers framework plumbing (gateways, serialization, IO).
//! [`CapabilityError`] is the bounded set of reasons the optional semantic search
//! capability can be missing or fail; tools collapse it to a user-facing string
//! at the boundary instead of returning it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentToolsError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "semantic-search")]
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Capability error: {0}")]
    CapabilityError(#[from] CapabilityError),
}

/// Why the semantic search capability is absent, or why a call into it failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The backing dependency is not compiled in or cannot be reached.
    #[error("dependency missing: {0}")]
    DependencyMissing(String),

    /// The dependency is present but cannot serve the configured models.
    #[error("incompatible dependency: {0}")]
    Incompatible(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    /// A call into an acquired capability failed at runtime.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<AgentToolsError> for CapabilityError {
    fn from(err: AgentToolsError) -> Self {
        match err {
            AgentToolsError::CapabilityError(inner) => inner,
            AgentToolsError::ConfigError(msg) => CapabilityError::Configuration(msg),
            other => CapabilityError::Backend(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = AgentToolsError::GatewayError("connection failed".to_string());
        assert_eq!(err.to_string(), "LLM gateway error: connection failed");
    }

    #[test]
    fn test_tool_error_display() {
        let err = AgentToolsError::ToolError("invalid parameters".to_string());
        assert_eq!(err.to_string(), "Tool error: invalid parameters");
    }

    #[test]
    fn test_config_error_display() {
        let err = AgentToolsError::ConfigError("missing model".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: missing model");
    }

    #[test]
    fn test_capability_error_display() {
        let err = CapabilityError::DependencyMissing("ollama unreachable".to_string());
        assert_eq!(err.to_string(), "dependency missing: ollama unreachable");

        let wrapped: AgentToolsError = err.into();
        assert_eq!(wrapped.to_string(), "Capability error: dependency missing: ollama unreachable");
    }

    #[test]
    fn test_config_error_collapses_to_configuration() {
        let err = AgentToolsError::ConfigError("bad".to_string());
        assert_eq!(CapabilityError::from(err), CapabilityError::Configuration("bad".to_string()));
    }

    #[test]
    fn test_gateway_error_collapses_to_backend() {
        let err = AgentToolsError::GatewayError("500".to_string());
        match CapabilityError::from(err) {
            CapabilityError::Backend(msg) => assert!(msg.contains("500")),
            other => panic!("Expected Backend, got {:?}", other),
        }
    }

    #[test]
    fn test_wrapped_capability_error_unwraps() {
        let err = AgentToolsError::CapabilityError(CapabilityError::Incompatible("x".to_string()));
        assert_eq!(CapabilityError::from(err), CapabilityError::Incompatible("x".to_string()));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: AgentToolsError = json_err.into();

        match err {
            AgentToolsError::SerializationError(_) => {}
            _ => panic!("Expected SerializationError"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AgentToolsError = io_err.into();

        match err {
            AgentToolsError::IoError(_) => {}
            _ => panic!("Expected IoError"),
        }
    }
}
