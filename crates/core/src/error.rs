//! Error types for the ironloom domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level `Error`
//! aggregates them for callers that cross context boundaries.

use thiserror::Error;

/// The top-level error type for all ironloom operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Workflow errors ---
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the generation gateway. All of these are fatal to the agent
/// run that triggered them: without a generation there is nothing to return.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider server error: {0}")]
    ServerError(String),

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of memory stores. The run loop treats all of these as
/// recoverable: retrieval errors degrade to a prompt without memories.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),
}

/// Tool dispatch and execution failures. Rendered as inline error text by
/// the run loop, never propagated out of it.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} - {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Sandbox violation: {0}")]
    SandboxViolation(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid workflow definition: {0}")]
    InvalidDefinition(String),

    #[error("Step references unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Workflow file error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_displays_status() {
        let err = Error::Generation(GenerationError::ApiError {
            status_code: 418,
            message: "teapot".into(),
        });
        assert!(err.to_string().contains("418"));
        assert!(err.to_string().contains("teapot"));
    }

    #[test]
    fn tool_error_displays_tool_name() {
        let err = Error::Tool(ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason: "connection refused".into(),
        });
        assert!(err.to_string().contains("web_search"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn memory_error_wraps_into_top_level() {
        let err: Error = MemoryError::QueryFailed("collection missing".into()).into();
        assert!(matches!(err, Error::Memory(_)));
    }
}
