//! Generation gateway — the abstraction over language-model providers.
//!
//! The run loop speaks to every provider through this one trait: plain text
//! generation, and tool-aware generation that can come back as either text or
//! a set of requested tool invocations. Each binding is responsible for
//! coercing its vendor's wire shapes into [`GenerationResponse`] so the loop
//! never branches on provider identity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Describes one tool to a generation provider: name, human-readable
/// description, and a JSON-schema object for the parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema: `{"type": "object", "properties": {...}, "required": [...]}`
    pub parameters: serde_json::Value,
}

/// A provider's request to invoke a tool instead of answering directly.
///
/// `arguments` is always a structured JSON value here; bindings that receive
/// arguments as a single JSON-encoded string (the OpenAI-style wire form)
/// parse it before constructing this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// What a tool-aware generation produced: exactly one of the two payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResponse {
    /// The model answered in plain text.
    Text(String),
    /// The model requested one or more tool invocations.
    ToolCalls(Vec<ToolCall>),
}

/// The provider-agnostic generation capability.
///
/// Implementations must surface a missing or empty completion as
/// [`GenerationError::EmptyResponse`] rather than returning an empty string,
/// and classify vendor failures (authentication, unknown model, rate limit,
/// server error) into the [`GenerationError`] variants.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// The binding's name, e.g. "groq" or "gemini".
    fn name(&self) -> &str;

    /// Generate a plain text completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Generate with tool definitions attached; the model may answer in text
    /// or request tool invocations.
    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<GenerationResponse, GenerationError>;

    /// Generate embedding vectors for the given texts.
    ///
    /// Default implementation reports the capability as unavailable; bindings
    /// with an embeddings endpoint override it.
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, GenerationError> {
        Err(GenerationError::NotConfigured(format!(
            "Gateway '{}' does not support embeddings",
            self.name()
        )))
    }
}
