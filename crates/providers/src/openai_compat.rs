//! OpenAI-compatible gateway binding.
//!
//! Works with Groq and OpenAI directly, and with any other endpoint that
//! exposes an OpenAI-style `/chat/completions` API.
//!
//! Supports:
//! - Plain chat completions
//! - Tool use / function calling
//! - Embeddings (`/embeddings`)

use async_trait::async_trait;
use ironloom_core::error::GenerationError;
use ironloom_core::gateway::{Gateway, GenerationResponse, ToolCall, ToolDefinition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default chat model on Groq.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Default chat model on OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

/// An OpenAI-compatible generation gateway.
///
/// This covers the majority of hosted providers since most expose an
/// OpenAI-style `/v1/chat/completions` endpoint.
pub struct OpenAiCompatGateway {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatGateway {
    /// Create a gateway against an arbitrary OpenAI-compatible endpoint.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        let gateway = Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        };

        info!(provider = %gateway.name, model = %gateway.model, "Generation gateway initialized");
        gateway
    }

    /// Create a Groq gateway (convenience constructor).
    pub fn groq(api_key: impl Into<String>, model: Option<&str>) -> Self {
        Self::new(
            "groq",
            "https://api.groq.com/openai/v1",
            api_key,
            model.unwrap_or(DEFAULT_GROQ_MODEL),
        )
    }

    /// Create an OpenAI gateway (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: Option<&str>) -> Self {
        Self::new(
            "openai",
            "https://api.openai.com/v1",
            api_key,
            model.unwrap_or(DEFAULT_OPENAI_MODEL),
        )
    }

    /// The model this gateway sends requests for.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert tool definitions to the OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    /// Map an error status to the matching [`GenerationError`] class.
    fn classify_error(&self, status: u16, body: String) -> GenerationError {
        match status {
            401 | 403 => GenerationError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            404 => GenerationError::ModelNotFound(self.model.clone()),
            429 => GenerationError::RateLimited {
                retry_after_secs: 5,
            },
            500..=599 => GenerationError::ServerError(body),
            _ => GenerationError::ApiError {
                status_code: status,
                message: body,
            },
        }
    }

    /// Send one chat completion request and return the first choice.
    async fn send_chat(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<ApiMessage, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        if !tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(tools));
            body["tool_choice"] = serde_json::json!("auto");
        }

        debug!(
            provider = %self.name,
            model = %self.model,
            tools = tools.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(self.classify_error(status, error_body));
        }

        let api_response: ApiResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::ApiError {
                    status_code: status,
                    message: format!("Failed to parse response: {e}"),
                })?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(GenerationError::EmptyResponse)
    }
}

/// Decode an OpenAI-style `function.arguments` JSON string.
///
/// Arguments arrive as a JSON-encoded string on this wire; callers get a
/// structured value back. An unparseable string degrades to an empty object.
fn parse_arguments(tool_name: &str, raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(tool = %tool_name, error = %e, "Unparseable tool arguments, using empty object");
            serde_json::json!({})
        }
    }
}

#[async_trait]
impl Gateway for OpenAiCompatGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let message = self.send_chat(prompt, &[]).await?;

        match message.content {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(GenerationError::EmptyResponse),
        }
    }

    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<GenerationResponse, GenerationError> {
        let message = self.send_chat(prompt, tools).await?;

        let tool_calls = message.tool_calls.unwrap_or_default();
        if !tool_calls.is_empty() {
            let calls = tool_calls
                .into_iter()
                .map(|tc| ToolCall {
                    arguments: parse_arguments(&tc.function.name, &tc.function.arguments),
                    name: tc.function.name,
                })
                .collect();
            return Ok(GenerationResponse::ToolCalls(calls));
        }

        match message.content {
            Some(content) if !content.is_empty() => Ok(GenerationResponse::Text(content)),
            _ => Err(GenerationError::EmptyResponse),
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GenerationError> {
        let url = format!("{}/embeddings", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
            "encoding_format": "float",
        });

        debug!(
            provider = %self.name,
            model = %self.model,
            count = texts.len(),
            "Sending embedding request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.classify_error(status, error_body));
        }

        let api_resp: EmbeddingApiResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::ApiError {
                    status_code: status,
                    message: format!("Failed to parse embedding response: {e}"),
                })?;

        Ok(api_resp.data.into_iter().map(|d| d.embedding).collect())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    function: ApiFunction,
}

#[derive(Debug, Deserialize)]
struct ApiFunction {
    name: String,
    /// JSON-encoded string on this wire, not a structured object.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
