//! Google Gemini gateway binding.
//!
//! Speaks the `generateContent` API: prompts go out as `contents` with
//! `parts`, tool definitions as `functionDeclarations`, and tool requests
//! come back as structured `functionCall` parts. Unlike the OpenAI wire,
//! arguments arrive as JSON objects already, so no string decoding happens
//! here.

use async_trait::async_trait;
use ironloom_core::error::GenerationError;
use ironloom_core::gateway::{Gateway, GenerationResponse, ToolCall, ToolDefinition};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Default Gemini chat model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiGateway {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiGateway {
    pub fn new(api_key: impl Into<String>, model: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        let gateway = Self {
            api_key: api_key.into(),
            model: model.unwrap_or(DEFAULT_GEMINI_MODEL).to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            client,
        };

        info!(provider = "gemini", model = %gateway.model, "Generation gateway initialized");
        gateway
    }

    /// The model this gateway sends requests for.
    pub fn model(&self) -> &str {
        &self.model
    }

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

    async fn send_generate_content(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Vec<Part>, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let mut body = serde_json::json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ],
        });

        if !tools.is_empty() {
            let declarations: Vec<serde_json::Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            body["tools"] = serde_json::json!([{ "functionDeclarations": declarations }]);
        }

        debug!(model = %self.model, tools = tools.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini returned error");
            return Err(self.classify_error(status, error_body));
        }

        let api_response: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::ApiError {
                    status_code: status,
                    message: format!("Failed to parse response: {e}"),
                })?;

        api_response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts)
            .ok_or(GenerationError::EmptyResponse)
    }
}

/// Fold response parts into a single [`GenerationResponse`].
///
/// Any `functionCall` part wins over text; multiple text parts concatenate.
fn parts_to_response(parts: Vec<Part>) -> Result<GenerationResponse, GenerationError> {
    let mut calls = Vec::new();
    let mut text = String::new();

    for part in parts {
        if let Some(fc) = part.function_call {
            calls.push(ToolCall {
                name: fc.name,
                arguments: fc.args,
            });
        } else if let Some(t) = part.text {
            text.push_str(&t);
        }
    }

    if !calls.is_empty() {
        Ok(GenerationResponse::ToolCalls(calls))
    } else if !text.is_empty() {
        Ok(GenerationResponse::Text(text))
    } else {
        Err(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl Gateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let parts = self.send_generate_content(prompt, &[]).await?;
        match parts_to_response(parts)? {
            GenerationResponse::Text(text) => Ok(text),
            GenerationResponse::ToolCalls(_) => Err(GenerationError::EmptyResponse),
        }
    }

    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<GenerationResponse, GenerationError> {
        let parts = self.send_generate_content(prompt, tools).await?;
        parts_to_response(parts)
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "functionCall", default)]
    function_call: Option<FunctionCall>,
}

/// A structured tool request. `args` is already a JSON object on this wire.
#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    args: serde_json::Value,
}
