//! Web search tool — DuckDuckGo's HTML interface, no API key required.

use async_trait::async_trait;
use ironloom_core::error::ToolError;
use ironloom_core::tool::Tool;
use serde::Serialize;
use tracing::debug;

/// One extracted search hit.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

pub struct WebSearchTool {
    max_results: usize,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(max_results: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; ironloom/0.1)")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            max_results,
            client,
        }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "maxResults": {
                    "type": "number",
                    "description": "Maximum number of results to return"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let max_results = arguments["maxResults"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(self.max_results);

        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );

        debug!(query, max_results, "Running web search");

        let html = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: e.to_string(),
            })?
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: e.to_string(),
            })?;

        let results = parse_results(&html, max_results);
        serde_json::to_value(&results).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason: e.to_string(),
        })
    }
}

/// Extract results from the DuckDuckGo HTML page.
///
/// Result links carry the `result__a` class, snippets the `result__snippet`
/// class; splitting on the class names avoids pulling in an HTML parser.
fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for (i, chunk) in html.split("result__a").enumerate() {
        if i == 0 || results.len() >= max_results {
            continue;
        }

        let url = chunk
            .split("href=\"")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .unwrap_or("")
            .to_string();

        let title = chunk
            .split('>')
            .nth(1)
            .and_then(|s| s.split('<').next())
            .unwrap_or("")
            .to_string();

        let snippet = chunk
            .split("result__snippet")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .unwrap_or("")
            .to_string();

        if !url.is_empty() && !title.is_empty() && url.starts_with("http") {
            results.push(SearchResult {
                title: html_decode(&title),
                url,
                snippet: html_decode(&snippet),
            });
        }
    }

    results
}

/// Decode the handful of entities DuckDuckGo actually emits.
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
