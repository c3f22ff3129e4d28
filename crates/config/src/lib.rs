//! Configuration loading and validation for ironloom.
//!
//! Loads configuration from `ironloom.toml` in the working directory with
//! environment variable overrides, including the provider key variables
//! (`GROQ_API_KEY`, `OPENAI_API_KEY`, `GEMINI_API_KEY`) and the Qdrant
//! connection variables (`QDRANT_URL`, `QDRANT_API_KEY`, `QDRANT_COLLECTION`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `ironloom.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Memory backend settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Which generation gateway to use and how to reach it.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name: "groq", "openai", or "gemini"
    #[serde(default = "default_provider")]
    pub name: String,

    /// Model override; each provider has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API key; normally supplied via environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Endpoint override for OpenAI-compatible proxies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_provider() -> String {
    "groq".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider(),
            model: None,
            api_key: None,
            base_url: None,
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("memory", &self.memory)
            .field("tools", &self.tools)
            .finish()
    }
}

/// Memory backend selection and connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Backend: "qdrant", "file", "memory", or "none"
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// Directory for the file backend
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Qdrant endpoint
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Qdrant API key, if the instance requires one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qdrant_api_key: Option<String>,

    /// Qdrant collection name
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_memory_backend() -> String {
    "file".into()
}
fn default_storage_dir() -> PathBuf {
    PathBuf::from("./ironloom_memory")
}
fn default_qdrant_url() -> String {
    "http://localhost:6333".into()
}
fn default_collection() -> String {
    "ironloom_memory".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            storage_dir: default_storage_dir(),
            qdrant_url: default_qdrant_url(),
            qdrant_api_key: None,
            collection: default_collection(),
        }
    }
}

impl std::fmt::Debug for MemoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConfig")
            .field("backend", &self.backend)
            .field("storage_dir", &self.storage_dir)
            .field("qdrant_url", &self.qdrant_url)
            .field("qdrant_api_key", &redact(&self.qdrant_api_key))
            .field("collection", &self.collection)
            .finish()
    }
}

/// Settings for the built-in tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Sandbox root for the file system tool
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Default result count for web searches
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
}

fn default_output_root() -> PathBuf {
    PathBuf::from("./workflow_outputs")
}
fn default_max_search_results() -> usize {
    5
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            max_search_results: default_max_search_results(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `ironloom.toml` in the working directory.
    ///
    /// Environment variables take priority over the file:
    /// - `LLM_PROVIDER` selects the provider (default "groq")
    /// - `CURRENT_AI_MODEL` overrides the model
    /// - `IRONLOOM_API_KEY`, then the provider's own variable
    ///   (`GROQ_API_KEY` / `OPENAI_API_KEY` / `GEMINI_API_KEY`)
    /// - `IRONLOOM_MEMORY_BACKEND`, `QDRANT_URL`, `QDRANT_API_KEY`,
    ///   `QDRANT_COLLECTION`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_path(Path::new("ironloom.toml"))
    }

    /// Load from a specific file path, then apply environment overrides.
    pub fn load_with_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            self.provider.name = provider;
        }

        if let Ok(model) = std::env::var("CURRENT_AI_MODEL") {
            self.provider.model = Some(model);
        }

        let key_var = match self.provider.name.as_str() {
            "openai" => "OPENAI_API_KEY",
            "gemini" => "GEMINI_API_KEY",
            _ => "GROQ_API_KEY",
        };
        if let Some(key) = std::env::var("IRONLOOM_API_KEY")
            .ok()
            .or_else(|| std::env::var(key_var).ok())
        {
            self.provider.api_key = Some(key);
        }

        if let Ok(backend) = std::env::var("IRONLOOM_MEMORY_BACKEND") {
            self.memory.backend = backend;
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.memory.qdrant_url = url;
        }
        if let Ok(key) = std::env::var("QDRANT_API_KEY") {
            self.memory.qdrant_api_key = Some(key);
        }
        if let Ok(collection) = std::env::var("QDRANT_COLLECTION") {
            self.memory.collection = collection;
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.provider.name.as_str() {
            "groq" | "openai" | "gemini" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown provider '{other}' (expected groq, openai, or gemini)"
                )));
            }
        }

        match self.memory.backend.as_str() {
            "qdrant" | "file" | "memory" | "none" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown memory backend '{other}' (expected qdrant, file, memory, or none)"
                )));
            }
        }

        if self.tools.max_search_results == 0 {
            return Err(ConfigError::ValidationError(
                "max_search_results must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
