//! Gateway selection from configuration.

use std::sync::Arc;

use ironloom_config::ProviderConfig;
use ironloom_core::error::GenerationError;
use ironloom_core::{Gateway, Result};

use crate::gemini::GeminiGateway;
use crate::openai_compat::OpenAiCompatGateway;

/// Build the configured gateway.
///
/// Recognized provider names are `groq` (the default), `openai`, and
/// `gemini`. A missing API key is a configuration error, named after the
/// environment variable that would supply it.
pub fn from_config(config: &ProviderConfig) -> Result<Arc<dyn Gateway>> {
    let model = config.model.as_deref();

    match config.name.as_str() {
        "groq" => {
            let api_key = require_key(config, "GROQ_API_KEY")?;
            Ok(match config.base_url.as_deref() {
                Some(url) => Arc::new(OpenAiCompatGateway::new(
                    "groq",
                    url,
                    api_key,
                    model.unwrap_or(crate::openai_compat::DEFAULT_GROQ_MODEL),
                )),
                None => Arc::new(OpenAiCompatGateway::groq(api_key, model)),
            })
        }
        "openai" => {
            let api_key = require_key(config, "OPENAI_API_KEY")?;
            Ok(match config.base_url.as_deref() {
                Some(url) => Arc::new(OpenAiCompatGateway::new(
                    "openai",
                    url,
                    api_key,
                    model.unwrap_or(crate::openai_compat::DEFAULT_OPENAI_MODEL),
                )),
                None => Arc::new(OpenAiCompatGateway::openai(api_key, model)),
            })
        }
        "gemini" => {
            let api_key = require_key(config, "GEMINI_API_KEY")?;
            Ok(Arc::new(GeminiGateway::new(api_key, model)))
        }
        other => Err(ironloom_core::Error::Config {
            message: format!("Unknown provider: {other}"),
        }),
    }
}

fn require_key(config: &ProviderConfig, env_name: &str) -> Result<String> {
    config.api_key.clone().ok_or_else(|| {
        GenerationError::NotConfigured(format!("{env_name} not found in environment variables"))
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name: name.into(),
            model: None,
            api_key: api_key.map(String::from),
            base_url: None,
        }
    }

    #[test]
    fn selects_groq_by_name() {
        let gateway = from_config(&config("groq", Some("gsk-test"))).unwrap();
        assert_eq!(gateway.name(), "groq");
    }

    #[test]
    fn selects_gemini_by_name() {
        let gateway = from_config(&config("gemini", Some("AIza-test"))).unwrap();
        assert_eq!(gateway.name(), "gemini");
    }

    #[test]
    fn missing_key_names_the_env_var() {
        let err = from_config(&config("openai", None)).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let err = from_config(&config("mystery", Some("key"))).err().unwrap();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn base_url_override_is_honored() {
        let mut cfg = config("groq", Some("gsk-test"));
        cfg.base_url = Some("http://localhost:8080/v1".into());
        let gateway = from_config(&cfg).unwrap();
        assert_eq!(gateway.name(), "groq");
    }
}
