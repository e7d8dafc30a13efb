//! LLM backend construction from configuration.

use std::time::Duration;

use anyhow::{Result, bail};
use troupe_config::{Backend, LlmConfig, require_api_key};
use troupe_llm::{DEFAULT_GROQ_MODEL, OpenAiConfig, SharedBackend, create_shared_backend};

/// Translate the `[llm]` section into an OpenAI-compatible backend config.
pub fn openai_config(llm: &LlmConfig) -> Result<OpenAiConfig> {
    let backend = llm.backend();
    let api_key = || -> Result<String> {
        let secret = require_api_key(&backend, llm.api_key.as_deref())?;
        tracing::debug!(backend = %backend, source = %secret.source, "Resolved API key");
        Ok(secret.value)
    };

    let mut config = match backend {
        Backend::Groq => OpenAiConfig::groq(api_key()?),
        Backend::Openai => OpenAiConfig::openai(api_key()?),
        Backend::Ollama => OpenAiConfig::ollama(),
        Backend::Custom => {
            let Some(base_url) = llm.base_url.as_deref() else {
                bail!("backend 'custom' requires base_url in [llm]");
            };
            OpenAiConfig::openai(api_key()?)
                .with_base_url(base_url)
                .with_name("custom")
        }
    };

    if let Some(base_url) = &llm.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(secs) = llm.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Build the shared backend.
pub fn build(llm: &LlmConfig) -> Result<SharedBackend> {
    Ok(create_shared_backend(openai_config(llm)?)?)
}

/// The model to use: the CLI flag, then `[llm].model`, then the Groq default.
pub fn model(llm: &LlmConfig, cli_model: Option<&str>) -> String {
    cli_model
        .or(llm.model.as_deref())
        .unwrap_or(DEFAULT_GROQ_MODEL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_needs_no_key() {
        let llm = LlmConfig {
            backend: Some(Backend::Ollama),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let config = openai_config(&llm).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.name, "ollama");
    }

    #[test]
    fn test_custom_requires_base_url() {
        let llm = LlmConfig {
            backend: Some(Backend::Custom),
            api_key: Some("k".into()),
            ..Default::default()
        };
        assert!(openai_config(&llm).is_err());

        let llm = LlmConfig {
            base_url: Some("http://localhost:8000/v1".into()),
            ..llm
        };
        let config = openai_config(&llm).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/v1");
        assert_eq!(config.name, "custom");
    }

    #[test]
    fn test_model_precedence() {
        let llm = LlmConfig {
            model: Some("from-config".into()),
            ..Default::default()
        };
        assert_eq!(model(&llm, Some("from-cli")), "from-cli");
        assert_eq!(model(&llm, None), "from-config");
        assert_eq!(model(&LlmConfig::default(), None), DEFAULT_GROQ_MODEL);
    }
}
