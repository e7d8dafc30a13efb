//! API key resolution.
//!
//! Resolution order:
//! 1. Environment variable for the backend
//! 2. Config file (with warning at load time)

use crate::{Backend, ConfigError, Result};

/// Result of API key resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve an API key for a backend.
///
/// Empty values are treated as unset.
pub fn resolve_api_key(backend: &Backend, config_value: Option<&str>) -> Option<ResolvedSecret> {
    let env_var = backend.env_var();
    if let Ok(value) = std::env::var(env_var)
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}

/// Resolve an API key, failing if none is available.
pub fn require_api_key(backend: &Backend, config_value: Option<&str>) -> Result<ResolvedSecret> {
    resolve_api_key(backend, config_value).ok_or_else(|| ConfigError::ApiKeyNotFound {
        backend: backend.to_string(),
        env_var: backend.env_var().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    // SAFETY (all env mutations below): tests touching the environment are
    // serialized with #[serial].

    #[test]
    #[serial]
    fn test_env_var_wins() {
        unsafe { std::env::set_var("OPENAI_API_KEY", "from-env") };
        let resolved = resolve_api_key(&Backend::Openai, Some("from-config")).unwrap();
        unsafe { std::env::remove_var("OPENAI_API_KEY") };

        assert_eq!(resolved.value, "from-env");
        assert_eq!(resolved.source, SecretSource::EnvVar("OPENAI_API_KEY".into()));
    }

    #[test]
    #[serial]
    fn test_falls_back_to_config() {
        unsafe { std::env::remove_var("LLM_API_KEY") };
        let resolved = resolve_api_key(&Backend::Custom, Some("my-key")).unwrap();
        assert_eq!(resolved.value, "my-key");
        assert_eq!(resolved.source, SecretSource::ConfigFile);
    }

    #[test]
    #[serial]
    fn test_empty_env_ignored() {
        unsafe { std::env::set_var("LLM_API_KEY", "") };
        let resolved = resolve_api_key(&Backend::Custom, None);
        unsafe { std::env::remove_var("LLM_API_KEY") };
        assert!(resolved.is_none());
    }

    #[test]
    #[serial]
    fn test_require_reports_env_var() {
        unsafe { std::env::remove_var("GROQ_API_KEY") };
        let err = require_api_key(&Backend::Groq, None).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_secret_source_display() {
        assert_eq!(
            SecretSource::EnvVar("GROQ_API_KEY".to_string()).to_string(),
            "env var GROQ_API_KEY"
        );
        assert_eq!(SecretSource::ConfigFile.to_string(), "config file (plaintext)");
    }
}
