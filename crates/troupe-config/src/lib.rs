//! Configuration system for Troupe.
//!
//! Provides TOML-based configuration with:
//! - The LLM backend and model (`[llm]`)
//! - Reasoning loop bounds (`[agent]`)
//! - Log level and file logging (`[logging]`)
//! - Config file layering (user config + project-local overrides)
//! - API key resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    LoadedConfig, config_dir, config_path, load_config, load_config_file,
    load_config_with_options, log_dir, save_config,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedSecret, SecretSource, require_api_key, resolve_api_key};
pub use types::*;
