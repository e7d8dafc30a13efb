//! LLM client abstraction for Troupe.
//!
//! This crate provides a small, provider-agnostic interface for chat
//! completions. Tools are described in prompt text rather than through a
//! provider's native function-calling API, so messages are plain
//! `{role, content}` pairs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  LlmBackend trait                       │
//! │  - complete() -> CompletionResponse     │
//! │  - complete_text() -> String            │
//! └─────────────────────────────────────────┘
//!                    │
//!          ┌─────────┴─────────┐
//!          ▼                   ▼
//!   ┌─────────────┐     ┌─────────────┐
//!   │ OpenAiBackend│     │ MockBackend │
//!   │ (Groq/Ollama)│     │  (scripted) │
//!   └─────────────┘     └─────────────┘
//! ```
//!
//! [`ChatHistory`] is the bounded message log used by the reasoning loops.

pub mod backend;
pub mod error;
pub mod history;
pub mod openai;
pub mod types;

pub use backend::{LlmBackend, MockBackend, MockResponse, SharedBackend};
pub use error::{LlmError, Result};
pub use history::ChatHistory;
pub use openai::{DEFAULT_GROQ_MODEL, OpenAiBackend, OpenAiConfig, create_shared_backend};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, Usage};
