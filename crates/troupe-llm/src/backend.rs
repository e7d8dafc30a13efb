//! LLM Backend trait and implementations.
//!
//! This module defines the abstraction over completion providers and a
//! scripted mock used by tests throughout the workspace.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{LlmError, Result};
use crate::types::{CompletionRequest, CompletionResponse, Message, StopReason, Usage};

// ─────────────────────────────────────────────────────────────────────────────
// LLM Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for LLM backend providers.
///
/// The agent layer treats a backend as an opaque, possibly slow and possibly
/// failing remote call. Timeouts and retry policy belong to the
/// implementation, never to the caller.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Execute a completion request and return the full response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Complete a conversation and return only the generated text.
    async fn complete_text(&self, messages: &[Message], model: &str) -> Result<String> {
        let request = CompletionRequest::new(model, messages.to_vec());
        let response = self.complete(request).await?;
        Ok(response.content)
    }
}

/// A backend that can be shared across threads.
pub type SharedBackend = Arc<dyn LlmBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A scripted reply for [`MockBackend`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with this text.
    Text(String),
    /// Fail the request with a backend error carrying this message.
    Error(String),
}

impl MockResponse {
    /// Convenience constructor for a text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Convenience constructor for a failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }
}

/// A mock backend for testing purposes.
///
/// Returns pre-configured responses in order, useful for deterministic testing
/// of the reasoning loops and crew execution.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    responses: Mutex<VecDeque<MockResponse>>,
    request_log: Mutex<Vec<CompletionRequest>>,
}

impl MockBackend {
    /// Create a new mock backend with the given responses.
    ///
    /// Responses are returned in order. If more requests are made than
    /// responses available, an error is returned.
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: Mutex::new(responses.into()),
            request_log: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock backend from plain text replies.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(MockResponse::text).collect())
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![MockResponse::text(text)])
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.request_log.lock().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().len()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request.model.clone();
        let index = {
            let mut log = self.request_log.lock();
            log.push(request);
            log.len()
        };

        let next = self.responses.lock().pop_front();
        match next {
            Some(MockResponse::Text(text)) => Ok(CompletionResponse::new(
                format!("mock_msg_{index}"),
                model,
                text,
                StopReason::EndTurn,
                Usage::new(10, 20),
            )),
            Some(MockResponse::Error(message)) => Err(LlmError::Backend(message)),
            None => Err(LlmError::Backend(
                "MockBackend: no more responses available".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_single_response() {
        let backend = MockBackend::with_text("Hello!");

        let request = CompletionRequest::new("test-model", vec![Message::user("Hi")]);
        let response = backend.complete(request).await.unwrap();

        assert_eq!(response.text(), "Hello!");
        assert_eq!(response.model, "test-model");
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_multiple_responses() {
        let backend = MockBackend::with_texts(["First", "Second"]);

        let r1 = backend
            .complete_text(&[Message::user("1")], "m")
            .await
            .unwrap();
        let r2 = backend
            .complete_text(&[Message::user("2")], "m")
            .await
            .unwrap();

        assert_eq!(r1, "First");
        assert_eq!(r2, "Second");
        assert_eq!(backend.request_count(), 2);
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn test_mock_backend_exhausted() {
        let backend = MockBackend::new(vec![]);

        let result = backend.complete_text(&[Message::user("Hi")], "m").await;
        assert!(matches!(result, Err(LlmError::Backend(_))));
    }

    #[tokio::test]
    async fn test_mock_backend_scripted_error() {
        let backend = MockBackend::new(vec![MockResponse::error("boom"), MockResponse::text("ok")]);

        let err = backend
            .complete_text(&[Message::user("Hi")], "m")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));

        let ok = backend.complete_text(&[Message::user("Hi")], "m").await;
        assert_eq!(ok.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_mock_backend_logs_history() {
        let backend = MockBackend::with_text("done");
        let history = vec![Message::system("be brief"), Message::user("summarize")];

        backend.complete_text(&history, "llama").await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests[0].model, "llama");
        assert_eq!(requests[0].messages, history);
    }
}
