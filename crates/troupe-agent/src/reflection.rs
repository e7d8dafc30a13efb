//! Generate / critique loop.
//!
//! A generator produces a draft, a critic reviews it, and the critique is fed
//! back to the generator as a user message. The loop stops after a fixed
//! number of steps or as soon as the critic answers with the stop marker.

use troupe_llm::{ChatHistory, DEFAULT_GROQ_MODEL, Message, SharedBackend};

use crate::error::Result;
use crate::prompt::{
    GENERATION_INSTRUCTIONS, REFLECTION_INSTRUCTIONS, REFLECTION_STOP_MARKER, with_instructions,
};

/// Default number of generate / critique steps.
pub const DEFAULT_REFLECTION_STEPS: u32 = 3;

/// Default size of each pinned history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 3;

/// Final draft and how the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionOutcome {
    /// The last generation.
    pub output: String,
    /// Number of generations produced.
    pub steps: u32,
    /// Whether the critic accepted the draft with the stop marker.
    pub accepted: bool,
}

/// Agent alternating generation and self-critique.
pub struct ReflectionAgent {
    backend: SharedBackend,
    model: String,
    history_capacity: usize,
}

impl ReflectionAgent {
    /// Create an agent with the default model and history capacity.
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            model: DEFAULT_GROQ_MODEL.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the capacity of both histories.
    ///
    /// Values below 2 are raised to 2 so the histories can hold the pinned
    /// system prompt plus one message.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(2);
        self
    }

    /// Run the loop and return the last generation.
    pub async fn run(
        &self,
        generation_system_prompt: &str,
        reflection_system_prompt: &str,
        user_msg: &str,
        n_steps: u32,
    ) -> Result<String> {
        Ok(self
            .run_detailed(generation_system_prompt, reflection_system_prompt, user_msg, n_steps)
            .await?
            .output)
    }

    /// Run the loop, reporting how it ended.
    ///
    /// At least one step always runs.
    pub async fn run_detailed(
        &self,
        generation_system_prompt: &str,
        reflection_system_prompt: &str,
        user_msg: &str,
        n_steps: u32,
    ) -> Result<ReflectionOutcome> {
        let n_steps = n_steps.max(1);

        let mut generation_history = ChatHistory::pinned(
            vec![
                Message::system(with_instructions(
                    generation_system_prompt,
                    GENERATION_INSTRUCTIONS,
                )),
                Message::user(user_msg),
            ],
            self.history_capacity,
        );
        let mut reflection_history = ChatHistory::pinned(
            vec![Message::system(with_instructions(
                reflection_system_prompt,
                REFLECTION_INSTRUCTIONS,
            ))],
            self.history_capacity,
        );

        let mut generation = String::new();
        let mut steps = 0;

        for step in 1..=n_steps {
            tracing::info!(step, total = n_steps, "Reflection step");

            generation = self
                .backend
                .complete_text(generation_history.messages(), &self.model)
                .await?;
            steps = step;
            generation_history.push(Message::assistant(generation.clone()));
            reflection_history.push(Message::user(generation.clone()));

            let critique = self
                .backend
                .complete_text(reflection_history.messages(), &self.model)
                .await?;

            if critique.contains(REFLECTION_STOP_MARKER) {
                tracing::info!(step, "Critic accepted the generation");
                return Ok(ReflectionOutcome {
                    output: generation,
                    steps,
                    accepted: true,
                });
            }

            tracing::debug!(step, critique_len = critique.len(), "Critique received");
            reflection_history.push(Message::assistant(critique.clone()));
            generation_history.push(Message::user(critique));
        }

        Ok(ReflectionOutcome {
            output: generation,
            steps,
            accepted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use troupe_llm::{MockBackend, Role};

    use super::*;

    #[tokio::test]
    async fn test_runs_all_steps_without_marker() {
        let backend = Arc::new(MockBackend::with_texts([
            "draft 1", "critique 1", "draft 2", "critique 2",
        ]));
        let agent = ReflectionAgent::new(backend.clone());

        let outcome = agent
            .run_detailed("You write haiku.", "You judge haiku.", "A haiku about rust", 2)
            .await
            .unwrap();

        assert_eq!(outcome.output, "draft 2");
        assert_eq!(outcome.steps, 2);
        assert!(!outcome.accepted);
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn test_stop_marker_ends_early() {
        let backend = Arc::new(MockBackend::with_texts(["draft 1", "Looks great. <OK>", "unused"]));
        let agent = ReflectionAgent::new(backend.clone());

        let output = agent.run("", "", "write", 3).await.unwrap();
        assert_eq!(output, "draft 1");
        assert_eq!(backend.remaining(), 1);
    }

    #[tokio::test]
    async fn test_histories_keep_system_prompt_pinned() {
        let backend = Arc::new(MockBackend::with_texts([
            "draft 1", "critique 1", "draft 2", "critique 2", "draft 3", "critique 3",
        ]));
        let agent = ReflectionAgent::new(backend.clone()).with_model("m");
        agent.run("Writer.", "Critic.", "topic", 3).await.unwrap();

        let requests = backend.requests();

        // Third generation: pinned system prompt, then the last two messages.
        let third_generation = &requests[4].messages;
        assert_eq!(third_generation.len(), 3);
        assert_eq!(third_generation[0].role, Role::System);
        assert!(third_generation[0].content.starts_with("Writer."));
        assert_eq!(third_generation[1].content, "draft 2");
        assert_eq!(third_generation[2].content, "critique 2");

        // Critic sees its instructions and the latest draft.
        let last_critique = &requests[5].messages;
        assert!(last_critique[0].content.contains("<OK>"));
        assert_eq!(last_critique.last().unwrap().content, "draft 3");
        assert!(last_critique.len() <= 3);
    }

    #[tokio::test]
    async fn test_zero_steps_runs_once() {
        let backend = Arc::new(MockBackend::with_texts(["only draft", "fine"]));
        let agent = ReflectionAgent::new(backend);
        let outcome = agent.run_detailed("", "", "x", 0).await.unwrap();
        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.output, "only draft");
    }

    #[test]
    fn test_capacity_floor() {
        let agent = ReflectionAgent::new(Arc::new(MockBackend::new(vec![]))).with_history_capacity(1);
        assert_eq!(agent.history_capacity, 2);
    }
}
