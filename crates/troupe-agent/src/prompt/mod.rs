//! System prompt generation module.
//!
//! Prompts are assembled from a backstory, the protocol for the selected
//! [`PromptMode`] and the tool catalog.
//!
//! # Example
//!
//! ```rust,ignore
//! use troupe_agent::prompt::{PromptMode, SystemPromptBuilder};
//!
//! let prompt = SystemPromptBuilder::new()
//!     .with_mode(PromptMode::React)
//!     .with_backstory("You are a meticulous data analyst.")
//!     .with_tools(&tool_registry)
//!     .build();
//! ```

mod builder;
mod mode;

pub use builder::SystemPromptBuilder;
pub use mode::PromptMode;

/// Marker a critic emits when the generation needs no further changes.
pub const REFLECTION_STOP_MARKER: &str = "<OK>";

/// Instructions appended to a generation system prompt.
pub const GENERATION_INSTRUCTIONS: &str = "Your task is to generate the best content possible for the user's request. \
If the user provides critique, respond with a revised version of your previous attempt.";

/// Instructions appended to a reflection system prompt.
pub const REFLECTION_INSTRUCTIONS: &str = "You are tasked with generating critique and recommendations for the user's generated content. \
If the user content has something wrong or something to be improved, output a list of recommendations and critiques. \
If the user content is ok and there's nothing to change, output this: <OK>";

/// Default generation persona used when none is given.
pub const DEFAULT_GENERATION_PROMPT: &str = "You are a helpful writer.";

/// Default critic persona used when none is given.
pub const DEFAULT_REFLECTION_PROMPT: &str = "You are an experienced, demanding reviewer.";

/// Join a persona prompt with fixed instructions.
pub fn with_instructions(persona: &str, instructions: &str) -> String {
    let persona = persona.trim();
    if persona.is_empty() {
        instructions.to_string()
    } else {
        format!("{persona}\n\n{instructions}")
    }
}
