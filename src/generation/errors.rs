//! Error types for the generation domain

use thiserror::Error;

use crate::llm::CompletionError;
use crate::prompts::PromptError;

/// Errors surfaced by the two-stage generator.
///
/// Only `MissingInstruction` and `Configuration` normally reach the caller;
/// prompt and completion failures inside a stage are folded into the
/// result's `html` field instead.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Missing instruction: {0}")]
    MissingInstruction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl GenerationError {
    pub fn missing_instruction<S: Into<String>>(message: S) -> Self {
        Self::MissingInstruction(message.into())
    }
}
