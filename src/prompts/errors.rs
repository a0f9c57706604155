//! Error types for prompt loading

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    /// Template missing, unreadable or empty. Fatal for the stage that needs it.
    #[error("Could not load prompt template '{name}': {reason}")]
    TemplateUnavailable { name: String, reason: String },
}

impl PromptError {
    pub fn unavailable<S: Into<String>>(name: &str, reason: S) -> Self {
        Self::TemplateUnavailable {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
