//! Error types for tool registration and execution

use thiserror::Error;

/// Errors raised by the tool registry and by individual tools.
///
/// Inside the completion loop none of these abort the conversation; they are
/// turned into `tool` messages so the model can see what went wrong.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Identifier was not registered
    #[error("AI tool with identifier \"{0}\" not found")]
    NotFound(String),

    /// Registration rejected while building the registry
    #[error("Invalid tool registration '{identifier}': {reason}")]
    InvalidRegistration { identifier: String, reason: String },

    /// Provider sent a tool call without an id, function name or arguments
    #[error("Malformed tool call (id: {}, function: {}): {reason}", .id.as_deref().unwrap_or("unknown"), .name.as_deref().unwrap_or("unknown"))]
    MalformedCall {
        id: Option<String>,
        name: Option<String>,
        reason: String,
    },

    /// Arguments could not be decoded or failed validation
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    pub fn invalid_registration<S: Into<String>>(identifier: &str, reason: S) -> Self {
        Self::InvalidRegistration {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    pub fn execution<S: Into<String>>(message: S) -> Self {
        Self::Execution(message.into())
    }
}
