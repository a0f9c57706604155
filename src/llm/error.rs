//! Error types for the completion client and its HTTP transport

use thiserror::Error;

/// Transport-level failures (connection, timeout, non-2xx status, bad body)
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Error calling API [{url}]: {message}")]
    Request { url: String, message: String },

    #[error("Request to API [{url}] timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Non-2xx response. `details` is the provider's message when the body
    /// carried one, truncated to 500 characters.
    #[error("Error communicating with API [{url}]: HTTP Status {status}. Details: {details}")]
    Status {
        url: String,
        status: u16,
        details: String,
    },

    #[error("Invalid response received from API [{url}]: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    /// Human-readable provider detail carried by the error, if any
    pub fn details(&self) -> &str {
        match self {
            TransportError::Status { details, .. } => details,
            TransportError::Request { message, .. } | TransportError::Decode { message, .. } => {
                message
            }
            TransportError::Timeout { .. } => "",
        }
    }
}

/// Result type alias for completion operations
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Failures of the completion loop as a whole.
///
/// Per-tool-call problems never show up here; the loop reports them to the
/// model as `tool` messages.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// Missing API key or model for the scope
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body carried an `error` object
    #[error("AI Service Error [{call}]: {message}")]
    Provider { call: String, message: String },

    #[error("API returned an unexpected response format [{call}]: {reason}")]
    UnexpectedResponse { call: String, reason: String },

    #[error("API returned empty content [{call}]")]
    EmptyResponse { call: String },

    #[error("Maximum tool execution iterations ({max}) reached")]
    MaxIterationsExceeded { max: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CompletionError {
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    pub fn unexpected<S: Into<String>>(call: &str, reason: S) -> Self {
        Self::UnexpectedResponse {
            call: call.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the provider rejected the request because no endpoint serving
    /// the model supports tool use
    pub fn is_tool_use_unsupported(&self) -> bool {
        let text = match self {
            CompletionError::Transport(e) => e.to_string(),
            CompletionError::Provider { message, .. } => message.clone(),
            _ => return false,
        };
        mentions_tool_use_unsupported(&text)
    }
}

const TOOL_USE_UNSUPPORTED: &str = "no endpoints found that support tool use";

pub(crate) fn mentions_tool_use_unsupported(text: &str) -> bool {
    text.to_lowercase().contains(TOOL_USE_UNSUPPORTED)
}
