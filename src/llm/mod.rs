//! Completion client for OpenRouter-style chat completion APIs
//!
//! [`CompletionClient`] runs the tool-calling loop: it sends the conversation,
//! executes any tool calls the model asks for through the
//! [`ToolRegistry`](crate::tools::ToolRegistry), appends the results and
//! resumes until the model answers with plain content.

use std::time::Duration;

pub mod account;
pub mod client;
pub mod conversation;
pub mod error;
pub mod transport;
pub mod types;

pub use account::{AccountClient, AccountStatus, ModelDetails, ModelPricing, RateLimit};
pub use client::{CompletionClient, CompletionService};
pub use conversation::Conversation;
pub use error::{CompletionError, TransportError};
pub use transport::{HttpTransport, Transport};
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatTool, ContentPart, ImageUrl, Message,
    MessageContent, Role, ToolCallRequest,
};

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
pub const KEY_PATH: &str = "/key";
pub const MODELS_PATH: &str = "/models";

/// Timeout for chat completion calls
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(300);
/// Timeout for account and model metadata calls
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(60);
/// Request round-trips allowed per completion
pub const MAX_TOOL_ITERATIONS: usize = 5;
