//! Wire types for the chat completions API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};

use crate::tools::{ToolDefinition, ToolError};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image reference inside a multimodal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One element of a multimodal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
    /// Provider-specific part (e.g. `reasoning`), kept as received
    #[serde(untagged)]
    Other(Value),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Message body: plain text or an ordered list of parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A chat message as sent to and received from the API.
///
/// Assistant messages keep their `tool_calls` as raw JSON, and any field this
/// type does not model lands in `extra`, so a response can be replayed to the
/// provider exactly as it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Some providers omit the role on response messages
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_role() -> Role {
    Role::Assistant
}

impl Message {
    fn with_content(role: Role, content: MessageContent) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
            name: None,
            extra: Map::new(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::with_content(Role::System, MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_content(Role::User, MessageContent::Text(text.into()))
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::with_content(Role::User, MessageContent::Parts(parts))
    }

    /// Result of a tool call, answering `tool_call_id`
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            ..Self::with_content(Role::Tool, MessageContent::Text(content.into()))
        }
    }

    /// Plain-text content, if the message has any
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Whether the message requests at least one tool call
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// Tool entry of a completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: ToolDefinition,
}

impl From<ToolDefinition> for ChatTool {
    fn from(function: ToolDefinition) -> Self {
        Self {
            kind: "function",
            function,
        }
    }
}

/// Validated tool call taken from an assistant message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub id: String,
    pub function_name: String,
    pub arguments_json: String,
}

impl ToolCallRequest {
    /// Validate a raw `tool_calls[]` entry. A missing id, function name or
    /// arguments field is a [`ToolError::MalformedCall`].
    pub fn parse(raw: &Value) -> Result<Self, ToolError> {
        let id = match raw.get("id") {
            Some(Value::Number(n)) => Some(n.to_string()),
            other => non_empty_str(other),
        };
        let function = raw.get("function");
        let name = non_empty_str(function.and_then(|f| f.get("name")));

        let arguments_json = match function.and_then(|f| f.get("arguments")) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            // Some providers send the arguments already decoded
            Some(other) => Some(other.to_string()),
        };

        match (id, name, arguments_json) {
            (Some(id), Some(function_name), Some(arguments_json)) => Ok(Self {
                id,
                function_name,
                arguments_json,
            }),
            (id, name, arguments) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push("id");
                }
                if name.is_none() {
                    missing.push("function name");
                }
                if arguments.is_none() {
                    missing.push("arguments");
                }
                Err(ToolError::MalformedCall {
                    id,
                    name,
                    reason: format!("missing {}", missing.join(", ")),
                })
            }
        }
    }

    /// Decode `arguments_json` into an argument object. Blank input counts as
    /// no arguments.
    pub fn arguments(&self) -> Result<Map<String, Value>, ToolError> {
        if self.arguments_json.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&self.arguments_json) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ToolError::InvalidArguments(format!(
                "expected a JSON object, got {other}"
            ))),
            Err(e) => Err(ToolError::InvalidArguments(e.to_string())),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Body of `POST /chat/completions`
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<&'a [ChatTool]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Request with `tool_choice = "auto"` whenever tools are offered
    pub fn new(model: &'a str, messages: &'a [Message], tools: Option<&'a [ChatTool]>) -> Self {
        let tools = tools.filter(|t| !t.is_empty());
        Self {
            model,
            messages,
            tools,
            tool_choice: tools.map(|_| "auto"),
        }
    }
}

/// `error` object of a provider response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Body of a `POST /chat/completions` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub error: Option<ProviderError>,
    #[serde(default)]
    pub usage: Option<Value>,
}

impl ChatCompletionResponse {
    /// Message of the first choice
    pub fn first_message(&self) -> Option<&Message> {
        self.choices.first().and_then(|c| c.message.as_ref())
    }
}
