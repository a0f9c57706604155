//! The tool-calling completion loop

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{ApiKey, ConfigResolver, ModelKind, StoreScope};
use crate::llm::error::Result;
use crate::llm::{
    CHAT_COMPLETIONS_PATH, COMPLETION_TIMEOUT, ChatCompletionRequest, ChatCompletionResponse,
    ChatTool, CompletionError, Conversation, MAX_TOOL_ITERATIONS, Message, MessageContent,
    ContentPart, ToolCallRequest, Transport,
};
use crate::tools::{ToolError, ToolRegistry};

/// Content of the `tool` message sent back for a tool call missing its id,
/// function name or arguments
pub const MALFORMED_TOOL_CALL_MESSAGE: &str = "Error: AI returned an invalid tool call structure.";

/// Sends a conversation and returns the model's final answer
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run `messages` against the model configured for `kind`, offering the
    /// tools named in `tool_ids`. Returns the trimmed final content.
    async fn complete(
        &self,
        messages: Vec<Message>,
        kind: ModelKind,
        tool_ids: &[String],
        scope: StoreScope,
    ) -> Result<String>;
}

/// [`CompletionService`] that talks to the API through a [`Transport`]
pub struct CompletionClient {
    transport: Arc<dyn Transport>,
    config: ConfigResolver,
    registry: Arc<ToolRegistry>,
    max_iterations: usize,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: ConfigResolver,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            transport,
            config,
            registry,
            max_iterations: MAX_TOOL_ITERATIONS,
            timeout: COMPLETION_TIMEOUT,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Definitions for the requested tools. Unknown identifiers are skipped.
    fn resolve_tools(&self, tool_ids: &[String]) -> Vec<ChatTool> {
        tool_ids
            .iter()
            .filter_map(|id| match self.registry.definition(id) {
                Ok(definition) => Some(ChatTool::from(definition)),
                Err(e) => {
                    tracing::warn!(tool = %id, error = %e, "Could not get tool definition, skipping tool");
                    None
                }
            })
            .collect()
    }

    /// One round-trip. A provider `error` object in the body is returned as
    /// [`CompletionError::Provider`].
    async fn request(
        &self,
        api_key: &ApiKey,
        model: &str,
        messages: &[Message],
        tools: Option<&[ChatTool]>,
        call: &str,
    ) -> Result<ChatCompletionResponse> {
        let request = ChatCompletionRequest::new(model, messages, tools);
        let body = serde_json::to_value(&request)?;

        tracing::debug!(
            call = %call,
            model = %model,
            messages_count = messages.len(),
            tools_provided = request.tools.is_some(),
            "Sending completion request"
        );

        let raw = self
            .transport
            .post_json(CHAT_COMPLETIONS_PATH, Some(api_key), &body, self.timeout)
            .await?;

        let response: ChatCompletionResponse = serde_json::from_value(raw)
            .map_err(|e| CompletionError::unexpected(call, e.to_string()))?;

        if let Some(error) = &response.error {
            let message = error
                .message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::error!(call = %call, error = %message, "Provider returned an error");
            return Err(CompletionError::Provider {
                call: call.to_string(),
                message,
            });
        }

        Ok(response)
    }

    /// Execute one raw tool call and build the `tool` message answering it.
    /// Failures become the message content.
    async fn handle_tool_call(&self, raw: &Value, scope: StoreScope, call: &str) -> Message {
        let request = match ToolCallRequest::parse(raw) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(call = %call, error = %e, "Invalid tool call structure received from AI");
                let (id, name) = match e {
                    ToolError::MalformedCall { id, name, .. } => (id, name),
                    _ => (None, None),
                };
                return Message::tool_result(
                    id.unwrap_or_else(|| "unknown".to_string()),
                    name.unwrap_or_else(|| "unknown".to_string()),
                    MALFORMED_TOOL_CALL_MESSAGE,
                );
            }
        };

        match self.run_tool(&request, scope).await {
            Ok(output) => {
                tracing::info!(call = %call, tool = %request.function_name, "Tool executed");
                Message::tool_result(request.id, request.function_name, output)
            }
            Err(e) => {
                tracing::error!(
                    call = %call,
                    tool = %request.function_name,
                    error = %e,
                    "Error executing tool"
                );
                Message::tool_result(
                    request.id,
                    request.function_name,
                    format!("Error executing tool: {e}"),
                )
            }
        }
    }

    async fn run_tool(
        &self,
        request: &ToolCallRequest,
        scope: StoreScope,
    ) -> std::result::Result<String, ToolError> {
        let tool = self.registry.get(&request.function_name)?;
        let arguments = request.arguments()?;
        tool.execute(arguments, scope).await
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    async fn complete(
        &self,
        messages: Vec<Message>,
        kind: ModelKind,
        tool_ids: &[String],
        scope: StoreScope,
    ) -> Result<String> {
        let api_key = self.config.resolve_api_key(scope).ok_or_else(|| {
            CompletionError::configuration(format!("API key is not configured for store {scope}"))
        })?;
        let model = self.config.resolve_model(kind, scope);
        if model.trim().is_empty() {
            return Err(CompletionError::configuration(format!(
                "Could not determine AI model for kind \"{kind}\""
            )));
        }

        let tools = self.resolve_tools(tool_ids);
        let mut tools_enabled = !tools.is_empty();
        let mut conversation = Conversation::from_messages(messages);

        for iteration in 0..self.max_iterations {
            let call = format!("{}_call{}", kind, iteration + 1);
            let offered = tools_enabled.then_some(tools.as_slice());

            let response = match self
                .request(&api_key, &model, conversation.messages(), offered, &call)
                .await
            {
                Err(e) if offered.is_some() && e.is_tool_use_unsupported() => {
                    tracing::warn!(call = %call, model = %model, error = %e, "Retrying without tools");
                    tools_enabled = false;
                    self.request(&api_key, &model, conversation.messages(), None, &call)
                        .await?
                }
                other => other?,
            };

            let message = response
                .first_message()
                .cloned()
                .ok_or_else(|| {
                    tracing::error!(call = %call, "Could not extract AI message from response");
                    CompletionError::unexpected(&call, "missing choices[0].message")
                })?;

            if !message.has_tool_calls() {
                let content = final_content(&message);
                conversation.push(message);
                return match content {
                    Some(content) => {
                        tracing::debug!(call = %call, "Completion finished");
                        Ok(content.trim().to_string())
                    }
                    None => {
                        tracing::error!(call = %call, "Final response has no content");
                        Err(CompletionError::EmptyResponse { call })
                    }
                };
            }

            let tool_calls = message.tool_calls.clone().unwrap_or_default();
            conversation.push(message);

            if iteration + 1 >= self.max_iterations {
                tracing::error!(
                    call = %call,
                    max = self.max_iterations,
                    "Max tool iterations reached, but AI requested further tool calls"
                );
                return Err(CompletionError::MaxIterationsExceeded {
                    max: self.max_iterations,
                });
            }

            tracing::info!(call = %call, tool_calls = tool_calls.len(), "Processing tool calls");
            for raw in &tool_calls {
                let result = self.handle_tool_call(raw, scope, &call).await;
                conversation.push(result);
            }
        }

        tracing::error!(max = self.max_iterations, "Max tool iterations reached without a final response");
        Err(CompletionError::MaxIterationsExceeded {
            max: self.max_iterations,
        })
    }
}

/// Text of a final assistant message; multimodal text parts are joined
fn final_content(message: &Message) -> Option<String> {
    match &message.content {
        Some(MessageContent::Text(text)) => Some(text.clone()),
        Some(MessageContent::Parts(parts)) => Some(
            parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } | ContentPart::Other(_) => None,
                })
                .collect::<String>(),
        ),
        None => None,
    }
}
