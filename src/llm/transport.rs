//! HTTP transport for the completion API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

use crate::core::ApiKey;
use crate::llm::TransportError;

/// Maximum characters kept from error bodies and logged payload previews
pub const DETAIL_LIMIT: usize = 500;

/// Raw JSON request/response plumbing against the API base
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `path`, relative to the API base
    async fn post_json(
        &self,
        path: &str,
        api_key: Option<&ApiKey>,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError>;

    /// GET `path`, relative to the API base
    async fn get_json(
        &self,
        path: &str,
        api_key: Option<&ApiKey>,
        timeout: Duration,
    ) -> Result<Value, TransportError>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| TransportError::Request {
                url: base_url.clone(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        url: String,
        request: RequestBuilder,
        api_key: Option<&ApiKey>,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let request = match api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        };

        let response = request.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: url.clone(),
                    timeout_secs: timeout.as_secs(),
                }
            } else {
                TransportError::Request {
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: url.clone(),
                    timeout_secs: timeout.as_secs(),
                }
            } else {
                TransportError::Decode {
                    url: url.clone(),
                    message: format!("Failed to read response body: {e}"),
                }
            }
        })?;

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            response_preview = %preview(body.trim()),
            "API response"
        );

        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
                details: error_details(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        path: &str,
        api_key: Option<&ApiKey>,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let url = self.url(path);
        tracing::debug!(url = %url, payload_preview = %preview(&body.to_string()), "API request");
        let request = self.client.post(&url).json(body);
        self.send(url, request, api_key, timeout).await
    }

    async fn get_json(
        &self,
        path: &str,
        api_key: Option<&ApiKey>,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "API request");
        let request = self.client.get(&url);
        self.send(url, request, api_key, timeout).await
    }
}

/// Extract the provider's message from an error body (`error.message`, then
/// `message`), else use the raw body
fn error_details(body: &str) -> String {
    let details = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .or_else(|| json.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if details.is_empty() {
        return "Could not extract error details.".to_string();
    }
    truncate_chars(&details, DETAIL_LIMIT)
}

/// First `limit` characters of `text`
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Log preview of a payload
pub(crate) fn preview(text: &str) -> String {
    let truncated = truncate_chars(text, DETAIL_LIMIT);
    if truncated.len() < text.len() {
        format!("{truncated}...")
    } else {
        truncated
    }
}
