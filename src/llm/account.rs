//! Account and model metadata calls (`GET /key`, `GET /models`)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::core::{ConfigResolver, StoreScope};
use crate::llm::error::Result;
use crate::llm::{CompletionError, KEY_PATH, METADATA_TIMEOUT, MODELS_PATH, Transport};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateLimit {
    #[serde(default)]
    pub requests: Option<i64>,
    #[serde(default)]
    pub interval: Option<String>,
}

/// Credit and rate-limit state of the configured API key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountStatus {
    #[serde(default)]
    pub limit_remaining: Option<f64>,
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub usage: Option<f64>,
    #[serde(default)]
    pub is_free_tier: Option<bool>,
    #[serde(default)]
    pub rate_limit: Option<RateLimit>,
}

/// Per-token prices as reported by the provider (decimal strings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelPricing {
    pub prompt: Option<String>,
    pub completion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDetails {
    pub id: String,
    pub name: String,
    pub pricing: ModelPricing,
}

impl ModelDetails {
    fn from_entry(id: &str, entry: &Value) -> Self {
        let price = |field: &str| {
            entry.get("pricing").and_then(|p| p.get(field)).and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };
        Self {
            id: id.to_string(),
            name: entry
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(id)
                .to_string(),
            pricing: ModelPricing {
                prompt: price("prompt"),
                completion: price("completion"),
            },
        }
    }
}

/// Reads account status and model metadata
pub struct AccountClient {
    transport: Arc<dyn Transport>,
    config: ConfigResolver,
}

impl AccountClient {
    pub fn new(transport: Arc<dyn Transport>, config: ConfigResolver) -> Self {
        Self { transport, config }
    }

    /// Status of the API key configured for `scope`
    pub async fn account_status(&self, scope: StoreScope) -> Result<AccountStatus> {
        let api_key = self.config.resolve_api_key(scope).ok_or_else(|| {
            tracing::warn!(store = %scope, "Cannot get account status: API key not configured");
            CompletionError::configuration(format!("API key is not configured for store {scope}"))
        })?;

        let response = self
            .transport
            .get_json(KEY_PATH, Some(&api_key), METADATA_TIMEOUT)
            .await?;

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            tracing::warn!(store = %scope, error = %message, "Account status request failed");
            return Err(CompletionError::Provider {
                call: "account_status".to_string(),
                message,
            });
        }

        let data = response
            .get("data")
            .filter(|d| d.is_object())
            .cloned()
            .ok_or_else(|| CompletionError::unexpected("account_status", "missing data object"))?;

        serde_json::from_value(data)
            .map_err(|e| CompletionError::unexpected("account_status", e.to_string()))
    }

    /// Details of `model_id`, or `None` when the provider does not list it.
    /// The key is sent when one is configured.
    pub async fn model_details(
        &self,
        model_id: &str,
        scope: StoreScope,
    ) -> Result<Option<ModelDetails>> {
        let api_key = self.config.resolve_api_key(scope);
        let response = self
            .transport
            .get_json(MODELS_PATH, api_key.as_ref(), METADATA_TIMEOUT)
            .await?;

        let models = response
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| CompletionError::unexpected("model_details", "missing data array"))?;

        let details = models
            .iter()
            .find(|entry| entry.get("id").and_then(Value::as_str) == Some(model_id))
            .map(|entry| ModelDetails::from_entry(model_id, entry));

        if details.is_none() {
            tracing::warn!(model = %model_id, "Model not found in provider model list");
        }
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Settings;
    use crate::llm::HttpTransport;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, settings: &str) -> AccountClient {
        let settings = Settings::from_toml_str(settings).unwrap();
        let transport = HttpTransport::new(server.uri()).unwrap();
        AccountClient::new(Arc::new(transport), ConfigResolver::new(Arc::new(settings)))
    }

    const SETTINGS: &str = "[default]\napi_key = \"sk-test\"\n";

    #[tokio::test]
    async fn test_account_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "label": "sk-or-v1-abc",
                    "limit": 10.0,
                    "limit_remaining": 7.5,
                    "usage": 2.5,
                    "is_free_tier": false,
                    "rate_limit": {"requests": 20, "interval": "10s"}
                }
            })))
            .mount(&mock_server)
            .await;

        let status = client(&mock_server, SETTINGS)
            .account_status(StoreScope(1))
            .await
            .unwrap();
        assert_eq!(status.limit_remaining, Some(7.5));
        assert_eq!(status.usage, Some(2.5));
        assert_eq!(status.is_free_tier, Some(false));
        assert_eq!(
            status.rate_limit,
            Some(RateLimit {
                requests: Some(20),
                interval: Some("10s".to_string())
            })
        );
    }

    #[tokio::test]
    async fn test_account_status_without_key() {
        let mock_server = MockServer::start().await;
        let result = client(&mock_server, "").account_status(StoreScope(1)).await;
        assert!(matches!(result, Err(CompletionError::Configuration(_))));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_account_status_provider_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": {"message": "Key revoked"}})),
            )
            .mount(&mock_server)
            .await;

        let result = client(&mock_server, SETTINGS)
            .account_status(StoreScope(1))
            .await;
        match result {
            Err(CompletionError::Provider { message, .. }) => assert_eq!(message, "Key revoked"),
            other => panic!("Expected Provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_account_status_missing_data() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server, SETTINGS)
            .account_status(StoreScope(1))
            .await;
        assert!(matches!(result, Err(CompletionError::UnexpectedResponse { .. })));
    }

    #[tokio::test]
    async fn test_model_details() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "a/model", "name": "Model A", "pricing": {"prompt": "0.000001", "completion": "0.000002"}},
                    {"id": "b/model"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, "");
        let details = client
            .model_details("a/model", StoreScope(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.name, "Model A");
        assert_eq!(details.pricing.prompt.as_deref(), Some("0.000001"));
        assert_eq!(details.pricing.completion.as_deref(), Some("0.000002"));

        let details = client
            .model_details("b/model", StoreScope(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.name, "b/model");
        assert_eq!(details.pricing, ModelPricing::default());

        assert!(
            client
                .model_details("c/model", StoreScope(1))
                .await
                .unwrap()
                .is_none()
        );

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }
}
