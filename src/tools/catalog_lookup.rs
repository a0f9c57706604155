//! Built-in tool letting the model pull catalog details mid-conversation

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::core::{ContextProvider, DataSource, DataSourceKind, StoreScope};
use crate::tools::{Tool, ToolDefinition, ToolError};

pub const CATALOG_LOOKUP_TOOL: &str = "catalog_lookup";

/// Looks up a product or category through the [`ContextProvider`]
pub struct CatalogLookupTool {
    provider: Arc<dyn ContextProvider>,
}

impl CatalogLookupTool {
    pub fn new(provider: Arc<dyn ContextProvider>) -> Self {
        Self { provider }
    }

    fn parse_source(arguments: &Map<String, Value>) -> Result<DataSource, ToolError> {
        let kind = arguments
            .get("source_type")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments("missing 'source_type'".to_string()))?
            .parse::<DataSourceKind>()
            .map_err(ToolError::InvalidArguments)?;

        // Models send ids both as strings and as numbers
        let id = match arguments.get("source_id") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        if id.is_empty() {
            return Err(ToolError::InvalidArguments(
                "missing 'source_id'".to_string(),
            ));
        }

        Ok(DataSource::new(kind, id))
    }
}

#[async_trait]
impl Tool for CatalogLookupTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: CATALOG_LOOKUP_TOOL.to_string(),
            description: "Look up catalog details (name, price, descriptions, related products) \
                          for a product or category of the current store."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "source_type": {
                        "type": "string",
                        "enum": ["product", "category"],
                        "description": "Kind of catalog entity to look up."
                    },
                    "source_id": {
                        "type": "string",
                        "description": "Identifier of the product or category."
                    }
                },
                "required": ["source_type", "source_id"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        scope: StoreScope,
    ) -> Result<String, ToolError> {
        let source = Self::parse_source(&arguments)?;
        tracing::debug!(store = %scope, source = %source, "Executing catalog lookup");

        let context = self.provider.build_context(Some(&source), scope).await;
        if context.data_source_context.trim().is_empty() {
            return Ok(format!("No catalog data found for {source}."));
        }
        Ok(context.data_source_context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CatalogContext;

    struct FixedProvider;

    #[async_trait]
    impl ContextProvider for FixedProvider {
        async fn build_context(
            &self,
            source: Option<&DataSource>,
            _scope: StoreScope,
        ) -> CatalogContext {
            let data_source_context = match source {
                Some(s) if s.kind == DataSourceKind::Product && s.id == "42" => {
                    "SKU: TEE-42\nProduct Name: Tee".to_string()
                }
                _ => String::new(),
            };
            CatalogContext {
                store_context: "Store Name: Demo".to_string(),
                data_source_context,
            }
        }
    }

    fn arguments(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[tokio::test]
    async fn test_lookup_product_with_numeric_id() {
        let tool = CatalogLookupTool::new(Arc::new(FixedProvider));
        let output = tool
            .execute(
                arguments(json!({"source_type": "product", "source_id": 42})),
                StoreScope(1),
            )
            .await
            .unwrap();
        assert_eq!(output, "SKU: TEE-42\nProduct Name: Tee");
    }

    #[tokio::test]
    async fn test_lookup_without_data() {
        let tool = CatalogLookupTool::new(Arc::new(FixedProvider));
        let output = tool
            .execute(
                arguments(json!({"source_type": "category", "source_id": "7"})),
                StoreScope(1),
            )
            .await
            .unwrap();
        assert_eq!(output, "No catalog data found for category:7.");
    }

    #[tokio::test]
    async fn test_unknown_source_type_is_rejected() {
        let tool = CatalogLookupTool::new(Arc::new(FixedProvider));
        let result = tool
            .execute(
                arguments(json!({"source_type": "cms_page", "source_id": "7"})),
                StoreScope(1),
            )
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn test_missing_id_is_rejected() {
        let tool = CatalogLookupTool::new(Arc::new(FixedProvider));
        let result = tool
            .execute(arguments(json!({"source_type": "product"})), StoreScope(1))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_definition_matches_identifier() {
        let tool = CatalogLookupTool::new(Arc::new(FixedProvider));
        let definition = tool.definition();
        assert_eq!(definition.name, CATALOG_LOOKUP_TOOL);
        assert_eq!(definition.parameters["type"], "object");
    }
}
