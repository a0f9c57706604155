//! Tool capability and the immutable registry the completion loop dispatches through

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::StoreScope;
use crate::tools::ToolError;

/// Function definition advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, identical to its registry identifier
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object (type/properties/required)
    pub parameters: Value,
}

/// A capability the model may invoke mid-conversation
#[async_trait]
pub trait Tool: Send + Sync {
    /// Definition sent to the provider with each request
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with decoded arguments. The returned text is sent back to
    /// the model verbatim.
    async fn execute(&self, arguments: Map<String, Value>, scope: StoreScope)
    -> Result<String, ToolError>;
}

/// Lookup from tool identifier to tool, fixed at construction
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with no tools
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Get a tool by identifier
    pub fn get(&self, identifier: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .get(identifier)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(identifier.to_string()))
    }

    /// Definition of a registered tool
    pub fn definition(&self, identifier: &str) -> Result<ToolDefinition, ToolError> {
        self.get(identifier).map(|tool| tool.definition())
    }

    /// All registered identifiers, sorted
    pub fn list_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.tools.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.tools.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_identifiers())
            .finish()
    }
}

/// Validating builder for [`ToolRegistry`]
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Register `tool` under `identifier`.
    ///
    /// Rejects empty or non `[A-Za-z0-9_-]` identifiers, duplicates, tools
    /// whose definition name differs from the identifier, and definitions whose
    /// parameter schema is not an object schema.
    pub fn register(
        mut self,
        identifier: impl Into<String>,
        tool: Arc<dyn Tool>,
    ) -> Result<Self, ToolError> {
        let identifier = identifier.into();
        validate_identifier(&identifier)?;

        if self.tools.contains_key(&identifier) {
            return Err(ToolError::invalid_registration(
                &identifier,
                "identifier is already registered",
            ));
        }

        let definition = tool.definition();
        if definition.name != identifier {
            return Err(ToolError::invalid_registration(
                &identifier,
                format!(
                    "definition name '{}' does not match identifier",
                    definition.name
                ),
            ));
        }
        if definition.description.trim().is_empty() {
            return Err(ToolError::invalid_registration(
                &identifier,
                "definition has no description",
            ));
        }
        if definition.parameters.get("type").and_then(Value::as_str) != Some("object") {
            return Err(ToolError::invalid_registration(
                &identifier,
                "parameter schema must have type \"object\"",
            ));
        }

        tracing::debug!(tool = %identifier, "Registered AI tool");
        self.tools.insert(identifier, tool);
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

fn validate_identifier(identifier: &str) -> Result<(), ToolError> {
    if identifier.is_empty() {
        return Err(ToolError::invalid_registration(
            identifier,
            "identifier cannot be empty",
        ));
    }
    if !identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ToolError::invalid_registration(
            identifier,
            "identifier may only contain ASCII letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}
