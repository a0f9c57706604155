//! Request-scoped prompt context and the collaborator ports that supply it

use async_trait::async_trait;

use crate::core::{DataSource, StoreScope};

/// Text fragments describing the store and the selected catalog entity.
///
/// Either field may be empty. Lookup failures are embedded as
/// `(Note: ...)` placeholder text instead of being reported as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogContext {
    pub store_context: String,
    pub data_source_context: String,
}

/// Everything the prompt assembler knows about the page being generated.
///
/// Built once per request and only ever borrowed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationContext {
    pub store_context: String,
    pub data_source_context: String,
    pub styling_reference: Option<String>,
}

impl GenerationContext {
    pub fn new(catalog: CatalogContext, styling_reference: Option<String>) -> Self {
        Self {
            store_context: catalog.store_context,
            data_source_context: catalog.data_source_context,
            styling_reference: styling_reference.filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn has_data_source_context(&self) -> bool {
        !self.data_source_context.trim().is_empty()
    }
}

/// Supplies store and catalog context for prompts
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Build context for `scope` and, when given, the selected catalog entity.
    /// Never fails; missing data becomes placeholder text.
    async fn build_context(&self, source: Option<&DataSource>, scope: StoreScope)
    -> CatalogContext;
}

/// Supplies the auxiliary design-system configuration of a store's theme
#[async_trait]
pub trait StyleProvider: Send + Sync {
    async fn auxiliary_style_config(&self, scope: StoreScope) -> Option<String>;
}
