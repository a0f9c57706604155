//! Tools the model may call during a completion, and the registry that owns them

pub mod catalog_lookup;
pub mod errors;
pub mod registry;

pub use catalog_lookup::{CATALOG_LOOKUP_TOOL, CatalogLookupTool};
pub use errors::ToolError;
pub use registry::{Tool, ToolDefinition, ToolRegistry, ToolRegistryBuilder};
