//! Core types shared by every layer of landgen.
//!
//! Scopes, model kinds and data-source identifiers live here together with the
//! configuration resolver and the context ports, so the prompt, tool and
//! completion layers can depend on them without depending on each other.

pub mod config;
pub mod context;
pub mod secret;
pub mod types;

pub use config::{ConfigError, ConfigKey, ConfigResolver, ConfigSource, Settings};
pub use context::{CatalogContext, ContextProvider, GenerationContext, StyleProvider};
pub use secret::ApiKey;
pub use types::{DataSource, DataSourceKind, ModelKind, StoreScope};
