//! Scoped settings and the ordered fallback resolver.
//!
//! Every lookup walks the same chain: the store's own section, then the
//! `[default]` section, then a hard-coded default where one exists. Empty
//! strings count as absent at every step. The resolver never fails; callers
//! that require a value decide whether its absence is fatal.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::core::{ApiKey, DataSourceKind, ModelKind, StoreScope};

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_THINKING_MODEL: &str = "deepseek/deepseek-r1:free";
pub const DEFAULT_RENDERING_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";
pub const DEFAULT_BASE_PROMPT: &str = "Generate content based on the provided context.";

/// Errors raised while loading a settings file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid api_base URL '{value}': {reason}")]
    InvalidApiBase { value: String, reason: String },
}

/// Keys understood by a [`ConfigSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiKey,
    ThinkingModel,
    RenderingModel,
    GenericBasePrompt,
    ProductBasePrompt,
    CategoryBasePrompt,
    GenericInteractivePrompt,
    ProductInteractivePrompt,
    CategoryInteractivePrompt,
    StyleConfigPath,
}

impl ConfigKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "api_key",
            ConfigKey::ThinkingModel => "thinking_model",
            ConfigKey::RenderingModel => "rendering_model",
            ConfigKey::GenericBasePrompt => "generic_base_prompt",
            ConfigKey::ProductBasePrompt => "product_base_prompt",
            ConfigKey::CategoryBasePrompt => "category_base_prompt",
            ConfigKey::GenericInteractivePrompt => "generic_interactive_prompt",
            ConfigKey::ProductInteractivePrompt => "product_interactive_prompt",
            ConfigKey::CategoryInteractivePrompt => "category_interactive_prompt",
            ConfigKey::StyleConfigPath => "style_config_path",
        }
    }

    /// Key holding the model id for a model kind
    pub fn for_model(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Thinking => ConfigKey::ThinkingModel,
            ModelKind::Rendering => ConfigKey::RenderingModel,
        }
    }

    /// Key holding the content goal for a data-source kind
    pub fn for_base_prompt(kind: Option<DataSourceKind>, interactive: bool) -> Self {
        match (kind, interactive) {
            (Some(DataSourceKind::Product), false) => ConfigKey::ProductBasePrompt,
            (Some(DataSourceKind::Product), true) => ConfigKey::ProductInteractivePrompt,
            (Some(DataSourceKind::Category), false) => ConfigKey::CategoryBasePrompt,
            (Some(DataSourceKind::Category), true) => ConfigKey::CategoryInteractivePrompt,
            (None, false) => ConfigKey::GenericBasePrompt,
            (None, true) => ConfigKey::GenericInteractivePrompt,
        }
    }
}

/// Read-only lookup of scoped configuration values
pub trait ConfigSource: Send + Sync {
    /// Value for `key` as seen from `scope`, already falling back to the global
    /// section. Implementations return `None` for empty values.
    fn value(&self, key: ConfigKey, scope: StoreScope) -> Option<String>;
}

/// One `[default]` or `[stores.<id>]` section
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScopeSettings {
    pub api_key: Option<String>,
    pub thinking_model: Option<String>,
    pub rendering_model: Option<String>,
    pub generic_base_prompt: Option<String>,
    pub product_base_prompt: Option<String>,
    pub category_base_prompt: Option<String>,
    pub generic_interactive_prompt: Option<String>,
    pub product_interactive_prompt: Option<String>,
    pub category_interactive_prompt: Option<String>,
    pub style_config_path: Option<String>,
}

impl fmt::Debug for ScopeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("thinking_model", &self.thinking_model)
            .field("rendering_model", &self.rendering_model)
            .field("generic_base_prompt", &self.generic_base_prompt)
            .field("product_base_prompt", &self.product_base_prompt)
            .field("category_base_prompt", &self.category_base_prompt)
            .field("generic_interactive_prompt", &self.generic_interactive_prompt)
            .field("product_interactive_prompt", &self.product_interactive_prompt)
            .field("category_interactive_prompt", &self.category_interactive_prompt)
            .field("style_config_path", &self.style_config_path)
            .finish()
    }
}

impl ScopeSettings {
    fn get(&self, key: ConfigKey) -> Option<&str> {
        let value = match key {
            ConfigKey::ApiKey => &self.api_key,
            ConfigKey::ThinkingModel => &self.thinking_model,
            ConfigKey::RenderingModel => &self.rendering_model,
            ConfigKey::GenericBasePrompt => &self.generic_base_prompt,
            ConfigKey::ProductBasePrompt => &self.product_base_prompt,
            ConfigKey::CategoryBasePrompt => &self.category_base_prompt,
            ConfigKey::GenericInteractivePrompt => &self.generic_interactive_prompt,
            ConfigKey::ProductInteractivePrompt => &self.product_interactive_prompt,
            ConfigKey::CategoryInteractivePrompt => &self.category_interactive_prompt,
            ConfigKey::StyleConfigPath => &self.style_config_path,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Tool identifiers offered to the model per stage
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub design: Vec<String>,
    pub render: Vec<String>,
}

/// Settings file contents (TOML)
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub default: ScopeSettings,
    #[serde(default)]
    pub stores: HashMap<String, ScopeSettings>,
    #[serde(default)]
    pub tools: ToolSettings,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            default: ScopeSettings::default(),
            stores: HashMap::new(),
            tools: ToolSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), stores = settings.stores.len(), "Loaded settings");
        Ok(settings)
    }

    /// Parse settings from TOML text and validate the API base URL
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_base).map_err(|e| ConfigError::InvalidApiBase {
            value: self.api_base.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidApiBase {
                value: self.api_base.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(())
    }

    /// API base with any trailing slash removed
    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    /// Use `key` as the global API key when the file does not configure one
    pub fn with_api_key_fallback(mut self, key: Option<String>) -> Self {
        if self.default.get(ConfigKey::ApiKey).is_none() {
            if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
                self.default.api_key = Some(key);
            }
        }
        self
    }
}

impl ConfigSource for Settings {
    fn value(&self, key: ConfigKey, scope: StoreScope) -> Option<String> {
        self.stores
            .get(&scope.to_string())
            .and_then(|section| section.get(key))
            .or_else(|| self.default.get(key))
            .map(str::to_string)
    }
}

/// Resolves API keys, model ids and prompt settings for a scope
#[derive(Clone)]
pub struct ConfigResolver {
    source: Arc<dyn ConfigSource>,
}

impl ConfigResolver {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self { source }
    }

    /// API key for the scope, if one is configured
    pub fn resolve_api_key(&self, scope: StoreScope) -> Option<ApiKey> {
        self.source
            .value(ConfigKey::ApiKey, scope)
            .and_then(ApiKey::new)
    }

    /// Model id for `kind`, falling back to the built-in default
    pub fn resolve_model(&self, kind: ModelKind, scope: StoreScope) -> String {
        self.source
            .value(ConfigKey::for_model(kind), scope)
            .unwrap_or_else(|| default_model(kind).to_string())
    }

    /// Content goal for a data-source kind. `interactive` selects the variant
    /// written for pages that load data through the storefront API.
    pub fn resolve_base_prompt(
        &self,
        kind: Option<DataSourceKind>,
        interactive: bool,
        scope: StoreScope,
    ) -> String {
        let key = ConfigKey::for_base_prompt(kind, interactive);
        match self.source.value(key, scope) {
            Some(prompt) => prompt,
            None => {
                tracing::error!(
                    store = %scope,
                    key = key.as_str(),
                    "Missing base prompt configuration, using default"
                );
                DEFAULT_BASE_PROMPT.to_string()
            }
        }
    }

    /// Path of the auxiliary style configuration for the scope
    pub fn style_config_path(&self, scope: StoreScope) -> Option<PathBuf> {
        self.source
            .value(ConfigKey::StyleConfigPath, scope)
            .map(PathBuf::from)
    }
}

/// Built-in model id for a kind
pub fn default_model(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Thinking => DEFAULT_THINKING_MODEL,
        ModelKind::Rendering => DEFAULT_RENDERING_MODEL,
    }
}
