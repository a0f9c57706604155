//! Template stores for static prompt bodies

use async_trait::async_trait;
use rust_embed::RustEmbed;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::prompts::PromptError;

pub const DESIGN_SYSTEM_PROMPT: &str = "design_system_prompt.txt";
pub const HTML_SYSTEM_PROMPT: &str = "html_system_prompt.txt";
pub const IMPROVE_SYSTEM_PROMPT: &str = "improve_system_prompt.txt";

/// Reads static prompt bodies by logical name
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Trimmed template body. Missing, unreadable and empty templates are all
    /// [`PromptError::TemplateUnavailable`].
    async fn read_template(&self, name: &str) -> Result<String, PromptError>;
}

/// Prompt bodies compiled into the binary
#[derive(RustEmbed)]
#[folder = "prompts/"]
struct EmbeddedPrompts;

/// [`TemplateStore`] serving the prompts shipped with the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplateStore;

impl EmbeddedTemplateStore {
    pub fn new() -> Self {
        Self
    }

    /// Names of all embedded templates, sorted
    pub fn names() -> Vec<String> {
        let mut names: Vec<String> = EmbeddedPrompts::iter().map(|n| n.to_string()).collect();
        names.sort();
        names
    }
}

#[async_trait]
impl TemplateStore for EmbeddedTemplateStore {
    async fn read_template(&self, name: &str) -> Result<String, PromptError> {
        let file = EmbeddedPrompts::get(name)
            .ok_or_else(|| PromptError::unavailable(name, "no embedded template with this name"))?;
        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| PromptError::unavailable(name, e.to_string()))?;
        non_empty(name, content)
    }
}

/// [`TemplateStore`] reading `<root>/<name>` from disk
#[derive(Debug, Clone)]
pub struct FileSystemTemplateStore {
    root: PathBuf,
}

impl FileSystemTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl TemplateStore for FileSystemTemplateStore {
    async fn read_template(&self, name: &str) -> Result<String, PromptError> {
        let relative = Path::new(name);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(PromptError::unavailable(
                name,
                "template names must be relative paths inside the prompts directory",
            ));
        }

        let path = self.root.join(relative);
        let content = fs::read_to_string(&path).await.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Prompt file not found or not readable");
            PromptError::unavailable(name, format!("{}: {e}", path.display()))
        })?;
        non_empty(name, &content)
    }
}

/// Tries `primary` first and falls back to `fallback`
pub struct LayeredTemplateStore {
    primary: Arc<dyn TemplateStore>,
    fallback: Arc<dyn TemplateStore>,
}

impl LayeredTemplateStore {
    pub fn new(primary: Arc<dyn TemplateStore>, fallback: Arc<dyn TemplateStore>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl TemplateStore for LayeredTemplateStore {
    async fn read_template(&self, name: &str) -> Result<String, PromptError> {
        match self.primary.read_template(name).await {
            Ok(content) => Ok(content),
            Err(e) => {
                tracing::debug!(template = %name, error = %e, "Falling back to next template store");
                self.fallback.read_template(name).await
            }
        }
    }
}

fn non_empty(name: &str, content: &str) -> Result<String, PromptError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(PromptError::unavailable(name, "template is empty"));
    }
    Ok(content.to_string())
}
