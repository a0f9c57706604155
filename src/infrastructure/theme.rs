//! Theme style configuration read from the filesystem

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::{ConfigResolver, StoreScope, StyleProvider};

/// Reads the file named by `style_config_path` for the scope.
///
/// Relative paths are resolved against `base_dir` when one is set.
pub struct FileStyleProvider {
    config: ConfigResolver,
    base_dir: Option<PathBuf>,
}

impl FileStyleProvider {
    pub fn new(config: ConfigResolver) -> Self {
        Self {
            config,
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn resolve(&self, path: PathBuf) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl StyleProvider for FileStyleProvider {
    async fn auxiliary_style_config(&self, scope: StoreScope) -> Option<String> {
        let Some(path) = self.config.style_config_path(scope) else {
            tracing::debug!(store = %scope, "No style config path configured");
            return None;
        };
        let path = self.resolve(path);
        read_style_config(&path, scope).await
    }
}

async fn read_style_config(path: &Path, scope: StoreScope) -> Option<String> {
    match fs::read_to_string(path).await {
        Ok(content) if !content.trim().is_empty() => {
            tracing::debug!(store = %scope, path = %path.display(), "Loaded style config");
            Some(content)
        }
        Ok(_) => {
            tracing::warn!(store = %scope, path = %path.display(), "Style config file is empty");
            None
        }
        Err(e) => {
            tracing::warn!(
                store = %scope,
                path = %path.display(),
                error = %e,
                "Could not read style config"
            );
            None
        }
    }
}
