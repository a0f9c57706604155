//! Request, result and stage types of the generation workflow

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::core::{DataSource, ModelKind, StoreScope};
use crate::prompts::{DESIGN_SYSTEM_PROMPT, HTML_SYSTEM_PROMPT, IMPROVE_SYSTEM_PROMPT};

/// Existing content shorter than this (in characters) is regenerated from the
/// design plan instead of being improved
pub const RETRY_CONTENT_THRESHOLD: usize = 300;

/// What the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Design plan, then HTML
    #[default]
    Generate,
    /// Rework existing content, or retry rendering from a stored plan
    Improve,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Generate => "generate",
            ActionType::Improve => "improve",
        }
    }
}

impl Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generate" => Ok(ActionType::Generate),
            "improve" => Ok(ActionType::Improve),
            _ => Err(format!("Invalid action type specified: {s}")),
        }
    }
}

/// Input of one generate or improve call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub action: ActionType,
    pub custom_prompt: String,
    pub data_source: Option<DataSource>,
    pub scope: StoreScope,
    pub design_plan: Option<String>,
    pub current_content: Option<String>,
    pub reference_image_url: Option<String>,
    /// Page loads dynamic data through the storefront API
    pub interactive: bool,
}

impl GenerationRequest {
    pub fn generate(custom_prompt: impl Into<String>, scope: StoreScope) -> Self {
        Self {
            action: ActionType::Generate,
            custom_prompt: custom_prompt.into(),
            scope,
            ..Default::default()
        }
    }

    pub fn improve(custom_prompt: impl Into<String>, scope: StoreScope) -> Self {
        Self {
            action: ActionType::Improve,
            custom_prompt: custom_prompt.into(),
            scope,
            ..Default::default()
        }
    }

    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_source = Some(data_source);
        self
    }

    pub fn with_design_plan(mut self, design_plan: impl Into<String>) -> Self {
        self.design_plan = Some(design_plan.into());
        self
    }

    pub fn with_current_content(mut self, content: impl Into<String>) -> Self {
        self.current_content = Some(content.into());
        self
    }

    pub fn with_reference_image(mut self, url: impl Into<String>) -> Self {
        self.reference_image_url = Some(url.into());
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn has_custom_prompt(&self) -> bool {
        !self.custom_prompt.trim().is_empty()
    }
}

/// Final output. `html` carries a readable error message when a stage failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub design: Option<String>,
    pub html: String,
}

/// Which improve variant a request takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImproveRoute {
    /// Re-render from the stored design plan
    Retry,
    /// Rework the current HTML following the user's request
    Improve,
}

impl ImproveRoute {
    /// Retry only when a design plan exists and the current content is
    /// shorter than [`RETRY_CONTENT_THRESHOLD`] characters
    pub fn select(design_plan: Option<&str>, current_content: Option<&str>) -> Self {
        let has_plan = design_plan.is_some_and(|p| !p.trim().is_empty());
        let content_len = current_content.map_or(0, |c| c.chars().count());
        if has_plan && content_len < RETRY_CONTENT_THRESHOLD {
            ImproveRoute::Retry
        } else {
            ImproveRoute::Improve
        }
    }
}

/// One completion call of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Design,
    Render,
    Retry,
    Improve,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Design => "design",
            Stage::Render => "render",
            Stage::Retry => "retry",
            Stage::Improve => "improve",
        }
    }

    pub fn system_template(self) -> &'static str {
        match self {
            Stage::Design => DESIGN_SYSTEM_PROMPT,
            Stage::Render | Stage::Retry => HTML_SYSTEM_PROMPT,
            Stage::Improve => IMPROVE_SYSTEM_PROMPT,
        }
    }

    pub fn model_kind(self) -> ModelKind {
        match self {
            Stage::Design => ModelKind::Thinking,
            Stage::Render | Stage::Retry | Stage::Improve => ModelKind::Rendering,
        }
    }

    /// Prefix of the message reported when the stage fails
    pub fn error_prefix(self) -> &'static str {
        match self {
            Stage::Design => "Error generating design (Stage 1)",
            Stage::Render => "Error generating HTML (Stage 2)",
            Stage::Retry => "Error retrying HTML generation (Stage 2)",
            Stage::Improve => "Error improving HTML",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
