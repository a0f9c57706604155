//! Prompt templates and stage message assembly

pub mod assembler;
pub mod errors;
pub mod fragments;
pub mod store;

pub use assembler::{PromptAssembler, attach_reference_image, maybe_add_capability_instruction};
pub use errors::PromptError;
pub use store::{
    DESIGN_SYSTEM_PROMPT, EmbeddedTemplateStore, FileSystemTemplateStore, HTML_SYSTEM_PROMPT,
    IMPROVE_SYSTEM_PROMPT, LayeredTemplateStore, TemplateStore,
};
