//! Generation domain module - orchestrates the design and render workflow
//!
//! A `generate` request runs a design stage on the thinking model and feeds
//! the resulting plan to a render stage on the rendering model. `improve`
//! requests either re-render from a stored plan or rework existing HTML.

pub mod errors;
pub mod orchestrator;
pub mod sanitizers;
pub mod types;

pub use errors::*;
pub use orchestrator::*;
pub use types::*;
