//! landgen - two-stage LLM landing page generation.
//!
//! A thinking model writes a technical design for the page, a rendering model
//! turns that design into HTML. Both stages run through a completion client
//! that lets the model call registered tools between turns.
#![deny(unsafe_code)]

pub mod core;
pub mod generation;
pub mod infrastructure;
pub mod llm;
pub mod prompts;
pub mod tools;
