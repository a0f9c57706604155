//! Infrastructure layer - file-backed implementations of the context ports

pub mod catalog;
pub mod theme;

pub use catalog::*;
pub use theme::*;
