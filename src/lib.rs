//! phl - declarative regex-based syntax highlighting
//!
//! Highlighters are written as `.phl` definitions, parsed into a
//! [`Spec`](syntax::Spec) and applied block by block to a text buffer,
//! with regions such as block comments tracked across lines.

pub mod config;
pub mod error;
pub mod render;
pub mod syntax;
