//! Syntax highlighting module
//!
//! Highlighters are described in a small line-based definition language
//! (`.phl` files). This module provides:
//! - Parsing definitions into [`Spec`] values with per-line warnings
//! - Storages that list, load and save definitions
//! - The block-wise [`Highlighter`] with multi-line region tracking

mod builtin;
pub mod document;
mod highlighter;
pub mod loader;
mod preview;
mod rules;
mod spec;
pub mod storage;
mod style;

pub use document::{Block, Document, TextBuffer, DEFAULT_FONT_SIZE};
pub use highlighter::{BlockHighlight, Highlighter};
pub use loader::{load_meta, load_spec as parse_spec};
pub use preview::SpecEditor;
pub use rules::{BlockState, Expr, Rule};
pub use spec::{Meta, RawData, Spec, SpecLineNo, SpecResult, SpecWarnings};
pub use storage::{
    collect_metas, load_spec, load_spec_file, save_spec, BundledStorage, FileStorage, SpecStorage,
    SPEC_EXTENSION,
};
pub use style::{resolve_spans, Color, Format, FormatRange, Span};
