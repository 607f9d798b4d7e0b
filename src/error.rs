//! Error types for phl

use thiserror::Error;

/// Result type alias for phl operations
pub type Result<T> = std::result::Result<T, PhlError>;

/// Highlighter error types
///
/// Parse problems inside a spec are never errors, they are collected
/// as [`SpecWarnings`](crate::syntax::SpecWarnings) instead.
#[derive(Error, Debug)]
pub enum PhlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to access highlighter file \"{path}\": {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage is read-only: {0}")]
    ReadOnly(String),

    #[error("Highlighter not found: {0}")]
    SpecNotFound(String),

    #[error("Storage of highlighter \"{0}\" is no longer available")]
    StorageGone(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    Message(String),
}

impl PhlError {
    /// Attach the file path to an I/O error
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        PhlError::File {
            path: path.into(),
            source,
        }
    }
}
