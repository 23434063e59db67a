//! Error types for the model crate.

use thiserror::Error;

/// Errors produced while validating or parsing model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("layer identity is empty")]
    EmptyLayerId,

    #[error("layer identity '{value}' contains unsupported character '{ch}'")]
    InvalidLayerId { value: String, ch: char },

    #[error("unknown layer kind '{0}' (expected 'vector' or 'raster')")]
    UnknownLayerKind(String),

    #[error("unterminated quote in datasource descriptor: {descriptor}")]
    UnterminatedQuote { descriptor: String },

    #[error("datasource descriptor has no table entry")]
    MissingTable,
}

/// Convenience alias for model results.
pub type Result<T> = std::result::Result<T, ModelError>;
