//! Error types for project state and its serialized forms.

use ldx_dom::DomError;
use ldx_model::ModelError;
use thiserror::Error;

/// Errors produced while reading or mutating project state.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("missing element <{tag}> in {context}")]
    MissingElement {
        tag: &'static str,
        context: &'static str,
    },

    #[error("missing attribute '{attr}' on <{tag}>")]
    MissingAttribute {
        tag: &'static str,
        attr: &'static str,
    },

    #[error("unexpected root element <{found}> (expected <{expected}>)")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    #[error("unknown layer '{id}'")]
    UnknownLayer { id: String },

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("{0}")]
    Dom(#[from] DomError),
}

/// Convenience alias for project results.
pub type Result<T> = std::result::Result<T, ProjectError>;
