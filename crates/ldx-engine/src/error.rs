//! Error types for the exchange engine.

use std::path::PathBuf;

use ldx_dom::DomError;
use ldx_model::{LayerId, LayerKind, ModelError};
use ldx_project::ProjectError;
use thiserror::Error;

/// Errors produced while exporting or importing layer definitions.
#[derive(Debug, Error)]
pub enum EngineError {
    // === Identity and registry ===
    #[error("layer '{id}' is not registered in the project")]
    UnknownLayer { id: String },

    #[error("cannot derive a portable identity for layer '{layer}': {source}")]
    Identity {
        layer: String,
        #[source]
        source: ModelError,
    },

    // === Documents ===
    #[error("failed to read layer document {path}: {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: DomError,
    },

    #[error("failed to write layer document {path}: {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: DomError,
    },

    // === Import ===
    #[error("cannot handle layer '{identity}' of type '{kind}' (expected 'vector' or 'raster')")]
    UnsupportedLayerKind { identity: LayerId, kind: String },

    #[error("layer '{identity}' ({kind}) could not be constructed from its definition: {source}")]
    NativeLoad {
        identity: LayerId,
        kind: LayerKind,
        #[source]
        source: ProjectError,
    },

    #[error("invalid dependency entry '{text}': {source}")]
    InvalidDependency {
        text: String,
        #[source]
        source: ModelError,
    },

    #[error("invalid datasource for layer '{identity}': {source}")]
    InvalidDatasource {
        identity: LayerId,
        #[source]
        source: ModelError,
    },

    #[error("invalid relation fragment: {source}")]
    Relation {
        #[source]
        source: ProjectError,
    },

    #[error("failed to apply styling for layer '{identity}': {source}")]
    StyleApply {
        identity: LayerId,
        #[source]
        source: ProjectError,
    },

    // === Hooks and translation ===
    #[error("import processor failed for layer '{identity}': {source}")]
    Processor {
        identity: LayerId,
        source: anyhow::Error,
    },

    #[error("failed to read translation store {path}: {source}")]
    TranslationRead {
        path: PathBuf,
        #[source]
        source: DomError,
    },

    #[error("failed to write translation store {path}: {source}")]
    TranslationWrite {
        path: PathBuf,
        #[source]
        source: DomError,
    },
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
