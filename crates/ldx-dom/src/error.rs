//! Error types for document parsing and serialization.

use std::io;
use std::path::PathBuf;

use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors produced while reading or writing XML documents.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML attribute: {0}")]
    Attr(#[from] AttrError),

    #[error("invalid character escape: {0}")]
    Escape(#[from] EscapeError),

    #[error("unknown entity reference '&{name};'")]
    UnknownEntity { name: String },

    #[error("document contains no root element")]
    NoRootElement,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("unexpected end of document inside <{tag}>")]
    UnexpectedEof { tag: String },

    #[error("closing tag without a matching open tag")]
    UnmatchedClose,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Convenience alias for document results.
pub type Result<T> = std::result::Result<T, DomError>;
