//! Owned XML element trees for layer definition documents.
//!
//! This crate wraps `quick-xml`'s event API in a small owned tree type so the
//! rest of the workspace can build, rewrite and query documents without
//! touching event streams. Reading unescapes text and attribute values;
//! writing escapes them again and renders with two-space indentation.

pub mod element;
pub mod error;
pub mod reader;
pub mod writer;

pub use element::Element;
pub use error::{DomError, Result};
pub use reader::{parse_document, read_document};
pub use writer::{render_document, write_document};
