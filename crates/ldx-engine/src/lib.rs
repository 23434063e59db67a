//! Layer definition export and import.
//!
//! This crate moves layers between a live project and portable definition
//! document pairs on disk:
//!
//! - **export**: writes a layer and its dependency closure as `.meta` and
//!   `.style` document pairs named by portable identity
//! - **import**: loads document pairs back into a project, dependencies
//!   first, restoring relations once every endpoint is present
//! - **identity**: derives the portable identity of a layer from its
//!   datasource table
//! - **treepath**: encodes and decodes layer tree placement inside metadata
//!   documents
//! - **processor**: post-load hooks run on imported layers
//! - **translate**: alias and layer name translation backed by a Qt
//!   Linguist file

pub mod error;
pub mod export;
pub mod identity;
pub mod import;
pub mod processor;
pub mod tracker;
pub mod translate;
pub mod treepath;

pub use error::{EngineError, Result};
pub use export::{LayerExporter, METADATA_EXTENSION, STYLING_EXTENSION};
pub use identity::layer_identity;
pub use import::LayerImporter;
pub use processor::ImportProcessor;
pub use tracker::DependencyTracker;
pub use translate::{AliasTranslator, TranslationStore};
pub use treepath::{decode_tree_path, encode_tree_path};
