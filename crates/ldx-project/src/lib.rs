//! Live project state: layers, relations and the layer tree.
//!
//! This crate models the working state an exchange operates on. Layers live
//! in a [`LayerRegistry`] keyed by id, relations in a [`RelationManager`],
//! and tree placement in a [`LayerTree`]. The whole aggregate round-trips
//! through a single project document via [`save_project`] and
//! [`load_project`].

pub mod document;
pub mod error;
pub mod layer;
pub mod project;
pub mod relation;
pub mod tree;

pub use document::{load_project, save_project};
pub use error::{ProjectError, Result};
pub use layer::{FormSettings, MapLayer};
pub use project::{LayerRef, LayerRegistry, Project};
pub use relation::{FieldPair, Relation, RelationManager};
pub use tree::{GroupNode, LayerTree, TreeNode};
