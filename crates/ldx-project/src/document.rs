//! Project document persistence.
//!
//! A project document stores the whole live state in one XML file: every
//! layer with both serialized halves merged, the relation set, and the layer
//! tree. This is the working-copy format; exported definition pairs are
//! produced from it, not by copying it.

use std::path::Path;

use ldx_dom::{Element, read_document, write_document};
use tracing::warn;

use crate::error::{ProjectError, Result};
use crate::layer::{MAPLAYER_TAG, MapLayer};
use crate::project::Project;
use crate::relation::{RELATION_TAG, Relation};
use crate::tree::{LayerTree, TREE_TAG};

/// Root element of a project document.
pub const PROJECT_ROOT_TAG: &str = "ldx-project";
const VERSION_ATTR: &str = "version";
const FORMAT_VERSION: &str = "1";
const LAYERS_TAG: &str = "layers";
const RELATIONS_TAG: &str = "relations";

/// Writes a project document.
pub fn save_project(path: &Path, project: &Project) -> Result<()> {
    let mut root = Element::new(PROJECT_ROOT_TAG).with_attr(VERSION_ATTR, FORMAT_VERSION);

    let mut layers = Element::new(LAYERS_TAG);
    for layer in project.registry.iter() {
        let mut node = Element::new(MAPLAYER_TAG);
        layer.write_xml(&mut node);
        layers.push_child(node);
    }
    root.push_child(layers);

    let mut relations = Element::new(RELATIONS_TAG);
    for relation in project.relations.iter() {
        relations.push_child(relation.to_xml());
    }
    root.push_child(relations);

    root.push_child(project.tree.to_xml());

    write_document(path, &root)?;
    Ok(())
}

/// Reads a project document.
pub fn load_project(path: &Path) -> Result<Project> {
    let root = read_document(path)?;
    if root.tag() != PROJECT_ROOT_TAG {
        return Err(ProjectError::UnexpectedRoot {
            expected: PROJECT_ROOT_TAG,
            found: root.tag().to_string(),
        });
    }
    if root.attr(VERSION_ATTR) != Some(FORMAT_VERSION) {
        warn!(
            path = %path.display(),
            version = root.attr(VERSION_ATTR).unwrap_or("none"),
            "unknown project document version, reading anyway"
        );
    }

    let mut project = Project::new();
    if let Some(layers) = root.first_child(LAYERS_TAG) {
        for node in layers.children_named(MAPLAYER_TAG) {
            let mut layer = MapLayer::read_xml(node)?;
            layer.apply_style(node)?;
            project.registry.add(layer);
        }
    }
    if let Some(relations) = root.first_child(RELATIONS_TAG) {
        for node in relations.children_named(RELATION_TAG) {
            project.relations.add(Relation::from_xml(node)?);
        }
    }
    if let Some(tree) = root.first_child(TREE_TAG) {
        project.tree = LayerTree::from_xml(tree);
    }
    Ok(project)
}
