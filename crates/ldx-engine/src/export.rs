//! Export of layer definition pairs.

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use ldx_dom::{Element, write_document};
use ldx_model::LayerId;
use ldx_project::layer::{
    EDITTYPE_TAG, EDITTYPES_TAG, FIELD_NAME_ATTR, ID_TAG, MAPLAYER_TAG, WIDGET_CONFIG_TAG,
    WIDGET_LAYER_ATTR,
};
use ldx_project::{LayerRef, MapLayer, Project};

use crate::error::{EngineError, Result};
use crate::identity::layer_identity;
use crate::tracker::DependencyTracker;
use crate::treepath::encode_tree_path;

/// File extension of the metadata document of a definition pair.
pub const METADATA_EXTENSION: &str = "meta";
/// File extension of the styling document of a definition pair.
pub const STYLING_EXTENSION: &str = "style";

/// Attribute stamping the export time onto a metadata document.
pub const EXPORTED_ATTR: &str = "exported";
/// Element collecting the identities a definition depends on.
pub const DEPENDENCIES_TAG: &str = "dependencies";
/// One dependency entry.
pub const DEPENDENCY_TAG: &str = "dependency";
/// Element collecting the relations a definition takes part in.
pub const RELATIONS_TAG: &str = "relations";

/// Elements that belong exclusively to the styling document. The exporter
/// strips them out of the metadata document after the merged serialization.
pub const STYLE_ONLY_ELEMENTS: [&str; 11] = [
    "edittypes",
    "editform",
    "attributeEditorForm",
    "editforminit",
    "featformsuppress",
    "annotationform",
    "editorlayout",
    "excludeAttributesWMS",
    "excludeAttributesWFS",
    "attributeactions",
    "aliases",
];

/// Serializes layers (and, transitively, everything they depend on) into
/// `<identity>.meta` / `<identity>.style` document pairs under a base
/// directory.
///
/// One exporter instance covers one batch: identities already written by the
/// batch are skipped on re-entry, which both deduplicates shared dependencies
/// and terminates relation cycles.
pub struct LayerExporter<'a> {
    project: &'a Project,
    base_path: PathBuf,
    visited: DependencyTracker,
}

impl<'a> LayerExporter<'a> {
    pub fn new(project: &'a Project, base_path: impl Into<PathBuf>) -> Self {
        Self {
            project,
            base_path: base_path.into(),
            visited: DependencyTracker::new(),
        }
    }

    /// Identities this batch has written so far.
    pub fn exported(&self) -> impl Iterator<Item = &LayerId> {
        self.visited.iter()
    }

    /// Exports one layer and its dependency closure.
    ///
    /// Returns the portable identity of the layer. When the identity was
    /// already written by this batch the call is a no-op.
    pub fn export_layer(&mut self, layer: LayerRef<'_>) -> Result<LayerId> {
        let project = self.project;
        let layer = match layer {
            LayerRef::Handle(handle) => handle,
            LayerRef::Id(id) => {
                project
                    .registry
                    .get(id)
                    .ok_or_else(|| EngineError::UnknownLayer { id: id.to_string() })?
            }
        };
        let identity = layer_identity(layer)?;

        if self.visited.is_visited(&identity) {
            debug!(layer = %identity, "definition already written by this batch");
            return Ok(identity);
        }
        self.visited.mark_visited(identity.clone());
        info!(layer = %identity, name = %layer.name, "exporting layer definition");

        let mut root = Element::new(MAPLAYER_TAG);
        layer.write_xml(&mut root);
        root.set_attr(
            EXPORTED_ATTR,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        // The live registry id must not leak into the portable document.
        root.set_child_text(ID_TAG, identity.as_str());

        let mut dependencies = Element::new(DEPENDENCIES_TAG);
        let mut relations = Element::new(RELATIONS_TAG);

        for relation in project.relations.referencing(&layer.id) {
            let referenced = self.write_dependency(&mut dependencies, &relation.referenced_layer)?;
            let mut portable = relation.clone();
            portable.referencing_layer = identity.to_string();
            portable.referenced_layer = referenced.to_string();
            relations.push_child(portable.to_xml());
        }
        for relation in project.relations.referenced(&layer.id) {
            let referencing =
                self.write_dependency(&mut dependencies, &relation.referencing_layer)?;
            let mut portable = relation.clone();
            portable.referencing_layer = referencing.to_string();
            portable.referenced_layer = identity.to_string();
            relations.push_child(portable.to_xml());
        }
        root.push_child(relations);

        match project.tree.layer_path(&layer.id) {
            Some(path) => encode_tree_path(&path, &mut root),
            None => debug!(layer = %identity, "layer has no tree entry, exporting at tree root"),
        }

        // The styling document is built in memory first so ValueRelation
        // targets can be repointed at portable identities before anything is
        // persisted.
        let mut style_root = layer.write_style_document();
        self.rewrite_value_relations(layer, &identity, &mut style_root, &mut dependencies)?;

        root.push_child(dependencies);
        for tag in STYLE_ONLY_ELEMENTS {
            root.remove_child(tag);
        }

        let meta_path = self.document_path(&identity, METADATA_EXTENSION);
        write_document(&meta_path, &root).map_err(|source| EngineError::DocumentWrite {
            path: meta_path.clone(),
            source,
        })?;
        let style_path = self.document_path(&identity, STYLING_EXTENSION);
        write_document(&style_path, &style_root).map_err(|source| EngineError::DocumentWrite {
            path: style_path.clone(),
            source,
        })?;
        debug!(meta = %meta_path.display(), style = %style_path.display(), "wrote definition pair");

        Ok(identity)
    }

    /// Exports a dependency target and records its identity in the
    /// `dependencies` element. A target reached through several relations or
    /// widgets is recorded once.
    fn write_dependency(&mut self, dependencies: &mut Element, target: &str) -> Result<LayerId> {
        let identity = self.export_layer(LayerRef::Id(target))?;
        let recorded = dependencies
            .children_named(DEPENDENCY_TAG)
            .any(|node| node.text() == identity.as_str());
        if !recorded {
            dependencies.push_child(Element::new(DEPENDENCY_TAG).with_text(identity.as_str()));
        }
        Ok(identity)
    }

    /// Repoints `ValueRelation` widget configs in the styling document from
    /// live registry ids to portable identities, exporting the referenced
    /// layers along the way.
    fn rewrite_value_relations(
        &mut self,
        layer: &MapLayer,
        identity: &LayerId,
        style_root: &mut Element,
        dependencies: &mut Element,
    ) -> Result<()> {
        for field in layer.value_relation_fields() {
            let Some(target) = field.layer_reference() else {
                warn!(
                    layer = %identity,
                    field = %field.name,
                    "value relation widget without a layer entry, leaving config untouched"
                );
                continue;
            };
            let referenced = self.write_dependency(dependencies, target)?;
            repoint_widget_config(style_root, &field.name, referenced.as_str());
        }
        Ok(())
    }

    fn document_path(&self, identity: &LayerId, extension: &str) -> PathBuf {
        self.base_path.join(format!("{identity}.{extension}"))
    }
}

fn repoint_widget_config(style_root: &mut Element, field: &str, target: &str) {
    let Some(edittypes) = style_root.first_child_mut(EDITTYPES_TAG) else {
        return;
    };
    for edittype in edittypes.children_mut() {
        if edittype.tag() != EDITTYPE_TAG || edittype.attr(FIELD_NAME_ATTR) != Some(field) {
            continue;
        }
        if let Some(config) = edittype.first_child_mut(WIDGET_CONFIG_TAG) {
            config.set_attr(WIDGET_LAYER_ATTR, target);
        }
    }
}
