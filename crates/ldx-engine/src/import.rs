//! Import of layer definition pairs.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, info};

use ldx_dom::{Element, read_document};
use ldx_model::{DataSource, LayerId, LayerKind};
use ldx_project::layer::{DATASOURCE_TAG, TYPE_ATTR};
use ldx_project::relation::RELATION_TAG;
use ldx_project::tree::GROUP_TAG;
use ldx_project::{MapLayer, Project, Relation};

use crate::error::{EngineError, Result};
use crate::export::{
    DEPENDENCIES_TAG, DEPENDENCY_TAG, METADATA_EXTENSION, RELATIONS_TAG, STYLING_EXTENSION,
};
use crate::processor::ImportProcessor;
use crate::treepath::decode_tree_path;

/// Loads definition pairs from a base directory into a project.
///
/// Dependencies are loaded depth-first before their dependents, so a
/// referenced layer is always registered by the time something points at it.
/// Relations are the one exception: their fragments are queued while the
/// dependency subtree loads and registered in one sweep at the end of each
/// top-level [`LayerImporter::load_layer`] call.
pub struct LayerImporter<'a> {
    project: &'a mut Project,
    base_path: PathBuf,
    target_service: Option<String>,
    loaded: BTreeSet<LayerId>,
    pending_relations: Vec<Element>,
    processors: Vec<Box<dyn ImportProcessor>>,
}

impl<'a> LayerImporter<'a> {
    pub fn new(project: &'a mut Project, base_path: impl Into<PathBuf>) -> Self {
        Self {
            project,
            base_path: base_path.into(),
            target_service: None,
            loaded: BTreeSet::new(),
            pending_relations: Vec::new(),
            processors: Vec::new(),
        }
    }

    /// Rewrites every imported datasource to connect through `service`.
    pub fn with_target_service(mut self, service: impl Into<String>) -> Self {
        self.target_service = Some(service.into());
        self
    }

    /// Registers a post-load processor. Processors run in registration order.
    pub fn add_processor(&mut self, processor: Box<dyn ImportProcessor>) {
        self.processors.push(processor);
    }

    /// Number of relation fragments waiting for the current top-level load.
    pub fn pending_relations(&self) -> usize {
        self.pending_relations.len()
    }

    /// Loads a layer definition, its dependency closure and its relations.
    ///
    /// # Panics
    ///
    /// Panics if the pending-relations queue is not empty, which means an
    /// earlier call on this importer failed midway; an importer in that state
    /// must be discarded.
    pub fn load_layer(&mut self, identity: &LayerId) -> Result<()> {
        assert!(
            self.pending_relations.is_empty(),
            "pending-relations queue must be empty before a top-level load"
        );
        self.load_layer_definition(identity)?;

        for fragment in std::mem::take(&mut self.pending_relations) {
            let relation = Relation::from_xml(&fragment)
                .map_err(|source| EngineError::Relation { source })?;
            debug!(relation = %relation.id, "registering deferred relation");
            self.project.relations.add(relation);
        }

        let layer = self
            .project
            .registry
            .get(identity.as_str())
            .ok_or_else(|| EngineError::UnknownLayer {
                id: identity.to_string(),
            })?;
        for processor in &mut self.processors {
            processor
                .post_load_layer(layer)
                .map_err(|source| EngineError::Processor {
                    identity: identity.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Loads one definition pair (and, recursively, its dependencies) without
    /// touching the relation queue or running top-level hooks.
    ///
    /// Identities already present in the registry, or already loaded by this
    /// importer, are skipped.
    pub fn load_layer_definition(&mut self, identity: &LayerId) -> Result<()> {
        if self.project.registry.contains(identity.as_str()) || self.loaded.contains(identity) {
            debug!(layer = %identity, "layer already present, skipping");
            return Ok(());
        }
        self.loaded.insert(identity.clone());
        info!(layer = %identity, "loading layer definition");

        let meta_path = self.document_path(identity, METADATA_EXTENSION);
        let mut root = read_document(&meta_path).map_err(|source| EngineError::DocumentRead {
            path: meta_path,
            source,
        })?;

        self.rewrite_datasource(identity, &mut root)?;

        // Dependencies first: whatever this layer points at must be in the
        // registry before the layer itself is constructed.
        for dependency in dependency_ids(&root)? {
            debug!(layer = %identity, dependency = %dependency, "loading dependency");
            self.load_layer_definition(&dependency)?;
        }

        let kind = layer_kind(identity, &root)?;
        let layer = MapLayer::read_xml(&root).map_err(|source| EngineError::NativeLoad {
            identity: identity.clone(),
            kind,
            source,
        })?;
        // Registered under its portable identity, which is what serialized
        // relation endpoints and widget configs point at.
        self.project.registry.add(layer);

        let group = decode_tree_path(root.first_child(GROUP_TAG), self.project.tree.root_mut());
        group.push_layer(identity.as_str());

        if let Some(relations) = root.first_child(RELATIONS_TAG) {
            for fragment in relations.children_named(RELATION_TAG) {
                self.pending_relations.push(fragment.clone());
            }
        }

        let style_path = self.document_path(identity, STYLING_EXTENSION);
        let style_root =
            read_document(&style_path).map_err(|source| EngineError::DocumentRead {
                path: style_path,
                source,
            })?;
        let layer = self
            .project
            .registry
            .get_mut(identity.as_str())
            .ok_or_else(|| EngineError::UnknownLayer {
                id: identity.to_string(),
            })?;
        layer
            .apply_style(&style_root)
            .map_err(|source| EngineError::StyleApply {
                identity: identity.clone(),
                source,
            })?;

        for processor in &mut self.processors {
            processor
                .post_load_definition(layer)
                .map_err(|source| EngineError::Processor {
                    identity: identity.clone(),
                    source,
                })?;
        }

        debug!(layer = %identity, "layer definition loaded");
        Ok(())
    }

    /// Rewrites the serialized datasource to the configured target service
    /// before the layer is constructed. Descriptors without a service entry
    /// are left unchanged.
    fn rewrite_datasource(&self, identity: &LayerId, root: &mut Element) -> Result<()> {
        let Some(service) = self.target_service.as_deref() else {
            return Ok(());
        };
        let Some(node) = root.first_child_mut(DATASOURCE_TAG) else {
            return Ok(());
        };
        let mut source =
            DataSource::parse(node.text()).map_err(|source| EngineError::InvalidDatasource {
                identity: identity.clone(),
                source,
            })?;
        if source.replace_service(service) {
            node.set_text(source.to_string());
        } else {
            debug!(layer = %identity, "datasource has no service entry, left unchanged");
        }
        Ok(())
    }

    fn document_path(&self, identity: &LayerId, extension: &str) -> PathBuf {
        self.base_path.join(format!("{identity}.{extension}"))
    }
}

/// Collects the dependency identities declared by a metadata document.
fn dependency_ids(root: &Element) -> Result<Vec<LayerId>> {
    let Some(dependencies) = root.first_child(DEPENDENCIES_TAG) else {
        return Ok(Vec::new());
    };
    dependencies
        .children_named(DEPENDENCY_TAG)
        .map(|node| {
            LayerId::new(node.text()).map_err(|source| EngineError::InvalidDependency {
                text: node.text().to_string(),
                source,
            })
        })
        .collect()
}

/// Reads and validates the layer kind attribute of a metadata document.
fn layer_kind(identity: &LayerId, root: &Element) -> Result<LayerKind> {
    let kind = root.attr(TYPE_ATTR).unwrap_or_default();
    kind.parse()
        .map_err(|_| EngineError::UnsupportedLayerKind {
            identity: identity.clone(),
            kind: kind.to_string(),
        })
}
