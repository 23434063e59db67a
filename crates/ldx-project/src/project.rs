//! The live project aggregate.

use std::collections::BTreeMap;

use ldx_model::TreePath;
use tracing::warn;

use crate::error::{ProjectError, Result};
use crate::layer::MapLayer;
use crate::relation::RelationManager;
use crate::tree::{GroupNode, LayerTree};

/// The set of live layers, keyed by registry id.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: BTreeMap<String, MapLayer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a layer under its id, replacing any existing layer with the
    /// same id.
    pub fn add(&mut self, layer: MapLayer) {
        if self.layers.contains_key(&layer.id) {
            warn!(layer = %layer.id, "replacing layer already in registry");
        }
        self.layers.insert(layer.id.clone(), layer);
    }

    pub fn get(&self, id: &str) -> Option<&MapLayer> {
        self.layers.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MapLayer> {
        self.layers.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    /// Layers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &MapLayer> {
        self.layers.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// A reference to a layer, either held directly or looked up by id.
#[derive(Debug, Clone, Copy)]
pub enum LayerRef<'a> {
    Handle(&'a MapLayer),
    Id(&'a str),
}

impl<'a> LayerRef<'a> {
    /// Resolves the reference against a registry.
    pub fn resolve<'r>(self, registry: &'r LayerRegistry) -> Result<&'r MapLayer>
    where
        'a: 'r,
    {
        match self {
            Self::Handle(layer) => Ok(layer),
            Self::Id(id) => registry.get(id).ok_or_else(|| ProjectError::UnknownLayer {
                id: id.to_string(),
            }),
        }
    }
}

impl<'a> From<&'a MapLayer> for LayerRef<'a> {
    fn from(layer: &'a MapLayer) -> Self {
        Self::Handle(layer)
    }
}

impl<'a> From<&'a str> for LayerRef<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

/// Live project state: the layer registry, relations and the layer tree.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub registry: LayerRegistry,
    pub relations: RelationManager,
    pub tree: LayerTree,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a layer and places it at the tree root.
    pub fn add_layer(&mut self, layer: MapLayer) {
        self.add_layer_at(layer, &TreePath::root());
    }

    /// Registers a layer and places it under the given group path, creating
    /// missing groups along the way.
    pub fn add_layer_at(&mut self, layer: MapLayer, path: &TreePath) {
        let id = layer.id.clone();
        self.registry.add(layer);
        if self.tree.contains_layer(&id) {
            return;
        }
        let mut node: &mut GroupNode = self.tree.root_mut();
        for name in path.segments() {
            let index = match node.child_group_index(name) {
                Some(index) => index,
                None => {
                    node.push_group(name);
                    node.children().len() - 1
                }
            };
            node = node.group_at_mut(index);
        }
        node.push_layer(id);
    }
}

#[cfg(test)]
mod tests {
    use ldx_model::DataSource;

    use super::*;

    fn layer(id: &str) -> MapLayer {
        let source = DataSource::parse(&format!("table={id}")).unwrap();
        MapLayer::vector(id, id, source)
    }

    #[test]
    fn add_layer_places_at_root() {
        let mut project = Project::new();
        project.add_layer(layer("parcels"));
        assert!(project.registry.contains("parcels"));
        assert_eq!(project.tree.layer_path("parcels"), Some(TreePath::root()));
    }

    #[test]
    fn add_layer_at_creates_groups() {
        let mut project = Project::new();
        project.add_layer_at(layer("water_pipes"), &TreePath::new(["Utilities", "Water"]));
        project.add_layer_at(layer("water_valves"), &TreePath::new(["Utilities", "Water"]));

        let path = project.tree.layer_path("water_valves").unwrap();
        assert_eq!(path.segments(), ["Utilities", "Water"]);
        // Both layers share one group chain.
        let utilities = project.tree.root().child_group("Utilities").unwrap();
        assert_eq!(utilities.children().len(), 1);
    }

    #[test]
    fn layer_ref_resolves_by_id() {
        let mut project = Project::new();
        project.add_layer(layer("parcels"));

        let resolved = LayerRef::Id("parcels").resolve(&project.registry).unwrap();
        assert_eq!(resolved.id, "parcels");

        let err = LayerRef::Id("absent").resolve(&project.registry).unwrap_err();
        assert!(matches!(err, ProjectError::UnknownLayer { id } if id == "absent"));
    }

    #[test]
    fn registry_add_replaces_same_id() {
        let mut registry = LayerRegistry::new();
        registry.add(layer("parcels"));
        let mut renamed = layer("parcels");
        renamed.name = "Parcels (new)".to_string();
        registry.add(renamed);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("parcels").unwrap().name, "Parcels (new)");
    }
}
