//! Relations between vector layers.

use ldx_dom::Element;
use tracing::warn;

use crate::error::{ProjectError, Result};

/// Element name of a serialized relation.
pub const RELATION_TAG: &str = "relation";
const FIELD_REF_TAG: &str = "fieldRef";
const ID_ATTR: &str = "id";
const NAME_ATTR: &str = "name";
const REFERENCING_ATTR: &str = "referencingLayer";
const REFERENCED_ATTR: &str = "referencedLayer";
const REFERENCING_FIELD_ATTR: &str = "referencingField";
const REFERENCED_FIELD_ATTR: &str = "referencedField";

/// A pair of joined columns between the two sides of a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    /// Column on the referencing (child) layer.
    pub referencing_field: String,
    /// Column on the referenced (parent) layer.
    pub referenced_field: String,
}

/// A directed link between two layers, keyed by stable id.
///
/// The endpoint fields hold registry ids in a live project; serialized
/// definitions hold portable identities instead and the importer registers
/// them verbatim, which works out because imported layers adopt their
/// identity as registry id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub id: String,
    pub name: String,
    /// The child side, holding the foreign key.
    pub referencing_layer: String,
    /// The parent side the foreign key points at.
    pub referenced_layer: String,
    pub field_pairs: Vec<FieldPair>,
}

impl Relation {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        referencing_layer: impl Into<String>,
        referenced_layer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            referencing_layer: referencing_layer.into(),
            referenced_layer: referenced_layer.into(),
            field_pairs: Vec::new(),
        }
    }

    /// Builder-style field pair append.
    pub fn with_field_pair(
        mut self,
        referencing_field: impl Into<String>,
        referenced_field: impl Into<String>,
    ) -> Self {
        self.field_pairs.push(FieldPair {
            referencing_field: referencing_field.into(),
            referenced_field: referenced_field.into(),
        });
        self
    }

    /// Serializes the relation.
    pub fn to_xml(&self) -> Element {
        let mut element = Element::new(RELATION_TAG)
            .with_attr(ID_ATTR, &self.id)
            .with_attr(NAME_ATTR, &self.name)
            .with_attr(REFERENCING_ATTR, &self.referencing_layer)
            .with_attr(REFERENCED_ATTR, &self.referenced_layer);
        for pair in &self.field_pairs {
            element.push_child(
                Element::new(FIELD_REF_TAG)
                    .with_attr(REFERENCING_FIELD_ATTR, &pair.referencing_field)
                    .with_attr(REFERENCED_FIELD_ATTR, &pair.referenced_field),
            );
        }
        element
    }

    /// Reads a serialized relation.
    pub fn from_xml(element: &Element) -> Result<Self> {
        let id = require_attr(element, ID_ATTR)?;
        let referencing = require_attr(element, REFERENCING_ATTR)?;
        let referenced = require_attr(element, REFERENCED_ATTR)?;
        let name = element.attr(NAME_ATTR).unwrap_or(id);

        let mut relation = Self::new(id, name, referencing, referenced);
        for node in element.children_named(FIELD_REF_TAG) {
            let referencing_field = node.attr(REFERENCING_FIELD_ATTR).unwrap_or_default();
            let referenced_field = node.attr(REFERENCED_FIELD_ATTR).unwrap_or_default();
            relation.field_pairs.push(FieldPair {
                referencing_field: referencing_field.to_string(),
                referenced_field: referenced_field.to_string(),
            });
        }
        Ok(relation)
    }
}

fn require_attr<'a>(element: &'a Element, attr: &'static str) -> Result<&'a str> {
    element.attr(attr).ok_or(ProjectError::MissingAttribute {
        tag: RELATION_TAG,
        attr,
    })
}

/// The set of relations registered in a project.
#[derive(Debug, Clone, Default)]
pub struct RelationManager {
    relations: Vec<Relation>,
}

impl RelationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a relation, replacing any existing relation with the same id.
    pub fn add(&mut self, relation: Relation) {
        if let Some(slot) = self.relations.iter_mut().find(|r| r.id == relation.id) {
            warn!(relation = %relation.id, "replacing relation already registered");
            *slot = relation;
        } else {
            self.relations.push(relation);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Relations in which `layer_id` is the referencing (child) side.
    pub fn referencing<'a>(&'a self, layer_id: &'a str) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations
            .iter()
            .filter(move |relation| relation.referencing_layer == layer_id)
    }

    /// Relations in which `layer_id` is the referenced (parent) side.
    pub fn referenced<'a>(&'a self, layer_id: &'a str) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations
            .iter()
            .filter(move |relation| relation.referenced_layer == layer_id)
    }
}
