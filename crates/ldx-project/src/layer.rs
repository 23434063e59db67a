//! Map layers and their two serialized halves.
//!
//! A layer serializes into a native part (id, name, datasource, kind) and a
//! styling part (edit widgets, aliases, form settings). `write_xml` emits
//! both halves into one element the way a project document stores them; the
//! export path splits the styling half into its own document afterwards.

use std::collections::BTreeMap;

use ldx_dom::Element;
use ldx_model::{
    DataSource, Field, LAYER_CONFIG_KEY, LayerKind, WidgetKind,
};

use crate::error::{ProjectError, Result};

/// Root element of a serialized layer definition.
pub const MAPLAYER_TAG: &str = "maplayer";
/// Attribute carrying the layer kind on the root element.
pub const TYPE_ATTR: &str = "type";
/// Element carrying the layer id.
pub const ID_TAG: &str = "id";
/// Element carrying the display name.
pub const NAME_TAG: &str = "layername";
/// Element carrying the connection descriptor.
pub const DATASOURCE_TAG: &str = "datasource";

/// Root element of a standalone styling document.
pub const STYLE_ROOT_TAG: &str = "layer-style";
/// Container element for edit widget bindings.
pub const EDITTYPES_TAG: &str = "edittypes";
/// One edit widget binding.
pub const EDITTYPE_TAG: &str = "edittype";
/// Widget configuration element inside an `edittype`.
pub const WIDGET_CONFIG_TAG: &str = "widgetv2config";
/// Attribute carrying the widget name on an `edittype`.
pub const WIDGET_TYPE_ATTR: &str = "widgetv2type";
/// Config attribute rewritten when a `ValueRelation` widget is repointed.
pub const WIDGET_LAYER_ATTR: &str = LAYER_CONFIG_KEY;
/// Attribute carrying the field name on `edittype` and `alias` entries.
pub const FIELD_NAME_ATTR: &str = "name";

const ALIASES_TAG: &str = "aliases";
const ALIAS_TAG: &str = "alias";
const EDITFORM_TAG: &str = "editform";
const EDITFORMINIT_TAG: &str = "editforminit";
const FEATFORMSUPPRESS_TAG: &str = "featformsuppress";
const ANNOTATIONFORM_TAG: &str = "annotationform";
const EDITORLAYOUT_TAG: &str = "editorlayout";
const EXCLUDE_WMS_TAG: &str = "excludeAttributesWMS";
const EXCLUDE_WFS_TAG: &str = "excludeAttributesWFS";
const ATTRIBUTEACTIONS_TAG: &str = "attributeactions";
const ATTRIBUTE_TAG: &str = "attribute";
const FIELD_ATTR: &str = "field";

/// Attribute form configuration of a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSettings {
    /// Path to a custom UI form, when one is used.
    pub edit_form: Option<String>,
    /// Python init function run when the form opens.
    pub init_function: Option<String>,
    /// Path to an annotation form, when one is used.
    pub annotation_form: Option<String>,
    /// Form layout mode.
    pub editor_layout: String,
    /// Whether the attribute form popup is suppressed on feature creation.
    pub suppress_form_popup: bool,
    /// Attributes excluded from WMS publication.
    pub wms_excluded: Vec<String>,
    /// Attributes excluded from WFS publication.
    pub wfs_excluded: Vec<String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            edit_form: None,
            init_function: None,
            annotation_form: None,
            editor_layout: "generatedlayout".to_string(),
            suppress_form_popup: false,
            wms_excluded: Vec::new(),
            wfs_excluded: Vec::new(),
        }
    }
}

/// A live map layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    /// Registry id. Imported layers use their portable identity here.
    pub id: String,
    /// Display name shown in the layer tree.
    pub name: String,
    pub kind: LayerKind,
    pub source: DataSource,
    /// Attribute fields, vector layers only.
    pub fields: Vec<Field>,
    pub form: FormSettings,
}

impl MapLayer {
    /// Creates a vector layer with no fields.
    pub fn vector(id: impl Into<String>, name: impl Into<String>, source: DataSource) -> Self {
        Self::with_kind(LayerKind::Vector, id, name, source)
    }

    /// Creates a raster layer.
    pub fn raster(id: impl Into<String>, name: impl Into<String>, source: DataSource) -> Self {
        Self::with_kind(LayerKind::Raster, id, name, source)
    }

    fn with_kind(
        kind: LayerKind,
        id: impl Into<String>,
        name: impl Into<String>,
        source: DataSource,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            source,
            fields: Vec::new(),
            form: FormSettings::default(),
        }
    }

    /// Builder-style field append.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a field by column name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Serializes the full layer (native and styling halves) into `root`.
    pub fn write_xml(&self, root: &mut Element) {
        root.set_attr(TYPE_ATTR, self.kind.as_str());
        root.push_child(Element::new(ID_TAG).with_text(&self.id));
        root.push_child(Element::new(NAME_TAG).with_text(&self.name));
        root.push_child(Element::new(DATASOURCE_TAG).with_text(self.source.to_string()));
        self.write_style_elements(root);
    }

    /// Reads the native half of a serialized layer.
    ///
    /// Fields and form settings are left at their defaults; callers follow up
    /// with [`MapLayer::apply_style`] once the styling half is available.
    pub fn read_xml(root: &Element) -> Result<Self> {
        let kind: LayerKind = root
            .attr(TYPE_ATTR)
            .ok_or(ProjectError::MissingAttribute {
                tag: MAPLAYER_TAG,
                attr: TYPE_ATTR,
            })?
            .parse()?;
        let id = root.child_text(ID_TAG).ok_or(ProjectError::MissingElement {
            tag: ID_TAG,
            context: "layer definition",
        })?;
        let name = root
            .child_text(NAME_TAG)
            .ok_or(ProjectError::MissingElement {
                tag: NAME_TAG,
                context: "layer definition",
            })?;
        let descriptor = root
            .child_text(DATASOURCE_TAG)
            .ok_or(ProjectError::MissingElement {
                tag: DATASOURCE_TAG,
                context: "layer definition",
            })?;
        let source = DataSource::parse(descriptor)?;
        Ok(Self::with_kind(kind, id, name, source))
    }

    /// Builds a standalone styling document for the layer.
    pub fn write_style_document(&self) -> Element {
        let mut root = Element::new(STYLE_ROOT_TAG);
        self.write_style_elements(&mut root);
        root
    }

    /// Appends the styling elements to `parent`.
    pub fn write_style_elements(&self, parent: &mut Element) {
        let mut edittypes = Element::new(EDITTYPES_TAG);
        for field in &self.fields {
            let mut edittype = Element::new(EDITTYPE_TAG)
                .with_attr(FIELD_NAME_ATTR, &field.name)
                .with_attr(WIDGET_TYPE_ATTR, field.widget.as_str());
            if !field.config.is_empty() {
                let mut config = Element::new(WIDGET_CONFIG_TAG);
                for (key, value) in &field.config {
                    config.set_attr(key, value);
                }
                edittype.push_child(config);
            }
            edittypes.push_child(edittype);
        }
        parent.push_child(edittypes);

        parent.push_child(text_or_empty(EDITFORM_TAG, self.form.edit_form.as_deref()));
        parent.push_child(text_or_empty(
            EDITFORMINIT_TAG,
            self.form.init_function.as_deref(),
        ));
        parent.push_child(
            Element::new(FEATFORMSUPPRESS_TAG)
                .with_text(if self.form.suppress_form_popup { "1" } else { "0" }),
        );
        parent.push_child(text_or_empty(
            ANNOTATIONFORM_TAG,
            self.form.annotation_form.as_deref(),
        ));
        parent.push_child(Element::new(EDITORLAYOUT_TAG).with_text(&self.form.editor_layout));

        parent.push_child(attribute_list(EXCLUDE_WMS_TAG, &self.form.wms_excluded));
        parent.push_child(attribute_list(EXCLUDE_WFS_TAG, &self.form.wfs_excluded));
        parent.push_child(Element::new(ATTRIBUTEACTIONS_TAG));

        let mut aliases = Element::new(ALIASES_TAG);
        for field in &self.fields {
            if let Some(alias) = &field.alias {
                aliases.push_child(
                    Element::new(ALIAS_TAG)
                        .with_attr(FIELD_ATTR, &field.name)
                        .with_attr(FIELD_NAME_ATTR, alias),
                );
            }
        }
        parent.push_child(aliases);
    }

    /// Applies the styling half found under `parent` to the layer.
    ///
    /// `parent` may be a standalone styling document root or a merged layer
    /// element; only sections that are present are applied. When an
    /// `edittypes` section exists it replaces the field list wholesale.
    pub fn apply_style(&mut self, parent: &Element) -> Result<()> {
        if let Some(edittypes) = parent.first_child(EDITTYPES_TAG) {
            let mut fields = Vec::new();
            for node in edittypes.children_named(EDITTYPE_TAG) {
                let name = node.attr(FIELD_NAME_ATTR).ok_or(ProjectError::MissingAttribute {
                    tag: EDITTYPE_TAG,
                    attr: FIELD_NAME_ATTR,
                })?;
                let widget = node
                    .attr(WIDGET_TYPE_ATTR)
                    .map_or_else(WidgetKind::default, WidgetKind::parse);
                let mut config = BTreeMap::new();
                if let Some(node) = node.first_child(WIDGET_CONFIG_TAG) {
                    for (key, value) in node.attributes() {
                        config.insert(key.to_string(), value.to_string());
                    }
                }
                fields.push(Field {
                    name: name.to_string(),
                    alias: None,
                    widget,
                    config,
                });
            }
            self.fields = fields;
        }

        if let Some(aliases) = parent.first_child(ALIASES_TAG) {
            for node in aliases.children_named(ALIAS_TAG) {
                let (Some(field_name), Some(alias)) = (node.attr(FIELD_ATTR), node.attr(FIELD_NAME_ATTR))
                else {
                    continue;
                };
                if alias.is_empty() {
                    continue;
                }
                if let Some(field) = self.fields.iter_mut().find(|f| f.name == field_name) {
                    field.alias = Some(alias.to_string());
                }
            }
        }

        if let Some(text) = parent.child_text(EDITFORM_TAG) {
            self.form.edit_form = non_empty(text);
        }
        if let Some(text) = parent.child_text(EDITFORMINIT_TAG) {
            self.form.init_function = non_empty(text);
        }
        if let Some(text) = parent.child_text(ANNOTATIONFORM_TAG) {
            self.form.annotation_form = non_empty(text);
        }
        if let Some(text) = parent.child_text(FEATFORMSUPPRESS_TAG) {
            self.form.suppress_form_popup = text == "1" || text.eq_ignore_ascii_case("true");
        }
        if let Some(text) = parent.child_text(EDITORLAYOUT_TAG) {
            if !text.is_empty() {
                self.form.editor_layout = text.to_string();
            }
        }
        if let Some(node) = parent.first_child(EXCLUDE_WMS_TAG) {
            self.form.wms_excluded = attribute_texts(node);
        }
        if let Some(node) = parent.first_child(EXCLUDE_WFS_TAG) {
            self.form.wfs_excluded = attribute_texts(node);
        }
        Ok(())
    }

    /// Fields whose widget references another layer.
    pub fn value_relation_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|field| field.widget.is_value_relation())
    }
}

fn text_or_empty(tag: &str, text: Option<&str>) -> Element {
    match text {
        Some(text) => Element::new(tag).with_text(text),
        None => Element::new(tag),
    }
}

fn attribute_list(tag: &str, names: &[String]) -> Element {
    let mut list = Element::new(tag);
    for name in names {
        list.push_child(Element::new(ATTRIBUTE_TAG).with_text(name));
    }
    list
}

fn attribute_texts(node: &Element) -> Vec<String> {
    node.children_named(ATTRIBUTE_TAG)
        .map(|child| child.text().to_string())
        .collect()
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
