//! Attribute fields and their edit widget bindings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Widget config key naming the layer a `ValueRelation` widget draws from.
pub const LAYER_CONFIG_KEY: &str = "Layer";
/// Widget config key naming the key column of a `ValueRelation` widget.
pub const KEY_CONFIG_KEY: &str = "Key";
/// Widget config key naming the display column of a `ValueRelation` widget.
pub const VALUE_CONFIG_KEY: &str = "Value";

/// The edit widget bound to a field.
///
/// Only `ValueRelation` gets special treatment during export and import; every
/// other widget name is carried through opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetKind {
    ValueRelation,
    Other(String),
}

impl WidgetKind {
    /// Maps a serialized widget name onto the kind.
    pub fn parse(name: &str) -> Self {
        if name == "ValueRelation" {
            Self::ValueRelation
        } else {
            Self::Other(name.to_string())
        }
    }

    /// Returns the serialized widget name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ValueRelation => "ValueRelation",
            Self::Other(name) => name,
        }
    }

    pub fn is_value_relation(&self) -> bool {
        matches!(self, Self::ValueRelation)
    }
}

impl Default for WidgetKind {
    /// The stock text widget used when a field carries no explicit binding.
    fn default() -> Self {
        Self::Other("TextEdit".to_string())
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attribute field of a vector layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name in the underlying table.
    pub name: String,
    /// Human-readable alias shown in attribute forms, when set.
    pub alias: Option<String>,
    /// Edit widget bound to the field.
    pub widget: WidgetKind,
    /// Widget configuration entries, keyed by config name.
    pub config: BTreeMap<String, String>,
}

impl Field {
    /// Creates a field with the default widget and no configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a `ValueRelation` field pointing at another layer.
    pub fn value_relation(
        name: impl Into<String>,
        layer: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut config = BTreeMap::new();
        config.insert(LAYER_CONFIG_KEY.to_string(), layer.into());
        config.insert(KEY_CONFIG_KEY.to_string(), key.into());
        config.insert(VALUE_CONFIG_KEY.to_string(), value.into());
        Self {
            name: name.into(),
            alias: None,
            widget: WidgetKind::ValueRelation,
            config,
        }
    }

    /// Builder-style alias assignment.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The layer a `ValueRelation` widget references, if any.
    pub fn layer_reference(&self) -> Option<&str> {
        if self.widget.is_value_relation() {
            self.config.get(LAYER_CONFIG_KEY).map(String::as_str)
        } else {
            None
        }
    }

    /// Repoints a `ValueRelation` widget at another layer id.
    ///
    /// Has no effect on fields bound to other widgets.
    pub fn set_layer_reference(&mut self, layer: impl Into<String>) {
        if self.widget.is_value_relation() {
            self.config.insert(LAYER_CONFIG_KEY.to_string(), layer.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_widget_is_text_edit() {
        let field = Field::new("remarks");
        assert_eq!(field.widget.as_str(), "TextEdit");
        assert!(!field.widget.is_value_relation());
    }

    #[test]
    fn value_relation_exposes_layer_reference() {
        let field = Field::value_relation("zone_id", "zoning_live_id", "id", "label");
        assert_eq!(field.layer_reference(), Some("zoning_live_id"));
        assert_eq!(field.config.get(KEY_CONFIG_KEY).map(String::as_str), Some("id"));
    }

    #[test]
    fn layer_reference_is_none_for_plain_widgets() {
        let mut field = Field::new("remarks");
        field.config.insert(LAYER_CONFIG_KEY.to_string(), "x".to_string());
        assert_eq!(field.layer_reference(), None);
    }

    #[test]
    fn set_layer_reference_ignores_plain_widgets() {
        let mut field = Field::new("remarks");
        field.set_layer_reference("other");
        assert!(!field.config.contains_key(LAYER_CONFIG_KEY));

        let mut vr = Field::value_relation("zone_id", "old", "id", "label");
        vr.set_layer_reference("new");
        assert_eq!(vr.layer_reference(), Some("new"));
    }

    #[test]
    fn widget_parse_round_trips() {
        assert!(WidgetKind::parse("ValueRelation").is_value_relation());
        let other = WidgetKind::parse("CheckBox");
        assert_eq!(other.as_str(), "CheckBox");
        assert!(!other.is_value_relation());
    }
}
