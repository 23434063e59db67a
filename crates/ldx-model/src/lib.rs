pub mod datasource;
pub mod error;
pub mod field;
pub mod ids;
pub mod kind;
pub mod treepath;

pub use datasource::DataSource;
pub use error::{ModelError, Result};
pub use field::{Field, KEY_CONFIG_KEY, LAYER_CONFIG_KEY, VALUE_CONFIG_KEY, WidgetKind};
pub use ids::LayerId;
pub use kind::LayerKind;
pub use treepath::TreePath;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_serializes() {
        let field = Field::value_relation("zone_id", "zoning", "id", "label").with_alias("Zone");
        let json = serde_json::to_string(&field).expect("serialize field");
        let round: Field = serde_json::from_str(&json).expect("deserialize field");
        assert_eq!(round, field);
    }

    #[test]
    fn layer_id_serializes_transparently() {
        let id = LayerId::new("parcels").unwrap();
        let json = serde_json::to_string(&id).expect("serialize id");
        assert_eq!(json, "\"parcels\"");
    }
}
