//! Portable identity derivation.

use ldx_model::{LayerId, ModelError};
use ldx_project::MapLayer;

use crate::error::{EngineError, Result};

/// Derives the portable identity of a layer from its connection descriptor.
///
/// The identity is the bare table name, so two layers over the same table
/// collapse onto one exported definition; callers that need distinct exports
/// must point the layers at distinct tables. Descriptors without a table
/// entry (typically file-based sources) cannot be exported.
pub fn layer_identity(layer: &MapLayer) -> Result<LayerId> {
    let wrap = |source: ModelError| EngineError::Identity {
        layer: layer.name.clone(),
        source,
    };
    let table = layer.source.table().ok_or(ModelError::MissingTable).map_err(wrap)?;
    LayerId::new(table).map_err(wrap)
}

#[cfg(test)]
mod tests {
    use ldx_model::DataSource;

    use super::*;

    #[test]
    fn identity_is_the_bare_table_name() {
        let source =
            DataSource::parse("service='pg_prod' table=\"land\".\"parcels\" (geom)").unwrap();
        let layer = MapLayer::vector("live_id_42", "Parcels", source);
        assert_eq!(layer_identity(&layer).unwrap().as_str(), "parcels");
    }

    #[test]
    fn same_table_means_same_identity() {
        let a = MapLayer::vector(
            "live_a",
            "A",
            DataSource::parse("table=\"land\".\"parcels\"").unwrap(),
        );
        let b = MapLayer::vector(
            "live_b",
            "B",
            DataSource::parse("service='pg_other' table=\"archive\".\"parcels\"").unwrap(),
        );
        assert_eq!(layer_identity(&a).unwrap(), layer_identity(&b).unwrap());
    }

    #[test]
    fn tableless_descriptor_is_rejected() {
        let layer = MapLayer::raster(
            "dem",
            "Elevation",
            DataSource::parse("path=/data/dem.tif").unwrap(),
        );
        let err = layer_identity(&layer).unwrap_err();
        assert!(matches!(err, EngineError::Identity { layer, .. } if layer == "Elevation"));
    }
}
