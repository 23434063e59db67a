//! Post-load processing hooks.

use ldx_project::MapLayer;

/// A hook invoked by [`crate::LayerImporter`] after layers are loaded.
///
/// Processors can touch every layer as it comes in (aliases, names, widget
/// tweaks) and run follow-up work once a whole top-level load has settled.
/// Errors abort the import that triggered the hook.
pub trait ImportProcessor {
    /// Called once per loaded definition, dependencies included, right after
    /// the layer's styling has been applied.
    fn post_load_definition(&mut self, layer: &mut MapLayer) -> anyhow::Result<()>;

    /// Called once per top-level [`crate::LayerImporter::load_layer`] call,
    /// after deferred relations have been registered.
    fn post_load_layer(&mut self, layer: &MapLayer) -> anyhow::Result<()> {
        let _ = layer;
        Ok(())
    }
}
