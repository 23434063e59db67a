//! CLI library components for the layer definition exchange tool.

pub mod logging;
pub mod workflow;
