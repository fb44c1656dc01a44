//! Domain types
//!
//! Atlas grid geometry and the rendering style selector. These are pure
//! configuration values computed once per build and threaded through every
//! pipeline stage.

mod geometry;
mod style;

pub use geometry::{
    AtlasGeometry, CellAnchor, ConnectorParams, GeometryOverrides, CANVAS_SIZE, PAD_RATIO,
};
pub use style::RenderStyle;
