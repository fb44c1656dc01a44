//! Atlas grid geometry
//!
//! The atlas is a fixed square canvas holding a 2x2 grid of cells: front and
//! back panels on the top row, their drapes on the bottom row. All layout is
//! derived once per build from the canvas size plus an override bundle and
//! threaded through the pipeline as an immutable value — no stage reads
//! layout from global state.

use serde::{Deserialize, Serialize};

/// Reference canvas size for the texture atlas, in pixels.
pub const CANVAS_SIZE: u32 = 1024;

/// Padding between cells (and between cells and the canvas edge), as a
/// fraction of canvas size. Three gaps per axis: edge-cell-cell-edge.
pub const PAD_RATIO: f32 = 0.06;

/// Top-left corner of a grid cell, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAnchor {
    pub x: u32,
    pub y: u32,
}

/// Tunable geometry and appearance knobs, each defaulting to a fixed
/// constant when omitted. Deserializable so callers can supply a partial
/// override bundle (JSON or config file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryOverrides {
    /// Apex x position as a fraction of canvas size.
    #[serde(default = "default_apex_x_ratio")]
    pub apex_x_ratio: f32,

    /// Apex y position as a fraction of canvas size. Sits below the drape
    /// cells so both drapes converge toward a shared vanishing point.
    #[serde(default = "default_apex_y_ratio")]
    pub apex_y_ratio: f32,

    /// Fade exponent for the drape masks. Lower values fade more slowly
    /// near the base, giving a fuller look.
    #[serde(default = "default_fade_power")]
    pub drape_fade_power: f32,

    /// Gaussian blur sigma applied to the drape base image.
    #[serde(default = "default_drape_blur")]
    pub drape_blur: f32,

    /// How far the connector base extends inward from each drape's seam-side
    /// edge, as a fraction of cell width.
    #[serde(default = "default_connector_expand")]
    pub connector_expand_ratio: f32,

    /// Vertical nudge of the connector base relative to the drape row top,
    /// as a fraction of cell height (negative = up).
    #[serde(default = "default_connector_top_offset")]
    pub connector_top_offset_ratio: f32,

    /// Fade exponent for the connector mask.
    #[serde(default = "default_fade_power")]
    pub connector_fade_power: f32,

    /// Vertical streak amount for the connector, in pixels.
    #[serde(default = "default_connector_streak")]
    pub connector_streak_px: u32,

    /// Gaussian blur sigma applied to the masked connector.
    #[serde(default = "default_connector_blur")]
    pub connector_blur: f32,

    /// Brightness factor for the connector in `preserve` style.
    #[serde(default = "default_connector_intensity")]
    pub connector_intensity: f32,

    /// Pixel margin by which drape and connector masks intrude into
    /// neighboring regions, preventing a visible dark seam.
    #[serde(default = "default_overlap_px")]
    pub overlap_px: u32,
}

fn default_apex_x_ratio() -> f32 { 0.50 }
fn default_apex_y_ratio() -> f32 { 0.965 }
fn default_fade_power() -> f32 { 1.0 }
fn default_drape_blur() -> f32 { 0.8 }
fn default_connector_expand() -> f32 { 0.35 }
fn default_connector_top_offset() -> f32 { -0.04 }
fn default_connector_streak() -> u32 { 14 }
fn default_connector_blur() -> f32 { 1.2 }
fn default_connector_intensity() -> f32 { 0.95 }
fn default_overlap_px() -> u32 { 10 }

impl Default for GeometryOverrides {
    fn default() -> Self {
        GeometryOverrides {
            apex_x_ratio: default_apex_x_ratio(),
            apex_y_ratio: default_apex_y_ratio(),
            drape_fade_power: default_fade_power(),
            drape_blur: default_drape_blur(),
            connector_expand_ratio: default_connector_expand(),
            connector_top_offset_ratio: default_connector_top_offset(),
            connector_fade_power: default_fade_power(),
            connector_streak_px: default_connector_streak(),
            connector_blur: default_connector_blur(),
            connector_intensity: default_connector_intensity(),
            overlap_px: default_overlap_px(),
        }
    }
}

/// Connector-specific appearance parameters, resolved from the overrides.
#[derive(Debug, Clone, Copy)]
pub struct ConnectorParams {
    pub expand_ratio: f32,
    pub top_offset_ratio: f32,
    pub fade_power: f32,
    pub streak_px: u32,
    pub blur: f32,
    pub intensity: f32,
}

/// Resolved per-build geometry: grid layout plus the shared apex point and
/// all appearance knobs. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct AtlasGeometry {
    /// Canvas side length in pixels (square).
    pub size: u32,
    /// Gap between cells and between cells and the canvas edge.
    pub pad: u32,
    pub cell_w: u32,
    pub cell_h: u32,
    /// Top row: the front and back panel prints.
    pub front_panel: CellAnchor,
    pub back_panel: CellAnchor,
    /// Bottom row: the drape regions below each panel.
    pub front_drape: CellAnchor,
    pub back_drape: CellAnchor,
    /// Shared vanishing point, in canvas coordinates. Lies below the drape
    /// cells, so triangle masks must be computed in canvas space.
    pub apex_x: i32,
    pub apex_y: i32,
    pub drape_fade_power: f32,
    pub drape_blur: f32,
    pub connector: ConnectorParams,
    pub overlap_px: u32,
}

impl AtlasGeometry {
    /// Resolve geometry for the reference canvas size.
    pub fn new(overrides: &GeometryOverrides) -> Self {
        Self::with_size(CANVAS_SIZE, overrides)
    }

    /// Resolve geometry for an arbitrary canvas size. Cell dimensions are
    /// clamped to at least one pixel so tiny canvases stay well-formed.
    pub fn with_size(size: u32, overrides: &GeometryOverrides) -> Self {
        let pad = (size as f32 * PAD_RATIO).round() as u32;
        let cell = (size.saturating_sub(pad * 3) / 2).max(1);

        let front_panel = CellAnchor { x: pad, y: pad };
        let back_panel = CellAnchor { x: pad * 2 + cell, y: pad };
        let front_drape = CellAnchor { x: pad, y: pad * 2 + cell };
        let back_drape = CellAnchor { x: pad * 2 + cell, y: pad * 2 + cell };

        AtlasGeometry {
            size,
            pad,
            cell_w: cell,
            cell_h: cell,
            front_panel,
            back_panel,
            front_drape,
            back_drape,
            apex_x: (size as f32 * overrides.apex_x_ratio) as i32,
            apex_y: (size as f32 * overrides.apex_y_ratio) as i32,
            drape_fade_power: overrides.drape_fade_power,
            drape_blur: overrides.drape_blur,
            connector: ConnectorParams {
                expand_ratio: overrides.connector_expand_ratio,
                top_offset_ratio: overrides.connector_top_offset_ratio,
                fade_power: overrides.connector_fade_power,
                streak_px: overrides.connector_streak_px,
                blur: overrides.connector_blur,
                intensity: overrides.connector_intensity,
            },
            overlap_px: overrides.overlap_px,
        }
    }
}
