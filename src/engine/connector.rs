//! Seam connector synthesis
//!
//! The front and back drapes sit in adjacent cells and would meet at a
//! visible vertical seam. The connector is one wider triangle straddling
//! that seam, converging to the same apex as the drapes, so the two hems
//! blend into one. Painted last so it sits on top of both drape layers.

use image::{imageops, Rgba, RgbaImage};

use crate::domain::{AtlasGeometry, RenderStyle};
use crate::engine::drape::{triangle_fade_mask, BaseSpan};

use super::apply_alpha_mask;

/// Canvas-space fade mask for the connector triangle.
///
/// The base spans the seam: its left end is pulled inward from the front
/// drape's right edge by `expand + overlap`, the right end symmetrically
/// from the back drape's left edge, so the base overlaps both drape masks.
/// The base row can be nudged vertically by the top-offset ratio.
pub(crate) fn connector_mask(geo: &AtlasGeometry) -> image::GrayImage {
    let params = &geo.connector;
    let expand = (geo.cell_w as f32 * params.expand_ratio) as i32;
    let top_y = geo.front_drape.y as i32 + (geo.cell_h as f32 * params.top_offset_ratio) as i32;

    let base = BaseSpan {
        x0: (geo.front_drape.x + geo.cell_w) as i32 - expand - geo.overlap_px as i32,
        x1: geo.back_drape.x as i32 + expand + geo.overlap_px as i32,
        y0: top_y,
    };
    triangle_fade_mask(geo.size, geo.size, base, geo.apex_x, geo.apex_y, params.fade_power)
}

/// Mean luminance of an image, alpha ignored (human-eye channel weights).
fn mean_luma(image: &RgbaImage) -> f32 {
    let mut sum = 0.0f64;
    for Rgba([r, g, b, _]) in image.pixels() {
        sum += 0.299 * *r as f64 + 0.587 * *g as f64 + 0.114 * *b as f64;
    }
    let count = (image.width() as u64 * image.height() as u64).max(1);
    (sum / count as f64) as f32
}

/// Synthesize the full-canvas connector layer.
///
/// In `silhouette` style the connector is pure white with mask-driven alpha.
/// In `preserve` style its luminance follows the average luminance of the
/// two drapes it bridges, scaled by the intensity knob, so it blends with
/// whatever color the garment actually is.
pub fn seam_connector(
    geo: &AtlasGeometry,
    style: RenderStyle,
    front_drape: &RgbaImage,
    back_drape: &RgbaImage,
) -> RgbaImage {
    let params = geo.connector;
    let mask = connector_mask(geo);

    let level = match style {
        RenderStyle::Silhouette => 255,
        RenderStyle::Preserve => {
            let mean = (mean_luma(front_drape) + mean_luma(back_drape)) / 2.0;
            (mean * params.intensity).min(255.0) as u8
        }
    };

    let mut layer = RgbaImage::from_pixel(geo.size, geo.size, Rgba([level, level, level, 0]));
    apply_alpha_mask(&mut layer, &mask);

    let layer = if params.blur > 0.0 {
        imageops::blur(&layer, params.blur)
    } else {
        layer
    };
    vertical_streak(layer, params.streak_px)
}

/// Vertical streak distortion: upsample vertically then downsample back,
/// stretching fine detail into thin striations that read as fabric weave.
fn vertical_streak(image: RgbaImage, strength: u32) -> RgbaImage {
    if strength == 0 {
        return image;
    }
    let (w, h) = image.dimensions();
    let stretched = imageops::resize(&image, w, h + strength, imageops::FilterType::CatmullRom);
    imageops::resize(&stretched, w, h, imageops::FilterType::Lanczos3)
}
