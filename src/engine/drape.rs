//! Triangular drape generation
//!
//! A drape is the vertically-flipped lower half of a panel cell, masked by a
//! triangle that converges to the atlas apex. The mask is computed over the
//! full canvas coordinate space: the apex lies outside the cell rectangle,
//! and only a canvas-space triangle gives both drapes a true straight-line
//! convergence to the same vanishing point. The full-canvas mask is cropped
//! to the cell rectangle before use.

use image::{imageops, GrayImage, Luma, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use rayon::prelude::*;

use crate::domain::{AtlasGeometry, CellAnchor};

/// Base edge of a fade triangle, in canvas coordinates. `x1` is inclusive,
/// matching the base corner of the rasterized polygon.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BaseSpan {
    pub x0: i32,
    pub x1: i32,
    pub y0: i32,
}

/// Rasterize the triangle (apex, base) and multiply it with a vertical
/// luminance gradient running from 0 at the base row to 255 at the apex row.
///
/// The gradient at the base row evaluates to `0^fade_power = 0`, so the
/// combined mask is always exactly zero there; opacity builds toward the
/// apex while the triangle narrows. This is the literal fade behavior of the
/// reference pipeline and is pinned by regression tests.
///
/// A degenerate apex at or above the base clamps the triangle height to one
/// pixel and still yields a valid (possibly fully transparent) mask.
pub(crate) fn triangle_fade_mask(
    canvas_w: u32,
    canvas_h: u32,
    base: BaseSpan,
    apex_x: i32,
    apex_y: i32,
    fade_power: f32,
) -> GrayImage {
    let mut tri = GrayImage::new(canvas_w, canvas_h);
    let polygon = [
        Point::new(apex_x, apex_y),
        Point::new(base.x0, base.y0),
        Point::new(base.x1, base.y0),
    ];
    // draw_polygon_mut rejects a closed ring; a base corner coinciding with
    // the apex means the triangle has no area anyway.
    if polygon[0] != polygon[2] {
        draw_polygon_mut(&mut tri, &polygon, Luma([255u8]));
    }

    let mut grad = GrayImage::new(canvas_w, canvas_h);
    let height = (apex_y - base.y0).max(1);
    let y_start = base.y0.max(0);
    let y_end = apex_y.min(canvas_h as i32 - 1);
    let x_start = base.x0.max(0);
    let x_end = base.x1.min(canvas_w as i32 - 1);
    for y in y_start..=y_end {
        let t = (y - base.y0) as f32 / height as f32;
        let value = (t.powf(fade_power) * 255.0) as u8;
        for x in x_start..=x_end {
            grad.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }

    // Pixel-wise multiply: zero outside the triangle, gradient inside.
    tri.par_iter_mut()
        .zip(grad.par_iter())
        .for_each(|(t, g)| *t = ((*t as u16 * *g as u16) / 255) as u8);
    tri
}

/// Build the drape base image for a cell: lower half, flipped vertically so
/// the hem pixels face downward continuously, lightly blurred, and forced
/// fully opaque. The drape's shape comes entirely from the mask applied
/// afterward, not from this image's own alpha.
pub fn drape_base(cell: &RgbaImage, blur_sigma: f32) -> RgbaImage {
    let (w, h) = cell.dimensions();
    let lower = imageops::crop_imm(cell, 0, h / 2, w, h - h / 2).to_image();
    let flipped = imageops::flip_vertical(&lower);

    let mut base = RgbaImage::new(w, h);
    imageops::overlay(&mut base, &flipped, 0, 0);

    let mut blurred = if blur_sigma > 0.0 {
        imageops::blur(&base, blur_sigma)
    } else {
        base
    };
    for pixel in blurred.pixels_mut() {
        pixel.0[3] = 255;
    }
    blurred
}

/// Compute the fade mask for one drape cell, cropped to the cell rectangle.
///
/// `expand_left`/`expand_right` widen the triangle base beyond the cell
/// edges; the seam-facing side gets the overlap so adjacent drapes meet
/// without a gap, the outward side stays flush.
pub fn drape_mask(
    geo: &AtlasGeometry,
    anchor: CellAnchor,
    expand_left: u32,
    expand_right: u32,
) -> GrayImage {
    let base = BaseSpan {
        x0: anchor.x as i32 - expand_left as i32,
        x1: (anchor.x + geo.cell_w) as i32 + expand_right as i32,
        y0: anchor.y as i32,
    };
    let full = triangle_fade_mask(
        geo.size,
        geo.size,
        base,
        geo.apex_x,
        geo.apex_y,
        geo.drape_fade_power,
    );
    imageops::crop_imm(&full, anchor.x, anchor.y, geo.cell_w, geo.cell_h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeometryOverrides;
    use image::Rgba;

    fn default_geo() -> AtlasGeometry {
        AtlasGeometry::new(&GeometryOverrides::default())
    }

    #[test]
    fn test_mask_is_exactly_zero_at_base_row() {
        // Boundary property of the fade function: the gradient term at the
        // base row is 0^fade_power = 0, so the combined mask there is 0,
        // not 255. Pinned deliberately.
        let geo = default_geo();
        let mask = triangle_fade_mask(
            geo.size,
            geo.size,
            BaseSpan { x0: 61, x1: 491, y0: 542 },
            geo.apex_x,
            geo.apex_y,
            1.0,
        );
        for x in 0..geo.size {
            assert_eq!(mask.get_pixel(x, 542).0[0], 0);
        }
    }

    #[test]
    fn test_mask_zero_outside_triangle() {
        let geo = default_geo();
        let mask = triangle_fade_mask(
            geo.size,
            geo.size,
            BaseSpan { x0: 61, x1: 491, y0: 542 },
            geo.apex_x,
            geo.apex_y,
            1.0,
        );
        // above the base row
        assert_eq!(mask.get_pixel(200, 400).0[0], 0);
        // beside the triangle, below the base
        assert_eq!(mask.get_pixel(10, 700).0[0], 0);
        assert_eq!(mask.get_pixel(1000, 700).0[0], 0);
    }

    #[test]
    fn test_mask_builds_opacity_toward_apex_inside_triangle() {
        let geo = default_geo();
        let mask = triangle_fade_mask(
            geo.size,
            geo.size,
            BaseSpan { x0: 61, x1: 491, y0: 542 },
            geo.apex_x,
            geo.apex_y,
            1.0,
        );
        // on the vertical line through the apex, midway down the triangle
        let mid = mask.get_pixel(460, 750).0[0];
        let low = mask.get_pixel(460, 600).0[0];
        assert!(mid > 0, "interior must be nonzero");
        assert!(mid > low, "opacity must grow toward the apex");
    }

    #[test]
    fn test_triangle_collapses_at_apex() {
        let geo = default_geo();
        let mask = triangle_fade_mask(
            geo.size,
            geo.size,
            BaseSpan { x0: 61, x1: 491, y0: 542 },
            geo.apex_x,
            geo.apex_y,
            1.0,
        );
        // a few rows above the apex the triangle is only a sliver wide
        let y = (geo.apex_y - 3) as u32;
        let lit: u32 = (0..geo.size)
            .filter(|&x| mask.get_pixel(x, y).0[0] > 0)
            .count() as u32;
        assert!(lit <= 8, "triangle should collapse near the apex, got {lit} lit pixels");
        // and below the apex nothing is lit
        for x in 0..geo.size {
            assert_eq!(mask.get_pixel(x, (geo.apex_y + 2) as u32).0[0], 0);
        }
    }

    #[test]
    fn test_degenerate_apex_above_base_yields_valid_empty_mask() {
        let mask = triangle_fade_mask(
            256,
            256,
            BaseSpan { x0: 10, x1: 100, y0: 200 },
            50,
            100, // apex above the base
            1.0,
        );
        assert_eq!(mask.dimensions(), (256, 256));
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_degenerate_apex_on_base_does_not_panic() {
        let mask = triangle_fade_mask(
            128,
            128,
            BaseSpan { x0: 10, x1: 100, y0: 64 },
            100,
            64, // apex coincides with the base right corner
            1.0,
        );
        assert_eq!(mask.dimensions(), (128, 128));
    }

    #[test]
    fn test_drape_mask_is_cell_sized() {
        let geo = default_geo();
        let mask = drape_mask(&geo, geo.front_drape, 0, geo.overlap_px);
        assert_eq!(mask.dimensions(), (geo.cell_w, geo.cell_h));
    }

    #[test]
    fn test_drape_base_flips_lower_half_and_is_opaque() {
        let mut cell = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        // mark the bottom row
        for x in 0..8 {
            cell.put_pixel(x, 7, Rgba([250, 0, 0, 255]));
        }
        let base = drape_base(&cell, 0.0);
        assert_eq!(base.dimensions(), (8, 8));
        // the cell's bottom row (the hem) lands on the drape's top row
        assert_eq!(base.get_pixel(4, 0).0[0], 250);
        assert_eq!(base.get_pixel(4, 3).0[0], 0);
        assert!(base.pixels().all(|p| p.0[3] == 255));
    }
}
