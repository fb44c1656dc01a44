//! Cell fitting
//!
//! Contain-scales a cutout into a fixed-size grid cell: the largest scale
//! that fits without cropping, resampled with Lanczos and centered on an
//! opaque dark background.

use image::{imageops, Rgba, RgbaImage};

/// Background color for cell canvases (opaque black).
const CELL_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fit `image` into a `(cell_w, cell_h)` cell, preserving aspect ratio.
///
/// The output is always exactly the target size. The subject touches the
/// cell boundary on its limiting axis and is centered on the other.
pub fn fit_cell(image: &RgbaImage, cell_w: u32, cell_h: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(cell_w, cell_h, CELL_BACKGROUND);

    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return canvas;
    }

    let scale = (cell_w as f64 / w as f64).min(cell_h as f64 / h as f64);
    let new_w = ((w as f64 * scale) as u32).max(1);
    let new_h = ((h as f64 * scale) as u32).max(1);

    let resized = imageops::resize(image, new_w, new_h, imageops::FilterType::Lanczos3);
    let x = (cell_w - new_w) / 2;
    let y = (cell_h - new_h) / 2;
    imageops::overlay(&mut canvas, &resized, x as i64, y as i64);

    canvas
}
