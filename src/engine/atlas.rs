//! Atlas composition and encoding
//!
//! Fixed layout, deterministic paint order: front cell, back cell, front
//! drape, back drape, then the seam connector on top. The finished canvas
//! is flattened to opaque RGB and encoded as lossless PNG.

use image::codecs::png::PngEncoder;
use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};

use crate::domain::AtlasGeometry;

/// Canvas background (opaque black).
const CANVAS_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Layers composited onto the atlas, already masked where applicable.
pub struct AtlasLayers<'a> {
    pub front_cell: &'a RgbaImage,
    pub back_cell: &'a RgbaImage,
    pub front_drape: &'a RgbaImage,
    pub back_drape: &'a RgbaImage,
    pub connector: &'a RgbaImage,
}

/// Alpha-composite all layers onto an opaque canvas in paint order.
///
/// The connector must land last so it visually bridges the seam instead of
/// being overwritten by the drapes.
pub fn compose(geo: &AtlasGeometry, layers: &AtlasLayers<'_>) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(geo.size, geo.size, CANVAS_BACKGROUND);

    imageops::overlay(
        &mut canvas,
        layers.front_cell,
        geo.front_panel.x as i64,
        geo.front_panel.y as i64,
    );
    imageops::overlay(
        &mut canvas,
        layers.back_cell,
        geo.back_panel.x as i64,
        geo.back_panel.y as i64,
    );
    imageops::overlay(
        &mut canvas,
        layers.front_drape,
        geo.front_drape.x as i64,
        geo.front_drape.y as i64,
    );
    imageops::overlay(
        &mut canvas,
        layers.back_drape,
        geo.back_drape.x as i64,
        geo.back_drape.y as i64,
    );
    imageops::overlay(&mut canvas, layers.connector, 0, 0);

    canvas
}

/// Drop the alpha channel. The canvas background is opaque and every layer
/// was composited over it, so no information is lost.
pub fn flatten(canvas: &RgbaImage) -> RgbImage {
    let (w, h) = canvas.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let Rgba([r, g, b, _]) = *canvas.get_pixel(x, y);
        Rgb([r, g, b])
    })
}

/// Encode to lossless PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new(&mut buffer);
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgb8,
    )?;
    Ok(buffer)
}
