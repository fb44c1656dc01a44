//! Texture atlas synthesis engine
//!
//! This module contains the core texture synthesis logic including:
//! - Foreground extraction and cell fitting
//! - Triangular drape and seam connector generation
//! - Atlas composition and PNG encoding

mod atlas;
mod cell;
mod connector;
mod drape;
mod extract;

pub use atlas::AtlasLayers;

use std::sync::Arc;
use std::time::Instant;

use image::{GrayImage, RgbaImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{AtlasGeometry, GeometryOverrides, RenderStyle};
use crate::matting::{BackgroundRemover, LumaKeyMatter, MattingError};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to decode input image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode texture atlas: {0}")]
    Encode(#[source] image::ImageError),

    #[error("background removal failed: {0}")]
    Matting(#[from] MattingError),

    #[error("processing error: {0}")]
    Processing(#[from] anyhow::Error),
}

/// Request for texture atlas synthesis
#[derive(Debug, Clone, Default)]
pub struct TextureRequest {
    pub style: RenderStyle,
    pub overrides: GeometryOverrides,
}

/// Result of texture atlas synthesis
pub struct EncodedAtlas {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Texture atlas synthesis pipeline.
///
/// One build request is a single deterministic pass over in-memory buffers:
/// two photos in, one encoded atlas out. No retries, no shared mutable
/// state; independent requests can run concurrently on separate workers.
pub struct TexturePipeline {
    matter: Arc<dyn BackgroundRemover>,
}

impl TexturePipeline {
    /// Create a pipeline with the default deterministic matting backend.
    pub fn new() -> Self {
        TexturePipeline {
            matter: Arc::new(LumaKeyMatter::new()),
        }
    }

    /// Create a pipeline with a custom background-removal backend.
    pub fn with_remover(matter: Arc<dyn BackgroundRemover>) -> Self {
        TexturePipeline { matter }
    }

    /// Build the texture atlas from two encoded photos.
    pub fn build_texture(
        &self,
        front: &[u8],
        back: &[u8],
        request: &TextureRequest,
    ) -> Result<EncodedAtlas, PipelineError> {
        let started = Instant::now();
        let geo = AtlasGeometry::new(&request.overrides);

        debug!(
            style = %request.style,
            canvas = geo.size,
            apex_x = geo.apex_x,
            apex_y = geo.apex_y,
            backend = self.matter.name(),
            "Starting texture build"
        );

        // 1. Extract and fit both panels. The sides are independent, so
        //    they run on separate workers.
        let (front_cell, back_cell) = rayon::join(
            || self.process_side(front, request.style, &geo),
            || self.process_side(back, request.style, &geo),
        );
        let front_cell = front_cell?;
        let back_cell = back_cell?;

        // 2. Drape bases from the fitted cells.
        let mut front_drape = drape::drape_base(&front_cell, geo.drape_blur);
        let mut back_drape = drape::drape_base(&back_cell, geo.drape_blur);

        // 3. Fade masks, each intruding overlap_px toward the seam side.
        let front_mask = drape::drape_mask(&geo, geo.front_drape, 0, geo.overlap_px);
        let back_mask = drape::drape_mask(&geo, geo.back_drape, geo.overlap_px, 0);
        apply_alpha_mask(&mut front_drape, &front_mask);
        apply_alpha_mask(&mut back_drape, &back_mask);

        // 4. Connector, sampled from the masked drapes it bridges.
        let connector = connector::seam_connector(&geo, request.style, &front_drape, &back_drape);

        // 5. Compose and encode.
        let canvas = atlas::compose(
            &geo,
            &AtlasLayers {
                front_cell: &front_cell,
                back_cell: &back_cell,
                front_drape: &front_drape,
                back_drape: &back_drape,
                connector: &connector,
            },
        );
        let rgb = atlas::flatten(&canvas);
        let bytes = atlas::encode_png(&rgb).map_err(PipelineError::Encode)?;

        info!(
            width = geo.size,
            height = geo.size,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Texture build complete"
        );

        Ok(EncodedAtlas {
            width: geo.size,
            height: geo.size,
            bytes,
        })
    }

    /// One side of the garment: photo bytes to a fitted panel cell.
    fn process_side(
        &self,
        bytes: &[u8],
        style: RenderStyle,
        geo: &AtlasGeometry,
    ) -> Result<RgbaImage, PipelineError> {
        let cutout = extract::extract_subject(bytes, style, self.matter.as_ref())?;
        Ok(cell::fit_cell(&cutout, geo.cell_w, geo.cell_h))
    }
}

impl Default for TexturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace an image's alpha channel with a mask of the same dimensions.
pub(crate) fn apply_alpha_mask(image: &mut RgbaImage, mask: &GrayImage) {
    debug_assert_eq!(image.dimensions(), mask.dimensions());
    for (pixel, m) in image.pixels_mut().zip(mask.pixels()) {
        pixel.0[3] = m.0[0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(image: RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn solid_photo(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
        png_bytes(RgbaImage::from_pixel(w, h, Rgba(color)))
    }

    #[test]
    fn test_build_texture_end_to_end() {
        let front = solid_photo(500, 500, [90, 60, 200, 255]);
        let back = solid_photo(500, 500, [40, 160, 80, 255]);
        let pipeline = TexturePipeline::new();

        let atlas = pipeline
            .build_texture(&front, &back, &TextureRequest::default())
            .unwrap();
        assert_eq!((atlas.width, atlas.height), (1024, 1024));

        let out = image::load_from_memory(&atlas.bytes).unwrap();
        // flattened to opaque RGB
        assert!(!out.color().has_alpha());
        let rgb = out.to_rgb8();
        assert_eq!(rgb.dimensions(), (1024, 1024));

        // all four cell regions carry non-background pixels
        let geo = AtlasGeometry::new(&GeometryOverrides::default());
        let cx = geo.cell_w / 2;
        let front_panel = rgb.get_pixel(geo.front_panel.x + cx, geo.front_panel.y + cx);
        let back_panel = rgb.get_pixel(geo.back_panel.x + cx, geo.back_panel.y + cx);
        assert!(front_panel.0[2] > 100, "front panel should be blue-ish");
        assert!(back_panel.0[1] > 60, "back panel should be green-ish");

        // drape regions: probe inside the fade triangles, midway down
        let front_drape = rgb.get_pixel(460, 760);
        let back_drape = rgb.get_pixel(590, 760);
        assert!(front_drape.0.iter().map(|&c| c as u32).sum::<u32>() > 30);
        assert!(back_drape.0.iter().map(|&c| c as u32).sum::<u32>() > 30);

        // padding gaps stay background
        assert_eq!(rgb.get_pixel(5, 5).0, [0, 0, 0]);
    }

    #[test]
    fn test_build_texture_is_deterministic() {
        let front = solid_photo(300, 400, [90, 60, 200, 255]);
        let back = solid_photo(400, 300, [40, 160, 80, 255]);
        let pipeline = TexturePipeline::new();
        let request = TextureRequest::default();

        let first = pipeline.build_texture(&front, &back, &request).unwrap();
        let second = pipeline.build_texture(&front, &back, &request).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_silhouette_subject_has_no_chroma() {
        let front = solid_photo(500, 500, [90, 60, 200, 255]);
        let back = solid_photo(500, 500, [200, 90, 60, 255]);
        let pipeline = TexturePipeline::new();
        let request = TextureRequest {
            style: RenderStyle::Silhouette,
            ..TextureRequest::default()
        };

        let atlas = pipeline.build_texture(&front, &back, &request).unwrap();
        let rgb = image::load_from_memory(&atlas.bytes).unwrap().to_rgb8();

        let geo = AtlasGeometry::new(&GeometryOverrides::default());
        let center = rgb.get_pixel(geo.front_panel.x + geo.cell_w / 2, geo.front_panel.y + geo.cell_h / 2);
        assert_eq!(center.0, [255, 255, 255]);
        // every pixel is gray-scale: no channel variance anywhere
        for p in rgb.pixels() {
            assert!(p.0[0] == p.0[1] && p.0[1] == p.0[2]);
        }
    }

    #[test]
    fn test_fully_transparent_front_does_not_error() {
        let front = solid_photo(100, 100, [80, 80, 80, 0]);
        let back = solid_photo(500, 500, [40, 160, 80, 255]);
        let pipeline = TexturePipeline::new();

        let atlas = pipeline
            .build_texture(&front, &back, &TextureRequest::default())
            .unwrap();
        assert_eq!((atlas.width, atlas.height), (1024, 1024));

        let rgb = image::load_from_memory(&atlas.bytes).unwrap().to_rgb8();
        let geo = AtlasGeometry::new(&GeometryOverrides::default());
        // front cell region left at background
        let center = rgb.get_pixel(geo.front_panel.x + geo.cell_w / 2, geo.front_panel.y + geo.cell_h / 2);
        assert_eq!(center.0, [0, 0, 0]);
    }

    #[test]
    fn test_corrupt_front_image_is_fatal() {
        let back = solid_photo(100, 100, [40, 160, 80, 255]);
        let pipeline = TexturePipeline::new();
        let err = pipeline.build_texture(b"garbage", &back, &TextureRequest::default());
        assert!(matches!(err, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn test_geometry_overrides_flow_through() {
        let front = solid_photo(200, 200, [90, 60, 200, 255]);
        let back = solid_photo(200, 200, [40, 160, 80, 255]);
        let pipeline = TexturePipeline::new();

        let defaults = pipeline
            .build_texture(&front, &back, &TextureRequest::default())
            .unwrap();
        let nudged = pipeline
            .build_texture(
                &front,
                &back,
                &TextureRequest {
                    style: RenderStyle::Preserve,
                    overrides: GeometryOverrides {
                        apex_y_ratio: 0.80,
                        ..GeometryOverrides::default()
                    },
                },
            )
            .unwrap();
        assert_ne!(defaults.bytes, nudged.bytes);
    }
}
