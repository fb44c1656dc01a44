//! Luminance-keyed background removal
//!
//! Edge-aware heuristic for photos shot on white or light backdrops: high
//! luminance combined with low channel variance is keyed out, with a
//! feathered transition zone so subject edges stay smooth.

use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{BackgroundRemover, MattingError};

/// Pure white detection threshold.
const WHITE_THRESHOLD: u8 = 245;
/// Light color detection threshold.
const LIGHT_THRESHOLD: u8 = 230;
/// Feather range below `LIGHT_THRESHOLD` for smooth edges.
const EDGE_FEATHER: u8 = 25;

/// Deterministic luminance/variance keyer. Stateless, so identical inputs
/// always produce identical masks.
#[derive(Debug, Default, Clone, Copy)]
pub struct LumaKeyMatter;

impl LumaKeyMatter {
    pub fn new() -> Self {
        LumaKeyMatter
    }

    fn keyed_alpha(r: u8, g: u8, b: u8) -> u8 {
        // Human-eye weighted luminance
        let luminance = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) as u8;

        // White has low variance between channels
        let max_channel = r.max(g).max(b);
        let min_channel = r.min(g).min(b);
        let variance = max_channel - min_channel;

        if luminance >= WHITE_THRESHOLD && variance <= 15 {
            // Pure white - fully transparent
            0
        } else if luminance >= LIGHT_THRESHOLD && variance <= 25 {
            // Light gray/off-white - gradual transparency based on how white
            ((255 - luminance) as f32 / (255 - LIGHT_THRESHOLD) as f32 * 255.0).min(255.0) as u8
        } else if luminance >= LIGHT_THRESHOLD - EDGE_FEATHER && variance <= 35 {
            // Edge feathering zone
            ((LIGHT_THRESHOLD - luminance.saturating_sub(EDGE_FEATHER)) as f32
                / EDGE_FEATHER as f32
                * 255.0)
                .min(255.0) as u8
        } else {
            255
        }
    }
}

impl BackgroundRemover for LumaKeyMatter {
    fn name(&self) -> &'static str {
        "luma-key"
    }

    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage, MattingError> {
        let (width, height) = image.dimensions();
        let mut output = RgbaImage::new(width, height);

        for (src, dst) in image.pixels().zip(output.pixels_mut()) {
            let Rgba([r, g, b, a]) = *src;
            // Pixels already transparent in the input stay excluded.
            let alpha = Self::keyed_alpha(r, g, b).min(a);
            *dst = Rgba([r, g, b, alpha]);
        }

        debug!(width = width, height = height, "Keyed background from photo");
        Ok(output)
    }
}
