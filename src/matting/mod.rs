//! Background removal providers
//!
//! The pipeline only requires a "RGBA in, alpha-bearing RGBA out" capability;
//! any salient-subject segmentation backend satisfies the contract. The
//! default [`LumaKeyMatter`] is a deterministic heuristic suitable for studio
//! photos on light backdrops; model-backed removers plug in through the same
//! trait.

mod luma_key;

pub use luma_key::LumaKeyMatter;

use image::RgbaImage;
use thiserror::Error;

/// Matting error types
#[derive(Debug, Error)]
pub enum MattingError {
    #[error("matting backend failed: {0}")]
    Backend(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A background-removal capability.
///
/// Implementations must be deterministic for identical inputs: the pipeline
/// guarantees byte-identical output for identical requests, and a seeded or
/// stateless remover is part of that contract.
pub trait BackgroundRemover: Send + Sync {
    /// Short backend name for logging.
    fn name(&self) -> &'static str;

    /// Produce a copy of `image` whose alpha channel marks the foreground
    /// subject (255 = subject, 0 = background).
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage, MattingError>;
}
