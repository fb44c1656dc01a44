//! Atlas-Weave
//!
//! Garment texture atlas synthesis: given front and back photos of a
//! garment, produce one square UV-ready texture atlas — front panel, back
//! panel, two triangular drape regions converging to a shared apex, and a
//! seam connector bridging the gap between them.
//!
//! ```no_run
//! use atlas_weave::{TexturePipeline, TextureRequest};
//!
//! # fn run(front: &[u8], back: &[u8]) -> Result<(), atlas_weave::PipelineError> {
//! let pipeline = TexturePipeline::new();
//! let atlas = pipeline.build_texture(front, back, &TextureRequest::default())?;
//! std::fs::write("texture.png", &atlas.bytes).unwrap();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod engine;
pub mod matting;

pub use domain::{AtlasGeometry, GeometryOverrides, RenderStyle};
pub use engine::{EncodedAtlas, PipelineError, TexturePipeline, TextureRequest};
pub use matting::{BackgroundRemover, LumaKeyMatter, MattingError};
