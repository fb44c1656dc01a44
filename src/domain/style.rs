//! Rendering style selector

use serde::{Deserialize, Serialize};

/// How the extracted garment is rendered into the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RenderStyle {
    /// Keep the original colors and printed pattern from the source photo.
    Preserve,
    /// Render the extracted subject as a flat white mask, discarding color.
    Silhouette,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle::Preserve
    }
}

impl std::fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderStyle::Preserve => write!(f, "preserve"),
            RenderStyle::Silhouette => write!(f, "silhouette"),
        }
    }
}
