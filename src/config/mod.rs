//! Configuration module for the atlas builder

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::{GeometryOverrides, RenderStyle};

/// Main application settings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub geometry: GeometryOverrides,
}

/// Pipeline defaults
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PipelineSettings {
    #[serde(default)]
    pub style: RenderStyle,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("texture.png")
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            path: default_output_path(),
        }
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with ATLAS_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("ATLAS")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.pipeline.style, RenderStyle::Preserve);
        assert_eq!(settings.output.path, PathBuf::from("texture.png"));
        assert_eq!(settings.geometry.overlap_px, 10);
    }
}
