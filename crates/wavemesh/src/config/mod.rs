//! Configuration system
//!
//! File-backed configuration for the document pipeline, loadable from TOML
//! or RON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::assets::WriteMode;
use crate::render::BatchOptions;

/// Configuration trait: serde-backed load/save keyed on file extension.
pub trait Config: Serialize + DeserializeOwned + Default {
    /// Load configuration from a `.toml` or `.ron` file.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to a `.toml` or `.ron` file.
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Texture-coordinate generation to apply after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TexGenMode {
    /// Keep the document's texture coordinates
    #[default]
    None,
    /// Planar projection over the bounding box
    Linear,
    /// Spherical projection of the normals
    Spherical,
}

/// Pipeline settings for loading, transforming, and re-emitting a mesh.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Uniform scale applied after loading
    pub scale: Option<f32>,

    /// Center on the origin and normalize the largest extent to 2
    pub unitize: bool,

    /// Flip triangle winding and negate normals
    pub reverse_winding: bool,

    /// Texture-coordinate generation mode
    pub texgen: TexGenMode,

    /// Emit material state blocks when compiling batches
    pub batch_materials: bool,

    /// Emit texture binds when compiling batches
    pub batch_textures: bool,

    /// Write texture coordinates when re-emitting the document
    pub write_texcoords: bool,

    /// Write material references when re-emitting the document
    pub write_materials: bool,
}

impl Config for PipelineConfig {}

impl PipelineConfig {
    /// Batch-compiler options implied by this configuration.
    pub fn batch_options(&self) -> BatchOptions {
        let mut options = BatchOptions::empty();
        if self.batch_materials {
            options |= BatchOptions::MATERIALS;
        }
        if self.batch_textures {
            options |= BatchOptions::TEXTURES;
        }
        options
    }

    /// Writer mode implied by this configuration.
    pub fn write_mode(&self) -> WriteMode {
        let mut mode = WriteMode::empty();
        if self.write_texcoords {
            mode |= WriteMode::TEXCOORDS;
        }
        if self.write_materials {
            mode |= WriteMode::MATERIALS;
        }
        mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let mut config = PipelineConfig::default();
        config.unitize = true;
        config.texgen = TexGenMode::Spherical;
        config.batch_materials = true;

        let text = toml::to_string_pretty(&config).unwrap();
        let back: PipelineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PipelineConfig = toml::from_str("unitize = true\n").unwrap();
        assert!(config.unitize);
        assert_eq!(config.texgen, TexGenMode::None);
        assert_eq!(config.scale, None);
    }

    #[test]
    fn test_flag_mapping() {
        let config: PipelineConfig =
            toml::from_str("batch_materials = true\nwrite_texcoords = true\n").unwrap();
        assert_eq!(config.batch_options(), BatchOptions::MATERIALS);
        assert_eq!(config.write_mode(), WriteMode::TEXCOORDS);
    }
}
