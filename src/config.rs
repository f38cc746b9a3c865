//! Application configuration
//!
//! Loaded from a TOML file. Every section and field has a default that
//! reproduces the stock classroom, so an empty file (or no file at all) is a
//! valid configuration.
//!
//! ```toml
//! [window]
//! use_monitor_resolution = false
//! width = 1280
//! height = 720
//!
//! [assets]
//! texture_dir = "resources/textures/class"
//! missing_texture = "abort"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top level configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Size the window to the primary monitor instead of `width`/`height`
    pub use_monitor_resolution: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Classroom Scene".to_string(),
            width: 800,
            height: 600,
            use_monitor_resolution: true,
            vsync: true,
        }
    }
}

/// Initial free-fly camera state. Angles are in degrees.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the material textures
    pub texture_dir: PathBuf,
    pub missing_texture: MissingTexturePolicy,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("resources/textures/class"),
            missing_texture: MissingTexturePolicy::default(),
        }
    }
}

/// What to do when a texture file cannot be read or decoded
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingTexturePolicy {
    /// Fail startup with the load error
    Abort,
    /// Warn and substitute a placeholder texture
    #[default]
    Placeholder,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.position, [0.0, 0.0, 3.0]);
        assert_eq!(config.camera.yaw, -90.0);
        assert_eq!(config.assets.missing_texture, MissingTexturePolicy::Placeholder);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [window]
            use_monitor_resolution = false
            width = 1280

            [camera]
            speed = 5.0

            [assets]
            missing_texture = "abort"
            "#,
        )
        .unwrap();

        assert!(!config.window.use_monitor_resolution);
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.speed, 5.0);
        assert_eq!(config.camera.zoom, 45.0);
        assert_eq!(config.assets.missing_texture, MissingTexturePolicy::Abort);
        assert_eq!(
            config.assets.texture_dir,
            PathBuf::from("resources/textures/class")
        );
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = AppConfig::from_toml_str("[assets]\nmissing_texture = \"ignore\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load_from_file("does/not/exist/classroom.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
