use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BlendError, Result};
use crate::io::image_io::OutputFormat;
use crate::shutter::ShutterWindow;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionBlendConfig {
    #[serde(default)]
    pub blend: BlendConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MotionBlendConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| BlendError::InvalidConfig(e.to_string()))?;
        config.blend.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BlendError::InvalidConfig(e.to_string()))
    }
}

/// Construction-time blending parameters; immutable once a blender is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlendConfig {
    /// Sub-frames per output frame.
    #[serde(default = "default_blend_rate")]
    pub blend_rate: u32,
    /// Degrees of each group's interval during which sub-frames are kept (1..=360).
    #[serde(default = "default_shutter_angle")]
    pub shutter_angle: u32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            blend_rate: default_blend_rate(),
            shutter_angle: default_shutter_angle(),
        }
    }
}

impl BlendConfig {
    pub fn window(&self) -> Result<ShutterWindow> {
        ShutterWindow::new(self.blend_rate, self.shutter_angle)
    }

    pub fn validate(&self) -> Result<()> {
        self.window().map(|_| ())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl OutputConfig {
    /// `<directory>/<prefix><index, 6 digits>.<ext>`
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.directory.join(format!(
            "{}{:06}.{}",
            self.file_prefix,
            index,
            self.format.extension()
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_blend_rate() -> u32 {
    8
}

fn default_shutter_angle() -> u32 {
    180
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("blended")
}

fn default_file_prefix() -> String {
    "frame".into()
}

fn default_log_level() -> String {
    "warn".into()
}
