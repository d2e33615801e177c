//! Pipeline configuration.
//!
//! Frame dimensions are fixed for a session: the frame buffer is sized
//! once from [`CaptureConfig`] and frames of any other size are dropped.

use crate::colorize::PhaseMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for depth capture and colorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Smooth or banded colorization.
    pub phase_mode: PhaseMode,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 424,
            phase_mode: PhaseMode::Smooth,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        // Bitmap headers store dimensions as i32.
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Periodic recording policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Seconds between periodic captures.
    pub interval_secs: f64,
    /// Label prefix for on-demand captures.
    pub capture_label: String,
    /// Bits per pixel of written bitmaps (24 or 32).
    pub bits_per_pixel: u16,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3.0,
            capture_label: "depth".to_string(),
            bits_per_pixel: 24,
        }
    }
}

impl RecorderConfig {
    /// Validates the recording policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.interval_secs.is_finite() || self.interval_secs < 0.0 {
            return Err(ConfigError::InvalidInterval);
        }
        if !matches!(self.bits_per_pixel, 24 | 32) {
            return Err(ConfigError::InvalidBitDepth(self.bits_per_pixel));
        }
        if self.capture_label.is_empty() || self.capture_label.contains(['/', '\\']) {
            return Err(ConfigError::InvalidLabel(self.capture_label.clone()));
        }
        Ok(())
    }
}

/// Topography extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopographyConfig {
    /// Luminance cut points, drawn in this order.
    pub thresholds: Vec<u8>,
    /// Contour stroke width in pixels.
    pub stroke_width: u8,
    /// File extension of the overlay and topography map (`jpg` or `png`).
    pub artifact_extension: String,
    /// Also write the decoded color image and its grayscale conversion.
    pub save_intermediates: bool,
}

impl Default for TopographyConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![80, 100, 130, 140, 170],
            stroke_width: 2,
            artifact_extension: "jpg".to_string(),
            save_intermediates: true,
        }
    }
}

impl TopographyConfig {
    /// Validates the extraction settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thresholds.is_empty() {
            return Err(ConfigError::NoThresholds);
        }
        if self.stroke_width == 0 {
            return Err(ConfigError::InvalidStrokeWidth);
        }
        match self.artifact_extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" => Ok(()),
            _ => Err(ConfigError::UnsupportedExtension(
                self.artifact_extension.clone(),
            )),
        }
    }
}

/// Output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory holding `frames/` and `results/`.
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("depth-output"),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid capture interval (must be a non-negative number of seconds)")]
    InvalidInterval,
    #[error("unsupported bits per pixel {0} (must be 24 or 32)")]
    InvalidBitDepth(u16),
    #[error("invalid capture label {0:?}")]
    InvalidLabel(String),
    #[error("at least one threshold level is required")]
    NoThresholds,
    #[error("stroke width must be at least 1")]
    InvalidStrokeWidth,
    #[error("unsupported artifact extension {0:?}")]
    UnsupportedExtension(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub topography: TopographyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.recorder.validate()?;
        self.topography.validate()
    }
}
