use crate::constants::DEFAULT_EXPORT_SCALE;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fill color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RgbColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbColor {
    pub const GRAY: RgbColor = RgbColor {
        r: 0.5,
        g: 0.5,
        b: 0.5,
    };

    fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

/// Appearance of the text stamped by the watermark tool
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WatermarkOptions {
    pub font_size: f32,
    pub opacity: f32,
    /// Counter-clockwise, in degrees
    pub rotation: f32,
    pub color: RgbColor,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            font_size: 50.0,
            opacity: 0.3,
            rotation: -45.0,
            color: RgbColor::GRAY,
        }
    }
}

impl WatermarkOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.font_size > 0.0) {
            return Err(OpsError::Config(
                "Watermark font size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(OpsError::Config(
                "Watermark opacity must be between 0 and 1".to_string(),
            ));
        }
        if !self.color.is_valid() {
            return Err(OpsError::Config(
                "Watermark color components must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How hard the compress tool works on a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CompressionLevel {
    /// Rewrite the file as-is
    Low,
    /// Drop unreachable objects and deflate streams
    #[default]
    Medium,
    /// Medium, plus renumbering and removal of editor-only data
    High,
}

impl std::fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CompressionLevel::Low => "low",
            CompressionLevel::Medium => "medium",
            CompressionLevel::High => "high",
        };
        f.write_str(name)
    }
}

/// Raster format for page export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

/// Settings for the PDF -> images tool
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImageExportOptions {
    pub format: ImageFormat,
    pub scale: f32,
}

impl Default for ImageExportOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            scale: DEFAULT_EXPORT_SCALE,
        }
    }
}

impl ImageExportOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0 && self.scale <= 10.0) {
            return Err(OpsError::Config(format!(
                "Export scale {} must be in (0, 10]",
                self.scale
            )));
        }
        Ok(())
    }
}
