use std::path::{Path, PathBuf};
use std::time::Duration;

use pdf_ops::{
    CompressionLevel, ImageExportOptions, OpsError, Result, WatermarkOptions,
};
use serde::{Deserialize, Serialize};

/// User settings shared by the front ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Preview scale for the extract tool's large page cards
    pub extract_thumbnail_scale: f32,
    /// Preview scale for the remove tool's compact grid
    pub remove_thumbnail_scale: f32,
    pub watermark_text: String,
    pub watermark: WatermarkOptions,
    pub compression: CompressionLevel,
    pub image_export: ImageExportOptions,
    pub rotation_degrees: i32,
    pub toast_duration_secs: u64,
    /// Where outputs go; `None` means next to the input
    pub output_dir: Option<PathBuf>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            extract_thumbnail_scale: 1.0,
            remove_thumbnail_scale: 0.5,
            watermark_text: "CONFIDENTIAL".to_string(),
            watermark: WatermarkOptions::default(),
            compression: CompressionLevel::default(),
            image_export: ImageExportOptions::default(),
            rotation_degrees: 90,
            toast_duration_secs: 5,
            output_dir: None,
        }
    }
}

impl ToolkitConfig {
    /// Load config from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| OpsError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| OpsError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, scale) in [
            ("extract_thumbnail_scale", self.extract_thumbnail_scale),
            ("remove_thumbnail_scale", self.remove_thumbnail_scale),
        ] {
            if !(scale > 0.0 && scale <= 4.0) {
                return Err(OpsError::Config(format!(
                    "{name} must be in (0, 4], got {scale}"
                )));
            }
        }
        if self.rotation_degrees % 90 != 0 {
            return Err(OpsError::Config(format!(
                "rotation_degrees must be a multiple of 90, got {}",
                self.rotation_degrees
            )));
        }
        self.watermark.validate()?;
        self.image_export.validate()?;
        Ok(())
    }

    pub fn thumbnail_scale(&self, tool: pdf_pages::ToolKind) -> f32 {
        match tool {
            pdf_pages::ToolKind::ExtractPages => self.extract_thumbnail_scale,
            pdf_pages::ToolKind::RemovePages => self.remove_thumbnail_scale,
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }

    /// Output directory for a given input file
    pub fn output_dir_for(&self, input: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
