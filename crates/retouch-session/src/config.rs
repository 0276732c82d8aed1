//! Session configuration.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to override. Loaded values are sanitized; anything nonsensical falls back
//! to its default and is reported as a warning.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use retouch_core::pipeline::DEFAULT_GRAIN_SEED;

pub const DEFAULT_UPSCALE_TARGET_PIXELS: u64 = 24_000_000;
pub const DEFAULT_BRUSH_SIZE: f32 = 40.0;
pub const DEFAULT_PREVIEW_MAX_EDGE: u32 = 2048;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pixel count an upscale aims for.
    pub upscale_target_pixels: u64,
    /// Initial mask brush diameter in display pixels.
    pub brush_size: f32,
    /// Longest edge of preview renders and of the mask surface.
    pub preview_max_edge: u32,
    pub grain_seed: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            upscale_target_pixels: DEFAULT_UPSCALE_TARGET_PIXELS,
            brush_size: DEFAULT_BRUSH_SIZE,
            preview_max_edge: DEFAULT_PREVIEW_MAX_EDGE,
            grain_seed: DEFAULT_GRAIN_SEED,
        }
    }
}

impl SessionConfig {
    /// Replace invalid values with defaults, returning one warning per fix.
    pub fn sanitize(&mut self) -> Vec<String> {
        let defaults = Self::default();
        let mut warnings = Vec::new();

        if self.upscale_target_pixels == 0 {
            warnings.push(format!(
                "upscale_target_pixels must be positive, using {}",
                defaults.upscale_target_pixels
            ));
            self.upscale_target_pixels = defaults.upscale_target_pixels;
        }
        if !self.brush_size.is_finite() || self.brush_size <= 0.0 {
            warnings.push(format!(
                "brush_size {} is invalid, using {}",
                self.brush_size, defaults.brush_size
            ));
            self.brush_size = defaults.brush_size;
        }
        if self.preview_max_edge == 0 {
            warnings.push(format!(
                "preview_max_edge must be positive, using {}",
                defaults.preview_max_edge
            ));
            self.preview_max_edge = defaults.preview_max_edge;
        }
        warnings
    }

    pub fn from_json(json: &str) -> Result<ConfigHandle> {
        let mut config: Self = serde_json::from_str(json).context("parse session config")?;
        let warnings = config.sanitize();
        Ok(ConfigHandle {
            config,
            source: None,
            warnings,
        })
    }

    pub fn load(path: &Path) -> Result<ConfigHandle> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let mut handle =
            Self::from_json(&contents).with_context(|| format!("load {}", path.display()))?;
        handle.source = Some(path.to_path_buf());
        Ok(handle)
    }
}

/// Loaded configuration with where it came from and what was fixed up.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    pub config: SessionConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_defaults() {
        let handle = SessionConfig::from_json("{}").unwrap();
        assert_eq!(handle.config, SessionConfig::default());
        assert!(handle.warnings.is_empty());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let handle = SessionConfig::from_json(r#"{"upscale_target_pixels": 8000000}"#).unwrap();
        assert_eq!(handle.config.upscale_target_pixels, 8_000_000);
        assert_eq!(handle.config.preview_max_edge, DEFAULT_PREVIEW_MAX_EDGE);
    }

    #[test]
    fn invalid_values_are_reset_with_warnings() {
        let handle = SessionConfig::from_json(
            r#"{"upscale_target_pixels": 0, "brush_size": -3.0, "preview_max_edge": 0}"#,
        )
        .unwrap();
        assert_eq!(handle.config, SessionConfig::default());
        assert_eq!(handle.warnings.len(), 3);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SessionConfig::from_json("{not json").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SessionConfig::load(Path::new("/nonexistent/retouch.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/retouch.json"));
    }
}
