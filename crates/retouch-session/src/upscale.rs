use anyhow::{Context, Result};
use image::imageops::FilterType;

use retouch_core::SourceImage;

/// Output geometry of an upscale towards a pixel-count target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpscalePlan {
    pub scale_factor: f64,
    pub width: u32,
    pub height: u32,
}

impl UpscalePlan {
    /// `sqrt(target / pixels)`, never below 1.
    pub fn new(width: u32, height: u32, target_pixels: u64) -> Self {
        let pixels = width as f64 * height as f64;
        let scale_factor = if pixels > 0.0 {
            (target_pixels as f64 / pixels).sqrt().max(1.0)
        } else {
            1.0
        };
        Self {
            scale_factor,
            width: scaled(width, scale_factor),
            height: scaled(height, scale_factor),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.scale_factor <= 1.0
    }
}

fn scaled(len: u32, factor: f64) -> u32 {
    ((len as f64 * factor).floor() as u32).max(len)
}

/// History label for an upscale to `target_pixels`, e.g. `Upscale (24MP)`.
pub fn label(target_pixels: u64) -> String {
    let mp = target_pixels as f64 / 1_000_000.0;
    if mp.fract() == 0.0 {
        format!("Upscale ({mp:.0}MP)")
    } else {
        format!("Upscale ({mp:.1}MP)")
    }
}

/// Lanczos resample to the planned size, re-encoded as PNG.
pub fn resample(source: &SourceImage, plan: UpscalePlan) -> Result<SourceImage> {
    let img = source.decode_dynamic().context("decode image for upscale")?;
    let resized = img.resize_exact(plan.width, plan.height, FilterType::Lanczos3);
    SourceImage::encode_dynamic(&resized)
}
