//! Fixed-size GPU records for a [`RenderPlan`].
//!
//! Each stage packs into one 32-byte `StageUniform` so a shader can walk the
//! plan as a storage buffer array:
//!
//! ```text
//! struct Stage { kind: u32, flags: u32, pad: vec2<u32>, params: vec4<f32> }
//! ```

use bytemuck::{Pod, Zeroable};

use crate::pipeline::modules::{BlendMode, TonalRange};
use crate::pipeline::stage::{RenderPlan, RenderStage};

pub const KIND_BRIGHTNESS: u32 = 1;
pub const KIND_CONTRAST: u32 = 2;
pub const KIND_HIGHLIGHTS_SHADOWS: u32 = 3;
pub const KIND_SATURATE: u32 = 4;
pub const KIND_VIBRANCE: u32 = 5;
pub const KIND_SEPIA: u32 = 6;
pub const KIND_HUE_ROTATE: u32 = 7;
pub const KIND_BLUR: u32 = 8;
pub const KIND_SHARPEN: u32 = 9;
pub const KIND_CHANNEL_SCALE: u32 = 10;
pub const KIND_GAMMA: u32 = 11;
pub const KIND_VIGNETTE: u32 = 12;
pub const KIND_GRAIN: u32 = 13;
pub const KIND_SPLIT_TONE: u32 = 14;

/// Split-tone flag bits.
pub const FLAG_SHADOWS: u32 = 1 << 0;
pub const FLAG_SOFT_LIGHT: u32 = 1 << 1;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct StageUniform {
    pub kind: u32,
    /// Grain seed, or split-tone flag bits.
    pub flags: u32,
    pub _pad: [u32; 2],
    pub params: [f32; 4],
}

impl StageUniform {
    fn new(kind: u32, flags: u32, params: [f32; 4]) -> Self {
        Self {
            kind,
            flags,
            _pad: [0; 2],
            params,
        }
    }
}

impl From<&RenderStage> for StageUniform {
    fn from(stage: &RenderStage) -> Self {
        match stage {
            RenderStage::Brightness(s) => Self::new(KIND_BRIGHTNESS, 0, [s.amount, 0.0, 0.0, 0.0]),
            RenderStage::Contrast(s) => Self::new(KIND_CONTRAST, 0, [s.amount, 0.0, 0.0, 0.0]),
            RenderStage::HighlightsShadows(s) => Self::new(
                KIND_HIGHLIGHTS_SHADOWS,
                0,
                [s.highlights, s.shadows, 0.0, 0.0],
            ),
            RenderStage::Saturate(s) => Self::new(KIND_SATURATE, 0, [s.amount, 0.0, 0.0, 0.0]),
            RenderStage::Vibrance(s) => Self::new(KIND_VIBRANCE, 0, [s.amount, 0.0, 0.0, 0.0]),
            RenderStage::Sepia(s) => Self::new(KIND_SEPIA, 0, [s.amount, 0.0, 0.0, 0.0]),
            RenderStage::HueRotate(s) => Self::new(KIND_HUE_ROTATE, 0, [s.degrees, 0.0, 0.0, 0.0]),
            RenderStage::Blur(s) => Self::new(KIND_BLUR, 0, [s.radius, 0.0, 0.0, 0.0]),
            RenderStage::Sharpen(s) => Self::new(KIND_SHARPEN, 0, [s.amount, 0.0, 0.0, 0.0]),
            RenderStage::ChannelScale(s) => {
                Self::new(KIND_CHANNEL_SCALE, 0, [s.red, s.green, s.blue, 0.0])
            }
            RenderStage::Gamma(s) => Self::new(KIND_GAMMA, 0, [s.exponent, 0.0, 0.0, 0.0]),
            RenderStage::Vignette(s) => Self::new(KIND_VIGNETTE, 0, [s.strength, 0.0, 0.0, 0.0]),
            RenderStage::Grain(s) => Self::new(KIND_GRAIN, s.seed, [s.opacity, 0.0, 0.0, 0.0]),
            RenderStage::SplitTone(s) => {
                let mut flags = 0;
                if s.range == TonalRange::Shadows {
                    flags |= FLAG_SHADOWS;
                }
                if s.blend == BlendMode::SoftLight {
                    flags |= FLAG_SOFT_LIGHT;
                }
                Self::new(KIND_SPLIT_TONE, flags, [s.hue, s.opacity, 0.0, 0.0])
            }
        }
    }
}

pub fn pack(plan: &RenderPlan) -> Vec<StageUniform> {
    plan.iter().map(StageUniform::from).collect()
}

/// Raw bytes ready for a buffer upload.
pub fn as_bytes(records: &[StageUniform]) -> &[u8] {
    bytemuck::cast_slice(records)
}
