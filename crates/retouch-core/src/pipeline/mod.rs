pub mod module;
pub mod modules;
pub mod stage;
pub mod uniform;

use anyhow::Result;
use tracing::debug;

use crate::adjust::AdjustmentState;
use crate::image_buf::ImageBuf;
pub use stage::{RenderPlan, RenderStage, StageGroup, temperature_weights};

/// Default seed for the grain texture.
pub const DEFAULT_GRAIN_SEED: u32 = 0x5eed_1e55;

/// CPU renderer for adjustment plans.
///
/// ```text
/// Source -> Tone (brightness, contrast, saturate, sepia, hue, blur)
///        -> Channel (RGB scale, gamma)
///        -> Overlay (vignette, grain, split tones) -> Display
/// ```
///
/// Rendering is pure: the same image, state and seed always produce the same
/// pixels, so it can be re-run on every slider change.
pub struct Pipeline {
    grain_seed: u32,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_grain_seed(DEFAULT_GRAIN_SEED)
    }

    pub fn with_grain_seed(grain_seed: u32) -> Self {
        Self { grain_seed }
    }

    pub fn plan(&self, state: &AdjustmentState) -> RenderPlan {
        RenderPlan::from_state(state, self.grain_seed)
    }

    /// Render `state` against a borrowed source buffer.
    pub fn render(&self, input: &ImageBuf, state: &AdjustmentState) -> Result<ImageBuf> {
        self.process_cpu(input.clone(), &self.plan(state))
    }

    /// Run every stage of `plan` in order.
    pub fn process_cpu(&self, input: ImageBuf, plan: &RenderPlan) -> Result<ImageBuf> {
        let mut current = input;
        for stage in plan.iter() {
            debug!(stage = stage.name(), "processing");
            current = stage.module().process_cpu(current)?;
        }
        Ok(current)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::{AdjustmentDelta, Param};

    fn gradient(w: u32, h: u32) -> ImageBuf {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                data.push(x as f32 / w as f32);
                data.push(y as f32 / h as f32);
                data.push(0.5);
            }
        }
        ImageBuf::from_data(w, h, data).unwrap()
    }

    fn busy_state() -> AdjustmentState {
        AdjustmentState::from_delta(
            &AdjustmentDelta::new()
                .with(Param::Exposure, 110.0)
                .with(Param::Contrast, 115.0)
                .with(Param::Warmth, 25.0)
                .with(Param::Tint, -12.0)
                .with(Param::Blur, 1.0)
                .with(Param::Sharpen, 30.0)
                .with(Param::Gamma, 1.3)
                .with(Param::Vignette, 40.0)
                .with(Param::Grain, 20.0)
                .with(Param::HighlightsHue, 40.0)
                .with(Param::HighlightsSat, 50.0)
                .with(Param::ShadowsHue, 210.0)
                .with(Param::ShadowsSat, 40.0),
        )
    }

    #[test]
    fn default_params_are_identity() {
        let pipeline = Pipeline::new();
        let input = gradient(6, 4);
        let output = pipeline.render(&input, &AdjustmentState::default()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn render_is_deterministic() {
        let pipeline = Pipeline::new();
        let input = gradient(16, 12);
        let state = busy_state();
        let a = pipeline.render(&input, &state).unwrap();
        let b = pipeline.render(&input, &state).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, input);
    }

    #[test]
    fn render_does_not_touch_source() {
        let pipeline = Pipeline::new();
        let input = gradient(8, 8);
        let before = input.clone();
        pipeline.render(&input, &busy_state()).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn output_stays_in_unit_range_and_keeps_dimensions() {
        let pipeline = Pipeline::new();
        let input = gradient(20, 10);
        let mut state = busy_state();
        state.set(Param::Exposure, 150.0);
        state.set(Param::Saturation, 200.0);
        let out = pipeline.render(&input, &state).unwrap();
        assert_eq!((out.width, out.height), (20, 10));
        assert!(out.data.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn exposure_brightens() {
        let pipeline = Pipeline::new();
        let input = ImageBuf::from_data(1, 1, vec![0.4, 0.4, 0.4]).unwrap();
        let state = AdjustmentState::from_delta(&AdjustmentDelta::new().with(Param::Exposure, 125.0));
        let out = pipeline.render(&input, &state).unwrap();
        assert!((out.data[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn grain_seed_changes_output() {
        let input = gradient(8, 8);
        let state = AdjustmentState::from_delta(&AdjustmentDelta::new().with(Param::Grain, 60.0));
        let a = Pipeline::with_grain_seed(1).render(&input, &state).unwrap();
        let b = Pipeline::with_grain_seed(2).render(&input, &state).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn external_plan_renders_like_state() {
        let pipeline = Pipeline::new();
        let input = gradient(8, 8);
        let state = busy_state();
        let json = serde_json::to_string(&pipeline.plan(&state)).unwrap();
        let plan: RenderPlan = serde_json::from_str(&json).unwrap();
        let via_plan = pipeline.process_cpu(input.clone(), &plan).unwrap();
        assert_eq!(via_plan, pipeline.render(&input, &state).unwrap());
    }
}
