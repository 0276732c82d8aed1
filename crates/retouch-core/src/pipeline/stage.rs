use serde::{Deserialize, Serialize};

use crate::adjust::{AdjustmentState, Param};
use crate::pipeline::module::ProcessingModule;
use crate::pipeline::modules::{
    BlendMode, Blur, Brightness, ChannelScale, Contrast, Gamma, Grain, HighlightsShadows,
    HueRotate, Saturate, Sepia, Sharpen, SplitTone, TonalRange, Vibrance, Vignette,
};

/// The three composition groups, applied in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageGroup {
    Tone,
    Channel,
    Overlay,
}

/// One typed, renderer-neutral render step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderStage {
    Brightness(Brightness),
    Contrast(Contrast),
    HighlightsShadows(HighlightsShadows),
    Saturate(Saturate),
    Vibrance(Vibrance),
    Sepia(Sepia),
    HueRotate(HueRotate),
    Blur(Blur),
    Sharpen(Sharpen),
    ChannelScale(ChannelScale),
    Gamma(Gamma),
    Vignette(Vignette),
    Grain(Grain),
    SplitTone(SplitTone),
}

impl RenderStage {
    pub fn group(&self) -> StageGroup {
        match self {
            RenderStage::Brightness(_)
            | RenderStage::Contrast(_)
            | RenderStage::HighlightsShadows(_)
            | RenderStage::Saturate(_)
            | RenderStage::Vibrance(_)
            | RenderStage::Sepia(_)
            | RenderStage::HueRotate(_)
            | RenderStage::Blur(_)
            | RenderStage::Sharpen(_) => StageGroup::Tone,
            RenderStage::ChannelScale(_) | RenderStage::Gamma(_) => StageGroup::Channel,
            RenderStage::Vignette(_) | RenderStage::Grain(_) | RenderStage::SplitTone(_) => {
                StageGroup::Overlay
            }
        }
    }

    pub fn module(&self) -> &dyn ProcessingModule {
        match self {
            RenderStage::Brightness(m) => m,
            RenderStage::Contrast(m) => m,
            RenderStage::HighlightsShadows(m) => m,
            RenderStage::Saturate(m) => m,
            RenderStage::Vibrance(m) => m,
            RenderStage::Sepia(m) => m,
            RenderStage::HueRotate(m) => m,
            RenderStage::Blur(m) => m,
            RenderStage::Sharpen(m) => m,
            RenderStage::ChannelScale(m) => m,
            RenderStage::Gamma(m) => m,
            RenderStage::Vignette(m) => m,
            RenderStage::Grain(m) => m,
            RenderStage::SplitTone(m) => m,
        }
    }

    pub fn name(&self) -> &str {
        self.module().name()
    }
}

/// Red and blue temperature weights for `warmth` in [-100, 100].
///
/// Warming boosts red by up to 20% and cuts blue by up to 10%; cooling is
/// the mirror image.
pub fn temperature_weights(warmth: f32) -> (f32, f32) {
    let w = warmth.abs() / 100.0;
    if warmth > 0.0 {
        (1.0 + w * 0.2, 1.0 - w * 0.1)
    } else {
        (1.0 - w * 0.1, 1.0 + w * 0.2)
    }
}

/// Ordered stage list derived from an [`AdjustmentState`].
///
/// Stages at their neutral value are omitted, so the default state yields an
/// empty plan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub stages: Vec<RenderStage>,
}

impl RenderPlan {
    pub fn from_state(state: &AdjustmentState, grain_seed: u32) -> Self {
        let v = |p: Param| state.get(p);
        let mut stages = Vec::new();
        let mut push = |stage: RenderStage, neutral: bool| {
            if !neutral {
                stages.push(stage);
            }
        };

        // Tone / exposure base
        push(
            RenderStage::Brightness(Brightness {
                amount: v(Param::Exposure) / 100.0,
            }),
            state.is_neutral(Param::Exposure),
        );
        push(
            RenderStage::Contrast(Contrast {
                amount: v(Param::Contrast) / 100.0,
            }),
            state.is_neutral(Param::Contrast),
        );
        push(
            RenderStage::HighlightsShadows(HighlightsShadows {
                highlights: v(Param::Highlights) / 100.0,
                shadows: v(Param::Shadows) / 100.0,
            }),
            state.is_neutral(Param::Highlights) && state.is_neutral(Param::Shadows),
        );
        push(
            RenderStage::Saturate(Saturate {
                amount: v(Param::Saturation) / 100.0,
            }),
            state.is_neutral(Param::Saturation),
        );
        push(
            RenderStage::Vibrance(Vibrance {
                amount: v(Param::Vibrance) / 100.0 - 1.0,
            }),
            state.is_neutral(Param::Vibrance),
        );
        let warm = v(Param::Warmth).max(0.0);
        push(
            RenderStage::Sepia(Sepia {
                amount: warm / 100.0,
            }),
            warm == 0.0,
        );
        push(
            RenderStage::HueRotate(HueRotate {
                degrees: v(Param::Tint),
            }),
            state.is_neutral(Param::Tint),
        );
        push(
            RenderStage::Blur(Blur {
                radius: v(Param::Blur),
            }),
            state.is_neutral(Param::Blur),
        );
        push(
            RenderStage::Sharpen(Sharpen {
                amount: v(Param::Sharpen) / 100.0 * 2.0,
            }),
            state.is_neutral(Param::Sharpen),
        );

        // Channel & gamma
        let (rw, bw) = temperature_weights(v(Param::Warmth));
        let scale = ChannelScale {
            red: v(Param::RedChannel) / 100.0 * rw,
            green: v(Param::GreenChannel) / 100.0,
            blue: v(Param::BlueChannel) / 100.0 * bw,
        };
        push(RenderStage::ChannelScale(scale), scale.is_identity());
        push(
            RenderStage::Gamma(Gamma {
                exponent: 1.0 / v(Param::Gamma),
            }),
            state.is_neutral(Param::Gamma),
        );

        // Overlays, back to front
        push(
            RenderStage::Vignette(Vignette {
                strength: v(Param::Vignette) / 100.0,
            }),
            state.is_neutral(Param::Vignette),
        );
        push(
            RenderStage::Grain(Grain {
                opacity: v(Param::Grain) / 100.0,
                seed: grain_seed,
            }),
            state.is_neutral(Param::Grain),
        );
        push(
            RenderStage::SplitTone(SplitTone {
                range: TonalRange::Highlights,
                hue: v(Param::HighlightsHue),
                opacity: v(Param::HighlightsSat) / 200.0,
                blend: BlendMode::Overlay,
            }),
            state.is_neutral(Param::HighlightsSat),
        );
        push(
            RenderStage::SplitTone(SplitTone {
                range: TonalRange::Shadows,
                hue: v(Param::ShadowsHue),
                opacity: v(Param::ShadowsSat) / 150.0,
                blend: BlendMode::SoftLight,
            }),
            state.is_neutral(Param::ShadowsSat),
        );

        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderStage> {
        self.stages.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::AdjustmentDelta;

    fn state(delta: AdjustmentDelta) -> AdjustmentState {
        AdjustmentState::from_delta(&delta)
    }

    #[test]
    fn default_state_yields_empty_plan() {
        assert!(RenderPlan::from_state(&AdjustmentState::default(), 0).is_empty());
    }

    #[test]
    fn full_plan_order_is_fixed() {
        let s = state(
            AdjustmentDelta::new()
                .with(Param::Exposure, 110.0)
                .with(Param::Contrast, 120.0)
                .with(Param::Highlights, 90.0)
                .with(Param::Saturation, 80.0)
                .with(Param::Vibrance, 120.0)
                .with(Param::Warmth, 30.0)
                .with(Param::Tint, 10.0)
                .with(Param::Blur, 2.0)
                .with(Param::Sharpen, 20.0)
                .with(Param::Gamma, 1.2)
                .with(Param::Vignette, 30.0)
                .with(Param::Grain, 10.0)
                .with(Param::HighlightsSat, 40.0)
                .with(Param::ShadowsSat, 30.0),
        );
        let plan = RenderPlan::from_state(&s, 1);
        assert_eq!(
            plan.names(),
            vec![
                "brightness",
                "contrast",
                "highlights_shadows",
                "saturate",
                "vibrance",
                "sepia",
                "hue_rotate",
                "blur",
                "sharpen",
                "channel_scale",
                "gamma",
                "vignette",
                "grain",
                "split_tone_highlights",
                "split_tone_shadows",
            ]
        );
        let groups: Vec<StageGroup> = plan.iter().map(|s| s.group()).collect();
        let mut sorted = groups.clone();
        sorted.sort();
        assert_eq!(groups, sorted, "groups must be contiguous and ordered");
    }

    #[test]
    fn temperature_weights_mirror() {
        assert_eq!(temperature_weights(0.0), (1.0, 1.0));
        let (r, b) = temperature_weights(100.0);
        assert!((r - 1.2).abs() < 1e-6 && (b - 0.9).abs() < 1e-6);
        let (r, b) = temperature_weights(-100.0);
        assert!((r - 0.9).abs() < 1e-6 && (b - 1.2).abs() < 1e-6);
    }

    #[test]
    fn warmth_feeds_sepia_and_channel_weights() {
        let plan = RenderPlan::from_state(&state(AdjustmentDelta::new().with(Param::Warmth, 50.0)), 0);
        assert_eq!(
            plan.stages,
            vec![
                RenderStage::Sepia(Sepia { amount: 0.5 }),
                RenderStage::ChannelScale(ChannelScale {
                    red: 1.1,
                    green: 1.0,
                    blue: 0.95,
                }),
            ]
        );
    }

    #[test]
    fn cool_warmth_skips_sepia() {
        let plan = RenderPlan::from_state(&state(AdjustmentDelta::new().with(Param::Warmth, -40.0)), 0);
        assert_eq!(plan.names(), vec!["channel_scale"]);
    }

    #[test]
    fn split_tone_opacities_use_distinct_divisors() {
        let s = state(
            AdjustmentDelta::new()
                .with(Param::HighlightsSat, 100.0)
                .with(Param::ShadowsSat, 75.0)
                .with(Param::ShadowsHue, 200.0),
        );
        let plan = RenderPlan::from_state(&s, 0);
        match (&plan.stages[0], &plan.stages[1]) {
            (RenderStage::SplitTone(h), RenderStage::SplitTone(sh)) => {
                assert_eq!(h.opacity, 0.5);
                assert_eq!(h.blend, BlendMode::Overlay);
                assert_eq!(sh.opacity, 0.5);
                assert_eq!(sh.hue, 200.0);
                assert_eq!(sh.blend, BlendMode::SoftLight);
            }
            other => panic!("unexpected stages {other:?}"),
        }
    }

    #[test]
    fn gamma_stage_inverts_gamma() {
        let plan = RenderPlan::from_state(&state(AdjustmentDelta::new().with(Param::Gamma, 2.0)), 0);
        assert_eq!(plan.stages, vec![RenderStage::Gamma(Gamma { exponent: 0.5 })]);
    }

    #[test]
    fn plan_serializes_with_kind_tags() {
        let plan = RenderPlan::from_state(&state(AdjustmentDelta::new().with(Param::Blur, 3.0)), 0);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["stages"][0]["kind"], "blur");
        assert_eq!(json["stages"][0]["radius"], 3.0);
        let back: RenderPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan);
    }
}
