//! Named looks applied over the default baseline.
//!
//! Applying a preset replaces the whole adjustment state with
//! `defaults + delta`; any manual tweaks are discarded. Applying the same
//! preset twice therefore gives the same state as applying it once.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adjust::{AdjustmentDelta, AdjustmentState, Param};

pub const AUTO_ENHANCE: &str = "Auto Enhance";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub delta: AdjustmentDelta,
}

impl Preset {
    pub fn new(name: impl Into<String>, delta: AdjustmentDelta) -> Self {
        Self {
            name: name.into(),
            delta,
        }
    }

    pub fn state(&self) -> AdjustmentState {
        apply_delta(&self.delta)
    }
}

/// `merge(DEFAULTS, delta)`.
pub fn apply_delta(delta: &AdjustmentDelta) -> AdjustmentState {
    AdjustmentState::from_delta(delta)
}

/// Validate a preset name before it is registered or used as a file stem.
pub fn validate_preset_name(name: &str) -> Result<()> {
    anyhow::ensure!(!name.trim().is_empty(), "preset name cannot be empty");
    anyhow::ensure!(
        !name.contains('/') && !name.contains('\\'),
        "preset name cannot contain path separators"
    );
    anyhow::ensure!(!name.contains(".."), "preset name cannot contain '..'");
    anyhow::ensure!(!name.contains('\0'), "preset name cannot contain null bytes");
    Ok(())
}

fn builtin() -> Vec<Preset> {
    use Param::*;
    let p = |name: &str, fields: &[(Param, f32)]| {
        Preset::new(name, fields.iter().copied().collect())
    };
    vec![
        p(
            AUTO_ENHANCE,
            &[
                (Exposure, 105.0),
                (Contrast, 110.0),
                (Highlights, 95.0),
                (Shadows, 110.0),
                (Saturation, 110.0),
                (Vibrance, 115.0),
                (Sharpen, 15.0),
            ],
        ),
        p(
            "Warm",
            &[
                (Exposure, 105.0),
                (Warmth, 20.0),
                (Contrast, 110.0),
                (Saturation, 110.0),
                (Tint, -5.0),
            ],
        ),
        p(
            "Cool",
            &[(Warmth, -25.0), (Saturation, 95.0), (Tint, 5.0), (BlueChannel, 105.0)],
        ),
        p(
            "Vivid",
            &[(Contrast, 115.0), (Saturation, 140.0), (Vibrance, 130.0), (Sharpen, 20.0)],
        ),
        p("Mono", &[(Saturation, 0.0), (Contrast, 120.0), (Grain, 10.0)]),
        p(
            "Vintage",
            &[
                (Warmth, 35.0),
                (Contrast, 90.0),
                (Saturation, 80.0),
                (Gamma, 1.1),
                (Vignette, 35.0),
                (Grain, 25.0),
            ],
        ),
        p(
            "Cinematic",
            &[
                (Contrast, 115.0),
                (Saturation, 90.0),
                (HighlightsHue, 35.0),
                (HighlightsSat, 40.0),
                (ShadowsHue, 190.0),
                (ShadowsSat, 45.0),
                (Vignette, 20.0),
            ],
        ),
        p(
            "Dramatic",
            &[
                (Exposure, 95.0),
                (Contrast, 135.0),
                (Highlights, 85.0),
                (Shadows, 90.0),
                (Vignette, 45.0),
            ],
        ),
    ]
}

/// Registry of named presets, built-ins first.
pub struct PresetEngine {
    presets: Vec<Preset>,
}

impl PresetEngine {
    pub fn new() -> Self {
        Self { presets: builtin() }
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Add or replace a preset of the same name.
    pub fn register(&mut self, preset: Preset) -> Result<()> {
        validate_preset_name(&preset.name)?;
        match self
            .presets
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&preset.name))
        {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
        Ok(())
    }

    /// Load a JSON array of presets and register each one.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read preset file: {}", path.display()))?;
        self.load_json(&contents)
            .with_context(|| format!("load presets from {}", path.display()))
    }

    pub fn load_json(&mut self, json: &str) -> Result<usize> {
        let presets: Vec<Preset> = serde_json::from_str(json).context("parse preset JSON")?;
        let count = presets.len();
        for preset in presets {
            self.register(preset)?;
        }
        info!(count, "loaded presets");
        Ok(count)
    }

    /// Resolve `name` to its full state: defaults overlaid with the delta.
    pub fn apply(&self, name: &str) -> Option<AdjustmentState> {
        self.get(name).map(Preset::state)
    }

    pub fn auto_enhance(&self) -> AdjustmentState {
        self.apply(AUTO_ENHANCE).unwrap_or_default()
    }
}

impl Default for PresetEngine {
    fn default() -> Self {
        Self::new()
    }
}
