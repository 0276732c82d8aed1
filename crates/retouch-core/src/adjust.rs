use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// One tunable correction parameter.
///
/// The serialized name is the camelCase field name used by presets and the
/// style-inference service (`"redChannel"`, `"highlightsSat"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Param {
    Exposure,
    Contrast,
    Highlights,
    Shadows,
    Gamma,
    Saturation,
    Vibrance,
    Warmth,
    Tint,
    Blur,
    Vignette,
    Grain,
    Sharpen,
    RedChannel,
    GreenChannel,
    BlueChannel,
    HighlightsHue,
    ShadowsHue,
    HighlightsSat,
    ShadowsSat,
}

impl Param {
    pub const COUNT: usize = 20;

    pub const ALL: [Param; Param::COUNT] = [
        Param::Exposure,
        Param::Contrast,
        Param::Highlights,
        Param::Shadows,
        Param::Gamma,
        Param::Saturation,
        Param::Vibrance,
        Param::Warmth,
        Param::Tint,
        Param::Blur,
        Param::Vignette,
        Param::Grain,
        Param::Sharpen,
        Param::RedChannel,
        Param::GreenChannel,
        Param::BlueChannel,
        Param::HighlightsHue,
        Param::ShadowsHue,
        Param::HighlightsSat,
        Param::ShadowsSat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Param::Exposure => "exposure",
            Param::Contrast => "contrast",
            Param::Highlights => "highlights",
            Param::Shadows => "shadows",
            Param::Gamma => "gamma",
            Param::Saturation => "saturation",
            Param::Vibrance => "vibrance",
            Param::Warmth => "warmth",
            Param::Tint => "tint",
            Param::Blur => "blur",
            Param::Vignette => "vignette",
            Param::Grain => "grain",
            Param::Sharpen => "sharpen",
            Param::RedChannel => "redChannel",
            Param::GreenChannel => "greenChannel",
            Param::BlueChannel => "blueChannel",
            Param::HighlightsHue => "highlightsHue",
            Param::ShadowsHue => "shadowsHue",
            Param::HighlightsSat => "highlightsSat",
            Param::ShadowsSat => "shadowsSat",
        }
    }

    /// Case-insensitive lookup by serialized name.
    pub fn from_name(name: &str) -> Option<Param> {
        Param::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Closed range every stored value is clamped into.
    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            Param::Exposure | Param::Contrast | Param::Highlights | Param::Shadows => 50.0..=150.0,
            Param::Gamma => 0.1..=2.5,
            Param::Saturation | Param::Vibrance => 0.0..=200.0,
            Param::Warmth => -100.0..=100.0,
            Param::Tint => -180.0..=180.0,
            Param::Blur => 0.0..=20.0,
            Param::Vignette | Param::Grain | Param::Sharpen => 0.0..=100.0,
            Param::RedChannel | Param::GreenChannel | Param::BlueChannel => 0.0..=200.0,
            Param::HighlightsHue | Param::ShadowsHue => 0.0..=360.0,
            Param::HighlightsSat | Param::ShadowsSat => 0.0..=100.0,
        }
    }

    /// Neutral value: rendering with every param at its default is the identity.
    pub fn default_value(self) -> f32 {
        match self {
            Param::Exposure | Param::Contrast | Param::Highlights | Param::Shadows => 100.0,
            Param::Gamma => 1.0,
            Param::Saturation | Param::Vibrance => 100.0,
            Param::RedChannel | Param::GreenChannel | Param::BlueChannel => 100.0,
            Param::Warmth
            | Param::Tint
            | Param::Blur
            | Param::Vignette
            | Param::Grain
            | Param::Sharpen
            | Param::HighlightsHue
            | Param::ShadowsHue
            | Param::HighlightsSat
            | Param::ShadowsSat => 0.0,
        }
    }

    /// Clamp into range. Non-finite input falls back to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default_value();
        }
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A partial set of parameter values.
///
/// Presets are stored as deltas over the defaults, and the style-inference
/// service returns one containing only the fields it changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentDelta(BTreeMap<Param, f32>);

impl AdjustmentDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: Param, value: f32) -> Self {
        self.0.insert(param, value);
        self
    }

    pub fn set(&mut self, param: Param, value: f32) {
        self.0.insert(param, value);
    }

    pub fn get(&self, param: Param) -> Option<f32> {
        self.0.get(&param).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Param, f32)> + '_ {
        self.0.iter().map(|(p, v)| (*p, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Param, f32)> for AdjustmentDelta {
    fn from_iter<I: IntoIterator<Item = (Param, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The complete set of non-destructive corrections for one editing session.
///
/// Values are only reachable through [`AdjustmentState::set`] and the delta
/// merge, both of which clamp, so every field is always within its range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "AdjustmentDelta", into = "AdjustmentDelta")]
pub struct AdjustmentState {
    values: [f32; Param::COUNT],
}

impl Default for AdjustmentState {
    fn default() -> Self {
        Self {
            values: Param::ALL.map(Param::default_value),
        }
    }
}

impl AdjustmentState {
    /// Defaults overlaid with `delta`.
    pub fn from_delta(delta: &AdjustmentDelta) -> Self {
        Self::default().merged(delta)
    }

    pub fn get(&self, param: Param) -> f32 {
        self.values[param.index()]
    }

    /// Store a clamped value and return what was stored.
    pub fn set(&mut self, param: Param, value: f32) -> f32 {
        let clamped = param.clamp(value);
        self.values[param.index()] = clamped;
        clamped
    }

    /// Overwrite only the fields present in `delta`.
    pub fn apply(&mut self, delta: &AdjustmentDelta) {
        for (param, value) in delta.iter() {
            self.set(param, value);
        }
    }

    pub fn merged(&self, delta: &AdjustmentDelta) -> Self {
        let mut out = self.clone();
        out.apply(delta);
        out
    }

    pub fn is_neutral(&self, param: Param) -> bool {
        self.get(param) == param.default_value()
    }

    pub fn is_default(&self) -> bool {
        Param::ALL.into_iter().all(|p| self.is_neutral(p))
    }

    /// Fields that differ from their defaults.
    pub fn non_default(&self) -> AdjustmentDelta {
        Param::ALL
            .into_iter()
            .filter(|p| !self.is_neutral(*p))
            .map(|p| (p, self.get(p)))
            .collect()
    }
}

impl From<AdjustmentDelta> for AdjustmentState {
    fn from(delta: AdjustmentDelta) -> Self {
        Self::from_delta(&delta)
    }
}

impl From<AdjustmentState> for AdjustmentDelta {
    fn from(state: AdjustmentState) -> Self {
        Param::ALL.into_iter().map(|p| (p, state.get(p))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_table() {
        let s = AdjustmentState::default();
        assert_eq!(s.get(Param::Exposure), 100.0);
        assert_eq!(s.get(Param::Gamma), 1.0);
        assert_eq!(s.get(Param::Warmth), 0.0);
        assert_eq!(s.get(Param::Tint), 0.0);
        assert_eq!(s.get(Param::Blur), 0.0);
        assert_eq!(s.get(Param::BlueChannel), 100.0);
        assert_eq!(s.get(Param::ShadowsSat), 0.0);
        assert!(s.is_default());
    }

    #[test]
    fn defaults_are_within_range() {
        for p in Param::ALL {
            assert!(
                p.range().contains(&p.default_value()),
                "{} default outside range",
                p.name()
            );
        }
    }

    #[test]
    fn all_is_indexed_in_declaration_order() {
        for (i, p) in Param::ALL.into_iter().enumerate() {
            assert_eq!(p.index(), i, "{} out of order", p.name());
        }
    }

    #[test]
    fn set_clamps_into_range() {
        let mut s = AdjustmentState::default();
        assert_eq!(s.set(Param::Exposure, 400.0), 150.0);
        assert_eq!(s.set(Param::Gamma, 0.0), 0.1);
        assert_eq!(s.set(Param::Tint, -500.0), -180.0);
        assert_eq!(s.set(Param::Blur, 50.0), 20.0);
        assert_eq!(s.get(Param::Exposure), 150.0);
    }

    #[test]
    fn non_finite_falls_back_to_default() {
        let mut s = AdjustmentState::default();
        s.set(Param::Contrast, 120.0);
        assert_eq!(s.set(Param::Contrast, f32::NAN), 100.0);
        assert_eq!(s.set(Param::Warmth, f32::INFINITY), 0.0);
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let mut s = AdjustmentState::default();
        s.set(Param::Vignette, 40.0);
        let delta = AdjustmentDelta::new().with(Param::Exposure, 120.0);
        let merged = s.merged(&delta);
        assert_eq!(merged.get(Param::Exposure), 120.0);
        assert_eq!(merged.get(Param::Vignette), 40.0);
    }

    #[test]
    fn merge_clamps_delta_values() {
        let delta = AdjustmentDelta::new().with(Param::Saturation, 999.0);
        let s = AdjustmentState::from_delta(&delta);
        assert_eq!(s.get(Param::Saturation), 200.0);
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(Param::from_name("redChannel"), Some(Param::RedChannel));
        assert_eq!(Param::from_name("REDCHANNEL"), Some(Param::RedChannel));
        assert_eq!(Param::from_name("clarity"), None);
    }

    #[test]
    fn non_default_lists_changed_fields() {
        let mut s = AdjustmentState::default();
        s.set(Param::Grain, 10.0);
        s.set(Param::Tint, -5.0);
        let changed = s.non_default();
        assert_eq!(changed.len(), 2);
        assert_eq!(changed.get(Param::Grain), Some(10.0));
        assert_eq!(changed.get(Param::Tint), Some(-5.0));
    }

    #[test]
    fn delta_json_uses_camel_case_keys() {
        let delta: AdjustmentDelta =
            serde_json::from_str(r#"{"exposure":105,"highlightsHue":30}"#).unwrap();
        assert_eq!(delta.get(Param::Exposure), Some(105.0));
        assert_eq!(delta.get(Param::HighlightsHue), Some(30.0));
        assert!(serde_json::from_str::<AdjustmentDelta>(r#"{"clarity":5}"#).is_err());
    }

    #[test]
    fn state_deserialization_clamps_and_fills_defaults() {
        let s: AdjustmentState = serde_json::from_str(r#"{"gamma":9.0,"warmth":-20}"#).unwrap();
        assert_eq!(s.get(Param::Gamma), 2.5);
        assert_eq!(s.get(Param::Warmth), -20.0);
        assert_eq!(s.get(Param::Contrast), 100.0);

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json.as_object().unwrap().len(), Param::COUNT);
    }
}
