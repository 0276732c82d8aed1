//! Back-to-front overlay layers: vignette, film grain and split toning.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::color::{blend_overlay, blend_soft_light, hsl_to_rgb};
use crate::image_buf::ImageBuf;
use crate::pipeline::module::{ProcessingModule, map_pixels};

/// Fraction of the half-diagonal that stays fully transparent.
pub const VIGNETTE_INNER: f32 = 0.4;

/// Radial black gradient reaching alpha `strength` at the corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vignette {
    pub strength: f32,
}

impl ProcessingModule for Vignette {
    fn name(&self) -> &str {
        "vignette"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.strength <= 0.0 || input.pixel_count() == 0 {
            return Ok(input);
        }
        let cx = input.width as f32 / 2.0;
        let cy = input.height as f32 / 2.0;
        let strength = self.strength;
        Ok(map_pixels(input, |x, y, [r, g, b]| {
            let dx = (x as f32 + 0.5 - cx) / cx;
            let dy = (y as f32 + 0.5 - cy) / cy;
            let d = (dx * dx + dy * dy).sqrt() / std::f32::consts::SQRT_2;
            let t = ((d - VIGNETTE_INNER) / (1.0 - VIGNETTE_INNER)).clamp(0.0, 1.0);
            let keep = 1.0 - strength * t;
            [r * keep, g * keep, b * keep]
        }))
    }
}

/// Procedural value noise overlay-blended at `opacity`.
///
/// Noise is a pure function of pixel position and `seed`, so repeated renders
/// are identical.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grain {
    pub opacity: f32,
    pub seed: u32,
}

impl ProcessingModule for Grain {
    fn name(&self) -> &str {
        "grain"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.opacity <= 0.0 {
            return Ok(input);
        }
        let a = self.opacity;
        let seed = self.seed;
        Ok(map_pixels(input, |x, y, [r, g, b]| {
            let n = noise(x, y, seed);
            let mix = |v: f32| (1.0 - a) * v + a * blend_overlay(v, n);
            [mix(r), mix(g), mix(b)]
        }))
    }
}

/// Integer hash to [0, 1].
pub fn noise(x: u32, y: u32, seed: u32) -> f32 {
    let mut h = x.wrapping_mul(0x8da6_b343)
        ^ y.wrapping_mul(0xd816_3841)
        ^ seed.wrapping_mul(0xcb1a_b31f);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h as f32 / u32::MAX as f32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TonalRange {
    Highlights,
    Shadows,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    Overlay,
    SoftLight,
}

impl BlendMode {
    pub fn blend(self, backdrop: f32, source: f32) -> f32 {
        match self {
            BlendMode::Overlay => blend_overlay(backdrop, source),
            BlendMode::SoftLight => blend_soft_light(backdrop, source),
        }
    }
}

/// Solid `hsl(hue, 100%, 50%)` layer composited with `blend` at `opacity`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitTone {
    pub range: TonalRange,
    pub hue: f32,
    pub opacity: f32,
    pub blend: BlendMode,
}

impl ProcessingModule for SplitTone {
    fn name(&self) -> &str {
        match self.range {
            TonalRange::Highlights => "split_tone_highlights",
            TonalRange::Shadows => "split_tone_shadows",
        }
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.opacity <= 0.0 {
            return Ok(input);
        }
        let (tr, tg, tb) = hsl_to_rgb(self.hue, 1.0, 0.5);
        let a = self.opacity;
        let mode = self.blend;
        let mix = move |v: f32, t: f32| (1.0 - a) * v + a * mode.blend(v, t);
        Ok(map_pixels(input, |_, _, [r, g, b]| {
            [mix(r, tr), mix(g, tg), mix(b, tb)]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(w: u32, h: u32, v: f32) -> ImageBuf {
        ImageBuf::from_data(w, h, vec![v; (w * h * 3) as usize]).unwrap()
    }

    #[test]
    fn vignette_darkens_corners_not_center() {
        let out = Vignette { strength: 1.0 }.process_cpu(flat(9, 9, 0.8)).unwrap();
        let center = ((4 * 9 + 4) * 3) as usize;
        assert!((out.data[center] - 0.8).abs() < 1e-6);
        assert!(out.data[0] < 0.2, "corner should be near black, got {}", out.data[0]);
    }

    #[test]
    fn noise_is_deterministic_and_bounded() {
        for x in 0..32 {
            for y in 0..32 {
                let n = noise(x, y, 7);
                assert_eq!(n, noise(x, y, 7));
                assert!((0.0..=1.0).contains(&n));
            }
        }
        assert_ne!(noise(3, 4, 1), noise(3, 4, 2));
    }

    #[test]
    fn grain_is_repeatable() {
        let g = Grain {
            opacity: 0.5,
            seed: 42,
        };
        let a = g.process_cpu(flat(8, 8, 0.5)).unwrap();
        let b = g.process_cpu(flat(8, 8, 0.5)).unwrap();
        assert_eq!(a.data, b.data);
        assert!(a.data.iter().any(|v| (v - 0.5).abs() > 1e-3));
    }

    #[test]
    fn split_tone_tints_toward_hue() {
        let tone = SplitTone {
            range: TonalRange::Highlights,
            hue: 0.0,
            opacity: 0.5,
            blend: BlendMode::Overlay,
        };
        let out = tone.process_cpu(flat(1, 1, 0.6)).unwrap();
        assert!(out.data[0] > out.data[1], "red hue should lift red: {:?}", out.data);
        assert!((out.data[1] - out.data[2]).abs() < 1e-6);
    }

    #[test]
    fn zero_opacity_layers_are_identity() {
        let input = flat(3, 3, 0.3);
        let modules: Vec<Box<dyn ProcessingModule>> = vec![
            Box::new(Vignette { strength: 0.0 }),
            Box::new(Grain {
                opacity: 0.0,
                seed: 1,
            }),
            Box::new(SplitTone {
                range: TonalRange::Shadows,
                hue: 200.0,
                opacity: 0.0,
                blend: BlendMode::SoftLight,
            }),
        ];
        for m in modules {
            assert_eq!(m.process_cpu(input.clone()).unwrap().data, input.data, "{}", m.name());
        }
    }
}
