use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::color::{luminance, smoothstep};
use crate::image_buf::ImageBuf;
use crate::pipeline::module::{ProcessingModule, map_pixels};

/// Luminance-weighted lift/pull of the bright and dark ends.
///
/// Both factors are 1.0 at neutral. Above 1.0 brightens that range, below
/// 1.0 darkens it. Weights are smoothstep ramps from mid-gray outward, so
/// mid-tones are left alone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighlightsShadows {
    pub highlights: f32,
    pub shadows: f32,
}

impl ProcessingModule for HighlightsShadows {
    fn name(&self) -> &str {
        "highlights_shadows"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.highlights == 1.0 && self.shadows == 1.0 {
            return Ok(input);
        }
        let (h, s) = (self.highlights - 1.0, self.shadows - 1.0);
        Ok(map_pixels(input, |_, _, [r, g, b]| {
            let y = luminance(r, g, b);
            let wh = smoothstep((y - 0.5) * 2.0);
            let ws = smoothstep((0.5 - y) * 2.0);
            let delta = 0.5 * (h * wh + s * ws);
            [r + delta, g + delta, b + delta]
        }))
    }
}

/// Saturation change weighted toward muted pixels.
///
/// `amount` is in [-1, 1], 0.0 is identity. Positive values boost
/// low-saturation pixels most; negative values mute saturated pixels most.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vibrance {
    pub amount: f32,
}

impl ProcessingModule for Vibrance {
    fn name(&self) -> &str {
        "vibrance"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.amount == 0.0 {
            return Ok(input);
        }
        let strength = self.amount;
        let sign = strength.signum();
        Ok(map_pixels(input, |_, _, [r, g, b]| {
            let max_ch = r.max(g).max(b);
            let min_ch = r.min(g).min(b);
            let sat = if max_ch > 1e-6 {
                (max_ch - min_ch) / max_ch
            } else {
                0.0
            };
            let effect = (strength * (1.0 - sign * sat)).max(-1.0);
            let y = luminance(r, g, b);
            let k = 1.0 + effect;
            [y + k * (r - y), y + k * (g - y), y + k * (b - y)]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: f32, g: f32, b: f32) -> ImageBuf {
        ImageBuf::from_data(1, 1, vec![r, g, b]).unwrap()
    }

    #[test]
    fn neutral_is_identity() {
        let input = pixel(0.9, 0.2, 0.1);
        let hs = HighlightsShadows {
            highlights: 1.0,
            shadows: 1.0,
        };
        assert_eq!(hs.process_cpu(input.clone()).unwrap().data, input.data);
        assert_eq!(Vibrance { amount: 0.0 }.process_cpu(input.clone()).unwrap().data, input.data);
    }

    #[test]
    fn highlights_pull_darkens_bright_pixels_only() {
        let hs = HighlightsShadows {
            highlights: 0.5,
            shadows: 1.0,
        };
        let bright = hs.process_cpu(pixel(0.9, 0.9, 0.9)).unwrap();
        assert!(bright.data[0] < 0.9);
        let dark = hs.process_cpu(pixel(0.2, 0.2, 0.2)).unwrap();
        assert!((dark.data[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn shadows_lift_brightens_dark_pixels() {
        let hs = HighlightsShadows {
            highlights: 1.0,
            shadows: 1.5,
        };
        let out = hs.process_cpu(pixel(0.1, 0.1, 0.1)).unwrap();
        assert!(out.data[0] > 0.1);
    }

    #[test]
    fn mid_gray_unaffected_by_tone_ranges() {
        let hs = HighlightsShadows {
            highlights: 1.5,
            shadows: 0.5,
        };
        let out = hs.process_cpu(pixel(0.5, 0.5, 0.5)).unwrap();
        assert!((out.data[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn vibrance_boosts_muted_more_than_saturated() {
        let v = Vibrance { amount: 0.5 };
        let muted_in = pixel(0.55, 0.5, 0.45);
        let vivid_in = pixel(0.9, 0.2, 0.1);
        let muted = v.process_cpu(muted_in.clone()).unwrap();
        let vivid = v.process_cpu(vivid_in.clone()).unwrap();
        let gain = |before: &ImageBuf, after: &ImageBuf| {
            (after.data[0] - after.data[2]) / (before.data[0] - before.data[2])
        };
        assert!(gain(&muted_in, &muted) > gain(&vivid_in, &vivid));
    }

    #[test]
    fn gray_stays_gray_under_vibrance() {
        for amount in [-1.0, -0.5, 0.5, 1.0] {
            let out = Vibrance { amount }.process_cpu(pixel(0.4, 0.4, 0.4)).unwrap();
            for &v in &out.data {
                assert!((v - 0.4).abs() < 1e-6, "amount={amount} got {v}");
            }
        }
    }
}
