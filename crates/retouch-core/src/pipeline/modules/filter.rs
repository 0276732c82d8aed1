//! Compositor filter primitives: `brightness`, `contrast`, `saturate`,
//! `sepia` and `hue-rotate`, with the same matrices a browser applies.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::color::{Mat3, apply_mat3, hue_rotate_matrix, is_identity, saturate_matrix, sepia_matrix};
use crate::image_buf::ImageBuf;
use crate::pipeline::module::{ProcessingModule, map_pixels};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brightness {
    /// Linear multiplier, 1.0 is identity.
    pub amount: f32,
}

impl ProcessingModule for Brightness {
    fn name(&self) -> &str {
        "brightness"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.amount == 1.0 {
            return Ok(input);
        }
        let k = self.amount;
        Ok(map_pixels(input, |_, _, [r, g, b]| [r * k, g * k, b * k]))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contrast {
    /// Slope around mid-gray, 1.0 is identity.
    pub amount: f32,
}

impl ProcessingModule for Contrast {
    fn name(&self) -> &str {
        "contrast"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.amount == 1.0 {
            return Ok(input);
        }
        let k = self.amount;
        let f = |v: f32| (v - 0.5) * k + 0.5;
        Ok(map_pixels(input, |_, _, [r, g, b]| [f(r), f(g), f(b)]))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Saturate {
    pub amount: f32,
}

impl ProcessingModule for Saturate {
    fn name(&self) -> &str {
        "saturate"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        Ok(apply_matrix(input, &saturate_matrix(self.amount)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sepia {
    /// Blend toward the sepia matrix, in [0, 1].
    pub amount: f32,
}

impl ProcessingModule for Sepia {
    fn name(&self) -> &str {
        "sepia"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        Ok(apply_matrix(input, &sepia_matrix(self.amount)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HueRotate {
    pub degrees: f32,
}

impl ProcessingModule for HueRotate {
    fn name(&self) -> &str {
        "hue_rotate"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        Ok(apply_matrix(input, &hue_rotate_matrix(self.degrees)))
    }
}

fn apply_matrix(input: ImageBuf, m: &Mat3) -> ImageBuf {
    if is_identity(m) {
        return input;
    }
    map_pixels(input, |_, _, [r, g, b]| {
        let (r, g, b) = apply_mat3(m, r, g, b);
        [r, g, b]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: f32, g: f32, b: f32) -> ImageBuf {
        ImageBuf::from_data(1, 1, vec![r, g, b]).unwrap()
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let out = Brightness { amount: 1.5 }.process_cpu(pixel(0.2, 0.5, 0.8)).unwrap();
        assert!((out.data[0] - 0.3).abs() < 1e-6);
        assert!((out.data[1] - 0.75).abs() < 1e-6);
        assert_eq!(out.data[2], 1.0);
    }

    #[test]
    fn contrast_pivots_on_mid_gray() {
        let out = Contrast { amount: 1.5 }.process_cpu(pixel(0.5, 0.7, 0.3)).unwrap();
        assert!((out.data[0] - 0.5).abs() < 1e-6);
        assert!((out.data[1] - 0.8).abs() < 1e-6);
        assert!((out.data[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn identity_amounts_leave_pixels_untouched() {
        let input = pixel(0.8, 0.3, 0.1);
        let modules: Vec<Box<dyn ProcessingModule>> = vec![
            Box::new(Brightness { amount: 1.0 }),
            Box::new(Contrast { amount: 1.0 }),
            Box::new(Saturate { amount: 1.0 }),
            Box::new(Sepia { amount: 0.0 }),
            Box::new(HueRotate { degrees: 0.0 }),
        ];
        for m in modules {
            let out = m.process_cpu(input.clone()).unwrap();
            assert_eq!(out.data, input.data, "{} should be identity", m.name());
        }
    }

    #[test]
    fn saturate_increases_spread() {
        let out = Saturate { amount: 1.5 }.process_cpu(pixel(0.6, 0.4, 0.3)).unwrap();
        assert!(out.data[0] - out.data[2] > 0.3);
    }

    #[test]
    fn sepia_warms() {
        let out = Sepia { amount: 0.5 }.process_cpu(pixel(0.5, 0.5, 0.5)).unwrap();
        assert!(out.data[0] > out.data[2]);
    }

    #[test]
    fn hue_rotate_moves_red_toward_green() {
        let out = HueRotate { degrees: 120.0 }.process_cpu(pixel(0.8, 0.1, 0.1)).unwrap();
        assert!(out.data[1] > out.data[0], "got {:?}", out.data);
    }
}
