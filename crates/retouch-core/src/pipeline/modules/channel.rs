use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::image_buf::ImageBuf;
use crate::pipeline::module::{ProcessingModule, map_pixels};

/// Diagonal 3x3 channel-scaling matrix.
///
/// The red and blue entries already include the warmth temperature weights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelScale {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl ChannelScale {
    pub fn is_identity(&self) -> bool {
        self.red == 1.0 && self.green == 1.0 && self.blue == 1.0
    }
}

impl ProcessingModule for ChannelScale {
    fn name(&self) -> &str {
        "channel_scale"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.is_identity() {
            return Ok(input);
        }
        let s = *self;
        Ok(map_pixels(input, |_, _, [r, g, b]| {
            [r * s.red, g * s.green, b * s.blue]
        }))
    }
}

/// Per-channel `v^exponent`, where `exponent = 1 / gamma`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gamma {
    pub exponent: f32,
}

impl ProcessingModule for Gamma {
    fn name(&self) -> &str {
        "gamma"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.exponent == 1.0 {
            return Ok(input);
        }
        let e = self.exponent;
        let f = |v: f32| v.max(0.0).powf(e);
        Ok(map_pixels(input, |_, _, [r, g, b]| [f(r), f(g), f(b)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_scale_is_diagonal() {
        let buf = ImageBuf::from_data(1, 1, vec![0.5, 0.5, 0.5]).unwrap();
        let scale = ChannelScale {
            red: 1.2,
            green: 1.0,
            blue: 0.5,
        };
        let out = scale.process_cpu(buf).unwrap();
        assert!((out.data[0] - 0.6).abs() < 1e-6);
        assert!((out.data[1] - 0.5).abs() < 1e-6);
        assert!((out.data[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn gamma_above_one_brightens_midtones() {
        let buf = ImageBuf::from_data(1, 1, vec![0.25, 0.5, 1.0]).unwrap();
        let out = Gamma { exponent: 0.5 }.process_cpu(buf).unwrap();
        assert!((out.data[0] - 0.5).abs() < 1e-6);
        assert!(out.data[1] > 0.5);
        assert_eq!(out.data[2], 1.0);
    }

    #[test]
    fn gamma_keeps_black_black() {
        let buf = ImageBuf::from_data(1, 1, vec![0.0, 0.0, 0.0]).unwrap();
        let out = Gamma { exponent: 10.0 }.process_cpu(buf).unwrap();
        assert_eq!(out.data, vec![0.0, 0.0, 0.0]);
    }
}
