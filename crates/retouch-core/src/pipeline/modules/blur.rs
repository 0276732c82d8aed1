use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::image_buf::ImageBuf;
use crate::pipeline::module::{ProcessingModule, map_pixels};

/// Gaussian blur with standard deviation `radius` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blur {
    pub radius: f32,
}

impl ProcessingModule for Blur {
    fn name(&self) -> &str {
        "blur"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.radius <= 0.0 {
            return Ok(input);
        }
        Ok(gaussian_blur(&input, self.radius))
    }
}

/// Unsharp mask: `v + amount * (v - blur(v, 1px))`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sharpen {
    pub amount: f32,
}

const SHARPEN_SIGMA: f32 = 1.0;

impl ProcessingModule for Sharpen {
    fn name(&self) -> &str {
        "sharpen"
    }

    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.amount <= 0.0 {
            return Ok(input);
        }
        let blurred = gaussian_blur(&input, SHARPEN_SIGMA);
        let k = self.amount;
        let width = input.width as usize;
        Ok(map_pixels(input, |x, y, [r, g, b]| {
            let idx = (y as usize * width + x as usize) * 3;
            let soft = &blurred.data[idx..idx + 3];
            [
                r + k * (r - soft[0]),
                g + k * (g - soft[1]),
                b + k * (b - soft[2]),
            ]
        }))
    }
}

fn kernel(sigma: f32) -> Vec<f32> {
    let half = (sigma * 3.0).ceil().max(1.0) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = k.iter().sum();
    for w in &mut k {
        *w /= sum;
    }
    k
}

/// Separable Gaussian with edge clamping.
pub(crate) fn gaussian_blur(input: &ImageBuf, sigma: f32) -> ImageBuf {
    let (w, h) = (input.width as usize, input.height as usize);
    if w == 0 || h == 0 {
        return input.clone();
    }
    let k = kernel(sigma);
    let half = (k.len() / 2) as isize;

    let mut tmp = vec![0.0_f32; input.data.len()];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0_f32; 3];
            for (i, weight) in k.iter().enumerate() {
                let sx = (x as isize + i as isize - half).clamp(0, w as isize - 1) as usize;
                let idx = (y * w + sx) * 3;
                acc[0] += weight * input.data[idx];
                acc[1] += weight * input.data[idx + 1];
                acc[2] += weight * input.data[idx + 2];
            }
            tmp[(y * w + x) * 3..(y * w + x) * 3 + 3].copy_from_slice(&acc);
        }
    }

    let mut out = vec![0.0_f32; input.data.len()];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0_f32; 3];
            for (i, weight) in k.iter().enumerate() {
                let sy = (y as isize + i as isize - half).clamp(0, h as isize - 1) as usize;
                let idx = (sy * w + x) * 3;
                acc[0] += weight * tmp[idx];
                acc[1] += weight * tmp[idx + 1];
                acc[2] += weight * tmp[idx + 2];
            }
            out[(y * w + x) * 3..(y * w + x) * 3 + 3].copy_from_slice(&acc);
        }
    }

    ImageBuf {
        width: input.width,
        height: input.height,
        data: out,
    }
}
