use anyhow::{Context, Result};
use image::{DynamicImage, RgbImage};

/// Display-encoded f32 RGB working buffer.
///
/// Pixel data is interleaved RGBRGB... in the image's own (sRGB) encoding,
/// nominally in [0, 1]. Render stages clamp back into range after each step.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuf {
    pub width: u32,
    pub height: u32,
    /// Flat pixel data: [R, G, B, R, G, B, ...].
    pub data: Vec<f32>,
}

impl ImageBuf {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize * 3],
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        anyhow::ensure!(
            data.len() == expected,
            "expected {expected} floats for {width}x{height} RGB, got {}",
            data.len()
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode an encoded image payload (JPEG, PNG, WebP).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).context("decode image payload")?;
        Ok(Self::from_dynamic(&img))
    }

    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let data = rgb.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Quantize to 8-bit RGB, clamping out-of-range values.
    pub fn to_rgb8(&self) -> RgbImage {
        let bytes = self.data.iter().map(|&v| quantize(v)).collect();
        // Length is guaranteed by construction.
        RgbImage::from_raw(self.width, self.height, bytes).unwrap_or_else(|| RgbImage::new(0, 0))
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Downsample so the longest edge fits within `max_edge` pixels.
    /// Uses box averaging for clean downscaling. Returns a clone if already small enough.
    pub fn downsample(&self, max_edge: u32) -> Self {
        let longest = self.width.max(self.height);
        if longest <= max_edge || max_edge == 0 {
            return self.clone();
        }

        let scale = max_edge as f32 / longest as f32;
        let new_w = (self.width as f32 * scale).round().max(1.0) as u32;
        let new_h = (self.height as f32 * scale).round().max(1.0) as u32;

        let mut data = Vec::with_capacity(new_w as usize * new_h as usize * 3);

        for dst_y in 0..new_h {
            for dst_x in 0..new_w {
                let src_x0 = (dst_x as f32 / scale) as u32;
                let src_y0 = (dst_y as f32 / scale) as u32;
                let src_x1 = (((dst_x + 1) as f32 / scale).ceil() as u32).min(self.width);
                let src_y1 = (((dst_y + 1) as f32 / scale).ceil() as u32).min(self.height);

                let mut sum = [0.0_f32; 3];
                let mut count = 0u32;
                for sy in src_y0..src_y1 {
                    for sx in src_x0..src_x1 {
                        let idx = (sy as usize * self.width as usize + sx as usize) * 3;
                        sum[0] += self.data[idx];
                        sum[1] += self.data[idx + 1];
                        sum[2] += self.data[idx + 2];
                        count += 1;
                    }
                }

                if count > 0 {
                    let inv = 1.0 / count as f32;
                    data.extend(sum.iter().map(|v| v * inv));
                } else {
                    data.extend([0.0; 3]);
                }
            }
        }

        Self {
            width: new_w,
            height: new_h,
            data,
        }
    }
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}
