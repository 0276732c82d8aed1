use image::{GrayImage, Luma};

use crate::error::MaskError;
use crate::stroke::{Point, StrokeMode};

/// Largest surface a rasterizer will allocate (64 MP).
pub const MAX_SURFACE_PIXELS: u64 = 64_000_000;

/// Drawing backend for mask strokes.
///
/// Coordinates and diameters are in the rasterizer's own pixel space. A
/// software buffer, a GPU texture or a platform canvas can all implement it.
pub trait Rasterizer {
    fn dimensions(&self) -> (u32, u32);

    /// Reallocate to `width x height`, discarding existing content.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), MaskError>;

    fn clear(&mut self);

    /// Draw a round-capped segment of the given diameter.
    fn draw_segment(&mut self, from: Point, to: Point, diameter: f32, mode: StrokeMode);

    /// Current alpha coverage, 0 = unselected and 255 = selected.
    fn alpha(&self) -> GrayImage;
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), MaskError> {
    if width == 0 || height == 0 {
        return Err(MaskError::InvalidDimensions { width, height });
    }
    if width as u64 * height as u64 > MAX_SURFACE_PIXELS {
        return Err(MaskError::TooLarge { width, height });
    }
    Ok(())
}

/// CPU alpha buffer with anti-aliased capsule strokes.
#[derive(Clone, Debug)]
pub struct SoftwareRasterizer {
    buffer: GrayImage,
}

impl SoftwareRasterizer {
    pub fn new(width: u32, height: u32) -> Result<Self, MaskError> {
        check_dimensions(width, height)?;
        Ok(Self {
            buffer: GrayImage::new(width, height),
        })
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), MaskError> {
        check_dimensions(width, height)?;
        self.buffer = GrayImage::new(width, height);
        Ok(())
    }

    fn clear(&mut self) {
        for p in self.buffer.pixels_mut() {
            *p = Luma([0]);
        }
    }

    fn draw_segment(&mut self, from: Point, to: Point, diameter: f32, mode: StrokeMode) {
        let (w, h) = self.buffer.dimensions();
        let r = (diameter / 2.0).max(0.5);
        let x0 = (from.x.min(to.x) - r - 1.0).floor().max(0.0) as u32;
        let y0 = (from.y.min(to.y) - r - 1.0).floor().max(0.0) as u32;
        let x1 = ((from.x.max(to.x) + r + 1.0).ceil().max(0.0) as u32).min(w);
        let y1 = ((from.y.max(to.y) + r + 1.0).ceil().max(0.0) as u32).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                let c = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (r + 0.5 - distance_to_segment(c, from, to)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let px = self.buffer.get_pixel_mut(x, y);
                let a = px.0[0] as f32 / 255.0;
                let next = match mode {
                    StrokeMode::Paint => a.max(coverage),
                    StrokeMode::Erase => a * (1.0 - coverage),
                };
                px.0[0] = (next * 255.0).round() as u8;
            }
        }
    }

    fn alpha(&self) -> GrayImage {
        self.buffer.clone()
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (dx, dy) = (p.x - (a.x + t * abx), p.y - (a.y + t * aby));
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_huge_surfaces() {
        assert!(matches!(
            SoftwareRasterizer::new(0, 10),
            Err(MaskError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            SoftwareRasterizer::new(100_000, 100_000),
            Err(MaskError::TooLarge { .. })
        ));
    }

    #[test]
    fn dab_covers_disc() {
        let mut r = SoftwareRasterizer::new(21, 21).unwrap();
        let c = Point::new(10.5, 10.5);
        r.draw_segment(c, c, 10.0, StrokeMode::Paint);
        let a = r.alpha();
        assert_eq!(a.get_pixel(10, 10).0[0], 255);
        assert_eq!(a.get_pixel(13, 10).0[0], 255);
        assert_eq!(a.get_pixel(0, 0).0[0], 0);
        assert_eq!(a.get_pixel(20, 10).0[0], 0);
    }

    #[test]
    fn segment_covers_its_length() {
        let mut r = SoftwareRasterizer::new(40, 10).unwrap();
        r.draw_segment(Point::new(5.0, 5.0), Point::new(35.0, 5.0), 4.0, StrokeMode::Paint);
        let a = r.alpha();
        for x in 5..35 {
            assert_eq!(a.get_pixel(x, 4).0[0], 255, "x={x}");
        }
        assert_eq!(a.get_pixel(20, 0).0[0], 0);
    }

    #[test]
    fn erase_removes_paint() {
        let mut r = SoftwareRasterizer::new(20, 20).unwrap();
        let c = Point::new(10.0, 10.0);
        r.draw_segment(c, c, 12.0, StrokeMode::Paint);
        r.draw_segment(c, c, 6.0, StrokeMode::Erase);
        let a = r.alpha();
        assert_eq!(a.get_pixel(10, 10).0[0], 0);
        assert_eq!(a.get_pixel(14, 10).0[0], 255);
    }

    #[test]
    fn clear_and_resize_reset_content() {
        let mut r = SoftwareRasterizer::new(10, 10).unwrap();
        r.draw_segment(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 6.0, StrokeMode::Paint);
        r.clear();
        assert!(r.alpha().pixels().all(|p| p.0[0] == 0));
        r.resize(30, 20).unwrap();
        assert_eq!(r.dimensions(), (30, 20));
    }

    #[test]
    fn strokes_off_surface_do_not_panic() {
        let mut r = SoftwareRasterizer::new(10, 10).unwrap();
        r.draw_segment(Point::new(-50.0, -50.0), Point::new(200.0, 300.0), 8.0, StrokeMode::Paint);
        r.draw_segment(Point::new(-5.0, -5.0), Point::new(-5.0, -5.0), 2.0, StrokeMode::Erase);
    }
}
