use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat};

use crate::error::MaskError;

/// Opaque single-channel mask: black background, white where painted.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskImage {
    image: GrayImage,
}

impl MaskImage {
    /// Composite painted alpha over an opaque black background.
    pub fn from_alpha(alpha: GrayImage) -> Self {
        // Alpha over black with a white brush is the alpha value itself.
        Self { image: alpha }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// Fraction of pixels with any selection coverage.
    pub fn coverage(&self) -> f32 {
        let total = self.image.pixels().len();
        if total == 0 {
            return 0.0;
        }
        let painted = self.image.pixels().filter(|p| p.0[0] > 0).count();
        painted as f32 / total as f32
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[0] == 0)
    }

    /// Encode as PNG for submission to the edit service.
    pub fn to_png(&self) -> Result<Vec<u8>, MaskError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(self.image.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn blank_mask_has_no_coverage() {
        let mask = MaskImage::from_alpha(GrayImage::new(4, 4));
        assert!(mask.is_blank());
        assert_eq!(mask.coverage(), 0.0);
    }

    #[test]
    fn coverage_counts_painted_pixels() {
        let mut img = GrayImage::new(4, 1);
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(1, 0, Luma([10]));
        let mask = MaskImage::from_alpha(img);
        assert_eq!(mask.coverage(), 0.5);
        assert!(!mask.is_blank());
    }

    #[test]
    fn png_decodes_back_to_same_size() {
        let mask = MaskImage::from_alpha(GrayImage::new(7, 5));
        let png = mask.to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }
}
