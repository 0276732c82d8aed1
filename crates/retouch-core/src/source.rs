use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::image_buf::ImageBuf;

/// Content-derived display identifier of a [`SourceImage`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(String);

impl ImageId {
    /// First 16 hex chars of the BLAKE3 digest of `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        let hex = blake3::hash(bytes).to_hex();
        Self(hex[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable encoded image payload. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct SourceImage {
    bytes: Arc<[u8]>,
    mime: String,
    id: ImageId,
}

impl SourceImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> Self {
        let bytes = bytes.into();
        let id = ImageId::of(&bytes);
        Self {
            bytes,
            mime: mime.into(),
            id,
        }
    }

    /// Build from a payload whose MIME type is sniffed from its magic bytes.
    pub fn sniff(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes = bytes.into();
        let format = image::guess_format(&bytes).context("unrecognized image payload")?;
        Ok(Self::new(bytes, format.to_mime_type()))
    }

    /// Encode a working buffer as a lossless PNG payload.
    pub fn encode_png(buf: &ImageBuf) -> Result<Self> {
        Self::encode_dynamic(&DynamicImage::ImageRgb8(buf.to_rgb8()))
    }

    pub fn encode_dynamic(img: &DynamicImage) -> Result<Self> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .context("encode image as PNG")?;
        Ok(Self::new(bytes, ImageFormat::Png.to_mime_type()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn id(&self) -> &ImageId {
        &self.id
    }

    /// Read dimensions from the header without decoding pixels.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        ImageReader::new(Cursor::new(self.bytes()))
            .with_guessed_format()
            .context("read image header")?
            .into_dimensions()
            .context("read image dimensions")
    }

    pub fn decode_dynamic(&self) -> Result<DynamicImage> {
        image::load_from_memory(self.bytes()).with_context(|| format!("decode {} payload", self.mime))
    }

    pub fn decode(&self) -> Result<ImageBuf> {
        Ok(ImageBuf::from_dynamic(&self.decode_dynamic()?))
    }
}
