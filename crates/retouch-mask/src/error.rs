#[derive(thiserror::Error, Debug)]
pub enum MaskError {
    #[error("invalid mask dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("mask surface {width}x{height} exceeds the allocation limit")]
    TooLarge { width: u32, height: u32 },

    #[error("encode mask: {0}")]
    Encode(#[from] image::ImageError),
}
