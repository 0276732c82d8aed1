use anyhow::Result;

use crate::image_buf::ImageBuf;

/// CPU implementation of a single render stage.
///
/// Implementors carry their own typed parameters; the same values are what a
/// GPU or compositor renderer receives through the render plan.
pub trait ProcessingModule: Send + Sync {
    fn name(&self) -> &str;
    fn process_cpu(&self, input: ImageBuf) -> Result<ImageBuf>;
}

/// Apply `f` to every pixel and clamp the result into [0, 1].
pub(crate) fn map_pixels(
    mut input: ImageBuf,
    mut f: impl FnMut(u32, u32, [f32; 3]) -> [f32; 3],
) -> ImageBuf {
    let width = input.width.max(1);
    for (i, pixel) in input.data.chunks_exact_mut(3).enumerate() {
        let x = (i as u32) % width;
        let y = (i as u32) / width;
        let out = f(x, y, [pixel[0], pixel[1], pixel[2]]);
        pixel[0] = out[0].clamp(0.0, 1.0);
        pixel[1] = out[1].clamp(0.0, 1.0);
        pixel[2] = out[2].clamp(0.0, 1.0);
    }
    input
}
