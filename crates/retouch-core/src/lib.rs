//! Non-destructive adjustment core: parameter state, the ordered render
//! plan with its CPU renderer, preset looks, and the image payload types the
//! rest of the workspace passes around.

pub mod adjust;
pub mod color;
pub mod image_buf;
pub mod pipeline;
pub mod presets;
pub mod source;

pub use adjust::{AdjustmentDelta, AdjustmentState, Param};
pub use image_buf::ImageBuf;
pub use pipeline::{Pipeline, RenderPlan, RenderStage};
pub use presets::{Preset, PresetEngine};
pub use source::{ImageId, SourceImage};
