//! Freehand selection masks painted over the displayed image.
//!
//! Strokes are kept as normalized segment lists and drawn through a
//! [`Rasterizer`], so the same stroke data can be replayed at display size
//! after a resize or at full image resolution for export.

mod error;
pub mod export;
pub mod raster;
pub mod stroke;
pub mod surface;

pub use error::MaskError;
pub use export::MaskImage;
pub use raster::{Rasterizer, SoftwareRasterizer};
pub use stroke::{BrushMode, Point, Stroke, StrokeMode};
pub use surface::MaskSurface;
