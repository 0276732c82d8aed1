use tracing::debug;

use crate::error::MaskError;
use crate::export::MaskImage;
use crate::raster::{Rasterizer, SoftwareRasterizer};
use crate::stroke::{BrushMode, Point, Stroke};

pub const MIN_BRUSH_SIZE: f32 = 1.0;

/// Paintable selection aligned to the displayed image.
///
/// Input points are in display coordinates. Strokes are stored normalized,
/// so a display resize re-rasterizes them at the new size instead of losing
/// them. A resize that arrives mid-stroke is held until the stroke ends.
pub struct MaskSurface<R: Rasterizer = SoftwareRasterizer> {
    raster: R,
    mode: BrushMode,
    brush_size: f32,
    strokes: Vec<Stroke>,
    active: Option<Stroke>,
    pending_resize: Option<(u32, u32)>,
}

impl MaskSurface<SoftwareRasterizer> {
    pub fn new(width: u32, height: u32, brush_size: f32) -> Result<Self, MaskError> {
        Ok(Self::with_rasterizer(
            SoftwareRasterizer::new(width, height)?,
            brush_size,
        ))
    }
}

impl<R: Rasterizer> MaskSurface<R> {
    pub fn with_rasterizer(raster: R, brush_size: f32) -> Self {
        Self {
            raster,
            mode: BrushMode::None,
            brush_size: brush_size.max(MIN_BRUSH_SIZE),
            strokes: Vec::new(),
            active: None,
            pending_resize: None,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }

    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }

    /// Brush diameter in display pixels for subsequent strokes.
    pub fn set_brush_size(&mut self, size: f32) {
        if size.is_finite() {
            self.brush_size = size.max(MIN_BRUSH_SIZE);
        }
    }

    /// True once any stroke has been started since the last clear.
    ///
    /// Submission must be gated on this flag, not on mask content: an
    /// erased-out mask still counts.
    pub fn has_mask(&self) -> bool {
        !self.strokes.is_empty() || self.active.is_some()
    }

    pub fn is_painting(&self) -> bool {
        self.active.is_some()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Start a stroke at `point`. Returns `false` (and does nothing) when the
    /// brush mode is `None`.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        let Some(mode) = self.mode.stroke_mode() else {
            return false;
        };
        if self.active.is_some() {
            self.end_stroke();
        }
        let (w, h) = self.raster.dimensions();
        self.raster
            .draw_segment(point, point, self.brush_size, mode);
        self.active = Some(Stroke::new(
            mode,
            self.brush_size / w.max(1) as f32,
            point.normalize(w, h),
        ));
        true
    }

    /// Draw a rounded segment from the last point to `point`.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        let (w, h) = self.raster.dimensions();
        let Some(stroke) = self.active.as_mut() else {
            return false;
        };
        let Some(last) = stroke.last() else {
            return false;
        };
        let diameter = stroke.diameter * w as f32;
        self.raster
            .draw_segment(last.denormalize(w, h), point, diameter, stroke.mode);
        stroke.points.push(point.normalize(w, h));
        true
    }

    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.active.take() {
            self.strokes.push(stroke);
        }
        self.apply_pending_resize();
    }

    /// Drop every stroke and blank the surface. A resize held back by an
    /// interrupted stroke takes effect here.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active = None;
        self.raster.clear();
        self.apply_pending_resize();
    }

    fn apply_pending_resize(&mut self) {
        if let Some((w, h)) = self.pending_resize.take()
            && let Err(err) = self.resize(w, h)
        {
            debug!(%err, "deferred mask resize failed");
        }
    }

    /// Follow a display resize. Existing strokes are re-rasterized at the
    /// new size; during an active stroke the resize is deferred.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), MaskError> {
        if self.raster.dimensions() == (width, height) {
            self.pending_resize = None;
            return Ok(());
        }
        if self.active.is_some() {
            debug!(width, height, "deferring mask resize until stroke ends");
            crate::raster::check_dimensions(width, height)?;
            self.pending_resize = Some((width, height));
            return Ok(());
        }
        self.raster.resize(width, height)?;
        replay(&mut self.raster, &self.strokes);
        debug!(width, height, strokes = self.strokes.len(), "mask resized");
        Ok(())
    }

    /// Snapshot at display size.
    pub fn export(&self) -> MaskImage {
        MaskImage::from_alpha(self.raster.alpha())
    }

    /// Re-rasterize every stroke at `width x height`, e.g. the source image
    /// resolution expected by the edit service.
    pub fn export_for(&self, width: u32, height: u32) -> Result<MaskImage, MaskError> {
        let mut target = SoftwareRasterizer::new(width, height)?;
        replay(&mut target, self.strokes.iter().chain(self.active.iter()));
        Ok(MaskImage::from_alpha(target.alpha()))
    }
}

fn replay<'a, R: Rasterizer>(raster: &mut R, strokes: impl IntoIterator<Item = &'a Stroke>) {
    let (w, h) = raster.dimensions();
    for stroke in strokes {
        let diameter = stroke.diameter * w as f32;
        for (a, b) in stroke.segments() {
            raster.draw_segment(a.denormalize(w, h), b.denormalize(w, h), diameter, stroke.mode);
        }
    }
}
