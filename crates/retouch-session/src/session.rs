use tracing::{debug, info};

use retouch_core::{
    AdjustmentDelta, AdjustmentState, ImageBuf, Param, Pipeline, PresetEngine, RenderPlan,
    SourceImage,
};
use retouch_history::{HistoryStore, VersionId};
use retouch_mask::MaskSurface;

use crate::config::SessionConfig;
use crate::error::EditError;
use crate::services::CommitSink;

/// The single open image: its working payload, live adjustments, selection
/// mask and version history.
///
/// Adjustment edits are local and synchronous. Only a change of the pixel
/// payload (see [`EditingSession::commit`]) adds a version.
pub struct EditingSession {
    config: SessionConfig,
    pipeline: Pipeline,
    presets: PresetEngine,
    source: Option<SourceImage>,
    adjustments: AdjustmentState,
    mask: MaskSurface,
    history: HistoryStore,
    sinks: Vec<Box<dyn CommitSink>>,
}

impl EditingSession {
    pub fn new(config: SessionConfig) -> Result<Self, EditError> {
        Ok(Self {
            pipeline: Pipeline::with_grain_seed(config.grain_seed),
            presets: PresetEngine::new(),
            source: None,
            adjustments: AdjustmentState::default(),
            mask: MaskSurface::new(1, 1, config.brush_size)?,
            history: HistoryStore::new(),
            sinks: Vec::new(),
            config,
        })
    }

    pub fn with_presets(mut self, presets: PresetEngine) -> Self {
        self.presets = presets;
        self
    }

    pub fn add_sink(&mut self, sink: impl CommitSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Open a new image, discarding the previous one with its history.
    /// Adjustments reset to defaults and the image becomes the baseline.
    pub fn load_image(&mut self, source: SourceImage) -> Result<VersionId, EditError> {
        let (width, height) = source
            .dimensions()
            .map_err(|err| EditError::Validation(format!("{err:#}")))?;
        let (dw, dh) = display_size(width, height, self.config.preview_max_edge);
        let mask = MaskSurface::new(dw, dh, self.config.brush_size)?;

        let mut history = HistoryStore::new();
        let adjustments = AdjustmentState::default();
        let baseline = history.start(source.clone(), adjustments.clone())?.id();

        info!(id = %source.id(), width, height, mime = source.mime(), "image loaded");
        self.source = Some(source);
        self.adjustments = adjustments;
        self.mask = mask;
        self.history = history;
        Ok(baseline)
    }

    pub fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<VersionId, EditError> {
        let source =
            SourceImage::sniff(bytes).map_err(|err| EditError::Validation(format!("{err:#}")))?;
        self.load_image(source)
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn adjustments(&self) -> &AdjustmentState {
        &self.adjustments
    }

    /// Returns the clamped value actually stored.
    pub fn set_adjustment(&mut self, param: Param, value: f32) -> f32 {
        self.adjustments.set(param, value)
    }

    pub fn reset_adjustments(&mut self) {
        self.adjustments = AdjustmentState::default();
    }

    /// Replace the whole state with the preset's look.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), EditError> {
        let state = self
            .presets
            .apply(name)
            .ok_or_else(|| EditError::UnknownPreset(name.to_string()))?;
        info!(preset = name, "preset applied");
        self.adjustments = state;
        Ok(())
    }

    pub fn auto_enhance(&mut self) {
        self.adjustments = self.presets.auto_enhance();
    }

    /// Overlay a partial result onto the current state.
    pub fn merge_adjustments(&mut self, delta: &AdjustmentDelta) {
        self.adjustments.apply(delta);
    }

    pub fn presets(&self) -> &PresetEngine {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut PresetEngine {
        &mut self.presets
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Make a version the working image and state. History is untouched.
    pub fn select_version(&mut self, id: VersionId) -> Result<(), EditError> {
        let version = self.history.get(id)?;
        let (dw, dh) = self.display_size_of(version.source())?;
        self.mask.resize(dw, dh)?;
        self.source = Some(version.source().clone());
        self.adjustments = version.adjustments().clone();
        debug!(%id, label = version.label(), "version selected");
        Ok(())
    }

    pub fn is_active_version(&self, id: VersionId) -> bool {
        self.source
            .as_ref()
            .is_some_and(|s| self.history.is_active(id, s.id(), &self.adjustments))
    }

    /// Prepend a version for a new pixel payload and make it the working
    /// image. The current adjustments are snapshotted with it.
    pub fn commit(
        &mut self,
        label: impl Into<String>,
        source: SourceImage,
    ) -> Result<VersionId, EditError> {
        if self.source.is_none() {
            return Err(EditError::NoImage);
        }
        let (dw, dh) = self.display_size_of(&source)?;
        self.mask.resize(dw, dh)?;
        let version = self
            .history
            .commit(label, source.clone(), self.adjustments.clone())?;
        for sink in &self.sinks {
            sink.on_commit(version);
        }
        let id = version.id();
        self.source = Some(source);
        Ok(id)
    }

    /// Mask surface size for `source`. The mask follows the working image so
    /// its strokes keep the image's aspect ratio.
    fn display_size_of(&self, source: &SourceImage) -> Result<(u32, u32), EditError> {
        let (width, height) = source.dimensions().map_err(EditError::resource)?;
        Ok(display_size(width, height, self.config.preview_max_edge))
    }

    pub fn mask(&self) -> &MaskSurface {
        &self.mask
    }

    pub fn mask_mut(&mut self) -> &mut MaskSurface {
        &mut self.mask
    }

    /// Follow a change of the displayed image size.
    pub fn resize_display(&mut self, width: u32, height: u32) -> Result<(), EditError> {
        self.mask.resize(width, height)?;
        Ok(())
    }

    pub fn render_plan(&self) -> RenderPlan {
        self.pipeline.plan(&self.adjustments)
    }

    /// Render the working image scaled to the preview size.
    pub fn render_preview(&self) -> Result<ImageBuf, EditError> {
        let buf = self.decode()?.downsample(self.config.preview_max_edge);
        self.render(&buf)
    }

    pub fn render_full(&self) -> Result<ImageBuf, EditError> {
        self.render(&self.decode()?)
    }

    fn decode(&self) -> Result<ImageBuf, EditError> {
        self.source
            .as_ref()
            .ok_or(EditError::NoImage)?
            .decode()
            .map_err(EditError::resource)
    }

    fn render(&self, buf: &ImageBuf) -> Result<ImageBuf, EditError> {
        self.pipeline
            .render(buf, &self.adjustments)
            .map_err(EditError::resource)
    }
}

/// Fit `width x height` within `max_edge`, keeping the aspect ratio.
pub fn display_size(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || max_edge == 0 {
        return (width.max(1), height.max(1));
    }
    let scale = max_edge as f32 / longest as f32;
    (
        (width as f32 * scale).round().max(1.0) as u32,
        (height as f32 * scale).round().max(1.0) as u32,
    )
}
