//! Single-flight coordination of the long-running edit operations.
//!
//! At most one of generative edit, upscale and style match runs at a time; a
//! second request while one is in flight fails with [`EditError::Busy`]
//! instead of queueing. Every operation either commits its complete result
//! or leaves the session untouched, and the busy slot is released on every
//! exit path by [`BusyGuard`].
//!
//! The session lock is never held across an await, so sliders, presets and
//! mask painting stay live while a request is out.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use retouch_core::{AdjustmentState, SourceImage};
use retouch_history::VersionId;

use crate::error::EditError;
use crate::services::{EditRequest, EditService, StyleService};
use crate::session::EditingSession;
use crate::upscale::{self, UpscalePlan};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    GenerativeEdit,
    Upscale,
    StyleMatch,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GenerativeEdit => "generative edit",
            Self::Upscale => "upscale",
            Self::StyleMatch => "style match",
        })
    }
}

/// Where a generative edit applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditScope {
    #[default]
    Whole,
    /// Only the painted mask region. Requires a mask.
    Selection,
}

/// One-click generative edits with fixed prompts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuickAction {
    RemoveBackground,
    EnhanceLighting,
    RemoveObject,
    Restore,
}

impl QuickAction {
    pub const ALL: [QuickAction; 4] = [
        Self::RemoveBackground,
        Self::EnhanceLighting,
        Self::RemoveObject,
        Self::Restore,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::RemoveBackground => "Remove Background",
            Self::EnhanceLighting => "Enhance Lighting",
            Self::RemoveObject => "Remove Object",
            Self::Restore => "Restore",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::RemoveBackground => {
                "Remove the background and keep only the main subject on a clean transparent background"
            }
            Self::EnhanceLighting => {
                "Improve the lighting with balanced exposure, natural highlights and recovered shadows"
            }
            Self::RemoveObject => {
                "Remove the selected object and fill the area so it blends seamlessly with its surroundings"
            }
            Self::Restore => "Restore this photo: remove scratches, dust and noise and sharpen faded detail",
        }
    }

    pub fn scope(self) -> EditScope {
        match self {
            Self::RemoveObject => EditScope::Selection,
            _ => EditScope::Whole,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpscaleReport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
    /// `None` when the image was already at or above the target.
    pub version: Option<VersionId>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the busy slot for one operation and frees it on drop.
struct BusyGuard<'a> {
    slot: &'a Mutex<Option<Operation>>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(slot: &'a Mutex<Option<Operation>>, op: Operation) -> Result<Self, EditError> {
        let mut current = lock(slot);
        if let Some(in_flight) = *current {
            warn!(requested = %op, %in_flight, "rejected while busy");
            return Err(EditError::Busy { in_flight });
        }
        *current = Some(op);
        Ok(Self { slot })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

pub struct EditOrchestrator<E, S> {
    session: Mutex<EditingSession>,
    in_flight: Mutex<Option<Operation>>,
    editor: E,
    stylist: S,
}

impl<E: EditService, S: StyleService> EditOrchestrator<E, S> {
    pub fn new(session: EditingSession, editor: E, stylist: S) -> Self {
        Self {
            session: Mutex::new(session),
            in_flight: Mutex::new(None),
            editor,
            stylist,
        }
    }

    /// Lock the session for local, synchronous work.
    pub fn session(&self) -> MutexGuard<'_, EditingSession> {
        lock(&self.session)
    }

    pub fn into_session(self) -> EditingSession {
        self.session
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn in_flight(&self) -> Option<Operation> {
        *lock(&self.in_flight)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight().is_some()
    }

    /// Send the working image (and for a selection, the mask) to the edit
    /// service and commit the result as a version labelled with the prompt.
    pub async fn generative_edit(
        &self,
        prompt: &str,
        scope: EditScope,
    ) -> Result<VersionId, EditError> {
        let prompt = prompt.trim();
        self.edit_labelled(prompt, prompt, scope).await
    }

    pub async fn quick_action(&self, action: QuickAction) -> Result<VersionId, EditError> {
        self.edit_labelled(action.prompt(), action.label(), action.scope())
            .await
    }

    async fn edit_labelled(
        &self,
        prompt: &str,
        label: &str,
        scope: EditScope,
    ) -> Result<VersionId, EditError> {
        let _busy = BusyGuard::acquire(&self.in_flight, Operation::GenerativeEdit)?;
        settle(
            Operation::GenerativeEdit,
            self.run_edit(prompt, label, scope).await,
        )
    }

    async fn run_edit(
        &self,
        prompt: &str,
        label: &str,
        scope: EditScope,
    ) -> Result<VersionId, EditError> {
        if prompt.is_empty() {
            return Err(EditError::Validation("prompt is empty".into()));
        }
        let (image, mask, baseline) = {
            let session = self.session();
            let image = session.source().cloned().ok_or(EditError::NoImage)?;
            let mask = match scope {
                EditScope::Whole => None,
                EditScope::Selection => {
                    if !session.mask().has_mask() {
                        return Err(EditError::Validation(
                            "selection edit requires a painted mask".into(),
                        ));
                    }
                    let (w, h) = image.dimensions().map_err(EditError::resource)?;
                    let selection = session.mask().export_for(w, h)?;
                    debug!(coverage = selection.coverage(), width = w, height = h, "selection exported");
                    Some(selection.to_png()?)
                }
            };
            (image, mask, session.history().baseline().map(|v| v.id()))
        };

        info!(%prompt, ?scope, image = %image.id(), "requesting generative edit");
        let bytes = self
            .editor
            .edit_image(EditRequest {
                prompt: prompt.to_string(),
                image,
                mask,
            })
            .await
            .map_err(EditError::service)?;
        let edited = decoded_payload(bytes)?;

        let mut session = self.session();
        ensure_same_image(&session, baseline)?;
        let id = session.commit(label, edited)?;
        if scope == EditScope::Selection {
            session.mask_mut().clear();
        }
        Ok(id)
    }

    /// Resample the working image towards the configured pixel target.
    pub async fn upscale(&self) -> Result<UpscaleReport, EditError> {
        let _busy = BusyGuard::acquire(&self.in_flight, Operation::Upscale)?;
        settle(Operation::Upscale, self.run_upscale().await)
    }

    async fn run_upscale(&self) -> Result<UpscaleReport, EditError> {
        let (source, target, baseline) = {
            let session = self.session();
            let source = session.source().cloned().ok_or(EditError::NoImage)?;
            let target = session.config().upscale_target_pixels;
            (source, target, session.history().baseline().map(|v| v.id()))
        };
        let (width, height) = source.dimensions().map_err(EditError::resource)?;
        let plan = UpscalePlan::new(width, height, target);
        if plan.is_noop() {
            info!(width, height, target, "image already at upscale target");
            return Ok(UpscaleReport {
                width,
                height,
                scale_factor: plan.scale_factor,
                version: None,
            });
        }

        info!(
            from = ?(width, height),
            to = ?(plan.width, plan.height),
            factor = plan.scale_factor,
            "upscaling"
        );
        let resampled = tokio::task::spawn_blocking(move || upscale::resample(&source, plan))
            .await
            .map_err(|err| EditError::Resource(err.to_string()))?
            .map_err(EditError::resource)?;

        let mut session = self.session();
        ensure_same_image(&session, baseline)?;
        let id = session.commit(upscale::label(target), resampled)?;
        Ok(UpscaleReport {
            width: plan.width,
            height: plan.height,
            scale_factor: plan.scale_factor,
            version: Some(id),
        })
    }

    /// Ask the style service for adjustments and merge them onto the
    /// current state. Fields it does not return are left alone.
    pub async fn style_match(
        &self,
        prompt: &str,
        reference: Option<SourceImage>,
    ) -> Result<AdjustmentState, EditError> {
        let _busy = BusyGuard::acquire(&self.in_flight, Operation::StyleMatch)?;
        settle(
            Operation::StyleMatch,
            self.run_style_match(prompt.trim(), reference).await,
        )
    }

    async fn run_style_match(
        &self,
        prompt: &str,
        reference: Option<SourceImage>,
    ) -> Result<AdjustmentState, EditError> {
        if prompt.is_empty() && reference.is_none() {
            return Err(EditError::Validation(
                "style match needs a prompt or a reference image".into(),
            ));
        }
        let delta = self
            .stylist
            .generate_adjustments(prompt.to_string(), reference)
            .await
            .map_err(EditError::service)?;
        info!(fields = delta.len(), "style adjustments received");

        let mut session = self.session();
        session.merge_adjustments(&delta);
        Ok(session.adjustments().clone())
    }
}

fn settle<T>(op: Operation, result: Result<T, EditError>) -> Result<T, EditError> {
    if let Err(err) = &result {
        warn!(operation = %op, %err, "operation failed, session unchanged");
    }
    result
}

/// Reject service output that is empty or not a readable image.
fn decoded_payload(bytes: Vec<u8>) -> Result<SourceImage, EditError> {
    if bytes.is_empty() {
        return Err(EditError::Service("edit service returned no payload".into()));
    }
    let source = SourceImage::sniff(bytes).map_err(EditError::service)?;
    source.dimensions().map_err(EditError::service)?;
    Ok(source)
}

fn ensure_same_image(
    session: &EditingSession,
    baseline: Option<VersionId>,
) -> Result<(), EditError> {
    if session.history().baseline().map(|v| v.id()) != baseline {
        return Err(EditError::Validation(
            "a different image was opened while the operation was in flight".into(),
        ));
    }
    Ok(())
}
