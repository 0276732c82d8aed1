//! Seams to the external generative-edit and style-inference services.
//!
//! Both are opaque: the session only sees bytes in and bytes (or a partial
//! adjustment set) out. Timeouts and transport belong to the implementor.

use std::future::Future;

use anyhow::{Result, bail};

use retouch_core::{AdjustmentDelta, SourceImage};
use retouch_history::Version;

#[derive(Clone, Debug)]
pub struct EditRequest {
    pub prompt: String,
    pub image: SourceImage,
    /// PNG at the image's resolution, white where the edit applies.
    pub mask: Option<Vec<u8>>,
}

pub trait EditService: Send + Sync {
    /// Returns the edited image payload.
    fn edit_image(&self, request: EditRequest) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

pub trait StyleService: Send + Sync {
    /// Returns only the adjustments the service wants to change.
    fn generate_adjustments(
        &self,
        prompt: String,
        reference: Option<SourceImage>,
    ) -> impl Future<Output = Result<AdjustmentDelta>> + Send;
}

/// Notified after every committed version, e.g. to feed an export or
/// scoring pipeline. Nothing it does flows back into the session.
pub trait CommitSink: Send {
    fn on_commit(&self, version: &Version);
}

/// Stand-in for when no remote service is configured. Every call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unavailable;

impl EditService for Unavailable {
    async fn edit_image(&self, _request: EditRequest) -> Result<Vec<u8>> {
        bail!("no edit service configured")
    }
}

impl StyleService for Unavailable {
    async fn generate_adjustments(
        &self,
        _prompt: String,
        _reference: Option<SourceImage>,
    ) -> Result<AdjustmentDelta> {
        bail!("no style service configured")
    }
}
