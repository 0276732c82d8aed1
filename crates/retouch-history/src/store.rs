use std::collections::VecDeque;

use tracing::info;

use retouch_core::{AdjustmentState, ImageId, SourceImage};

use crate::version::{BASELINE_LABEL, Version, VersionId};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history already has a baseline")]
    AlreadyStarted,

    #[error("history has no baseline version")]
    NotStarted,

    #[error("unknown version {0}")]
    UnknownVersion(VersionId),
}

/// Newest-first list of versions with the baseline at the tail.
///
/// ```text
/// Empty -> [Original] -> [V_n, V_n-1, ..., Original]
/// ```
///
/// Versions are only ever prepended; nothing is removed or reordered.
#[derive(Clone, Debug, Default)]
pub struct HistoryStore {
    versions: VecDeque<Version>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the baseline for a freshly loaded image.
    pub fn start(
        &mut self,
        source: SourceImage,
        adjustments: AdjustmentState,
    ) -> Result<&Version, HistoryError> {
        if !self.versions.is_empty() {
            return Err(HistoryError::AlreadyStarted);
        }
        Ok(self.push(Version::new(BASELINE_LABEL, source, adjustments)))
    }

    /// Prepend a new version on top of the full history.
    pub fn commit(
        &mut self,
        label: impl Into<String>,
        source: SourceImage,
        adjustments: AdjustmentState,
    ) -> Result<&Version, HistoryError> {
        if self.versions.is_empty() {
            return Err(HistoryError::NotStarted);
        }
        Ok(self.push(Version::new(label, source, adjustments)))
    }

    fn push(&mut self, version: Version) -> &Version {
        info!(
            id = %version.id(),
            label = version.label(),
            image = %version.source().id(),
            depth = self.versions.len() + 1,
            "version committed"
        );
        self.versions.push_front(version);
        &self.versions[0]
    }

    pub fn get(&self, id: VersionId) -> Result<&Version, HistoryError> {
        self.versions
            .iter()
            .find(|v| v.id() == id)
            .ok_or(HistoryError::UnknownVersion(id))
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter()
    }

    pub fn ids(&self) -> Vec<VersionId> {
        self.versions.iter().map(Version::id).collect()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn latest(&self) -> Option<&Version> {
        self.versions.front()
    }

    pub fn baseline(&self) -> Option<&Version> {
        self.versions.back()
    }

    /// Whether the working image and adjustments are exactly this version.
    pub fn is_active(&self, id: VersionId, image: &ImageId, state: &AdjustmentState) -> bool {
        self.get(id)
            .map(|v| v.source().id() == image && v.adjustments() == state)
            .unwrap_or(false)
    }
}
