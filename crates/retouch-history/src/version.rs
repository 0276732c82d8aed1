use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use retouch_core::{AdjustmentState, SourceImage};

pub const BASELINE_LABEL: &str = "Original";

/// Stable identifier of a [`Version`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(Uuid);

impl VersionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Immutable snapshot: pixel payload plus the adjustments active when it
/// was captured. Fields are read-only once created.
#[derive(Clone, Debug)]
pub struct Version {
    id: VersionId,
    label: String,
    source: SourceImage,
    adjustments: AdjustmentState,
    created_at: SystemTime,
}

impl Version {
    pub(crate) fn new(label: impl Into<String>, source: SourceImage, adjustments: AdjustmentState) -> Self {
        Self {
            id: VersionId::new(),
            label: label.into(),
            source,
            adjustments,
            created_at: SystemTime::now(),
        }
    }

    pub fn id(&self) -> VersionId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn adjustments(&self) -> &AdjustmentState {
        &self.adjustments
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = VersionId::new();
        let b = VersionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn id_serializes_as_plain_uuid() {
        let id = VersionId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: VersionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
