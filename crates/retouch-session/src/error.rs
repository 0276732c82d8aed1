use retouch_history::{HistoryError, VersionId};
use retouch_mask::MaskError;

use crate::orchestrator::Operation;

/// Failure of a session or orchestrator operation. Every variant leaves the
/// session exactly as it was before the call.
#[derive(thiserror::Error, Debug)]
pub enum EditError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("edit service failed: {0}")]
    Service(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("{in_flight} already in progress")]
    Busy { in_flight: Operation },

    #[error("no image loaded")]
    NoImage,

    #[error("unknown version {0}")]
    UnknownVersion(VersionId),

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
}

impl EditError {
    pub(crate) fn service(err: anyhow::Error) -> Self {
        Self::Service(format!("{err:#}"))
    }

    pub(crate) fn resource(err: anyhow::Error) -> Self {
        Self::Resource(format!("{err:#}"))
    }
}

impl From<MaskError> for EditError {
    fn from(err: MaskError) -> Self {
        Self::Resource(err.to_string())
    }
}

impl From<HistoryError> for EditError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::UnknownVersion(id) => Self::UnknownVersion(id),
            HistoryError::NotStarted => Self::NoImage,
            HistoryError::AlreadyStarted => Self::Validation(err.to_string()),
        }
    }
}
