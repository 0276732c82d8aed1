//! Append-only edit timeline.
//!
//! Versions are immutable snapshots of pixels plus adjustments. Going back
//! to an old version never discards anything: the next edit is prepended on
//! top of the full history.

pub mod store;
pub mod version;

pub use store::{HistoryError, HistoryStore};
pub use version::{BASELINE_LABEL, Version, VersionId};
