pub mod config;
mod error;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod upscale;

pub use config::{ConfigHandle, SessionConfig};
pub use error::EditError;
pub use orchestrator::{EditOrchestrator, EditScope, Operation, QuickAction, UpscaleReport};
pub use services::{CommitSink, EditRequest, EditService, StyleService, Unavailable};
pub use session::EditingSession;
