//! Recording session management
//!
//! This module provides the take lifecycle and its coordination:
//! - `RecordingSession`: the idle/arming/recording/captured state machine
//! - `SessionOrchestrator`: per-take workflow (begin, end, export, discard)
//! - `SessionConfig` / `SessionStatus`: session identity and snapshots

mod config;
mod orchestrator;
mod session;
mod status;

pub use config::SessionConfig;
pub use orchestrator::{CaptureSummary, ExportReceipt, SessionOrchestrator};
pub use session::{RecordingSession, TakeState};
pub use status::SessionStatus;
