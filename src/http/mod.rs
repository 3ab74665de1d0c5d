//! HTTP API server for external control (recording UI)
//!
//! This module provides a REST API for driving a recording session:
//! - POST /session/take/start - Begin recording the current sentence
//! - POST /session/take/stop - Stop recording, hold the take for export
//! - POST /session/take/export - Encode, emit the WAV, append the ledger
//! - POST /session/take/discard - Throw the captured take away
//! - GET /session/status - State, current sentence, completion ratio
//! - GET /session/ledger - Serialized ledger text
//! - DELETE /session/ledger - Clear the ledger
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
