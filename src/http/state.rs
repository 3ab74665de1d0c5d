use crate::session::SessionOrchestrator;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for HTTP handlers
///
/// The orchestrator sits behind one async mutex, held for the duration of
/// each handler call. That serializes every take operation, so at most one
/// export is ever in flight; a racing second call observes the post-export
/// state and is rejected as a precondition no-op.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Mutex<SessionOrchestrator>>,
}

impl AppState {
    pub fn new(orchestrator: SessionOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
        }
    }
}
