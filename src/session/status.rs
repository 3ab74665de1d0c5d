use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a recording session for status queries.
///
/// Everything the surrounding application needs to render itself: the
/// sentence to display, the completion ratio for a progress indicator, and
/// whether the export action should be enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Current take state ("idle", "arming", "recording", "captured").
    pub state: String,

    /// Stable speaker identifier for this session.
    pub speaker_id: String,

    /// Index of the next sentence to be recorded.
    pub script_index: usize,

    /// Total number of sentences in the script.
    pub script_len: usize,

    /// Sentence to read next; absent once the script is complete.
    pub current_sentence: Option<String>,

    /// Completion ratio in [0.0, 1.0].
    pub progress: f64,

    /// When the session started.
    pub started_at: DateTime<Utc>,

    /// Ledger lines accumulated so far.
    pub ledger_lines: usize,

    /// Whether a captured, non-empty take is ready to export.
    pub can_export: bool,
}
