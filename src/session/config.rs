use serde::{Deserialize, Serialize};

/// Configuration for a recording session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Stable per-session speaker identifier. Generated once when the
    /// session is created and frozen for its lifetime; every take id is
    /// `{speaker_id}-{script_index}`.
    pub speaker_id: String,
}

impl SessionConfig {
    pub fn with_speaker_id(speaker_id: impl Into<String>) -> Self {
        Self {
            speaker_id: speaker_id.into(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            speaker_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}
