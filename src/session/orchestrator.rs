use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::config::SessionConfig;
use super::session::{RecordingSession, TakeState};
use super::status::SessionStatus;
use crate::audio::{waveform, CaptureDevice};
use crate::error::RecorderError;
use crate::export::TakeSink;
use crate::ledger::{MetadataLedger, LEDGER_STORE_KEY};
use crate::script::ScriptCorpus;
use crate::storage::LedgerStore;

/// Outcome of a successful export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReceipt {
    pub take_id: String,
    pub file_name: String,
    pub wav_bytes: usize,
    pub next_index: usize,
}

/// What `end_take()` captured.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureSummary {
    pub payload_bytes: usize,
    /// False for an empty capture; the export action should be disabled.
    pub can_export: bool,
}

/// Drives the per-take workflow and keeps script index, recording session,
/// and metadata ledger consistent.
///
/// The script index advances only on successful export, so a captured take
/// can be previewed, discarded, and re-recorded without side effects. A
/// ledger append happens strictly after a successful encode, never before.
pub struct SessionOrchestrator {
    config: SessionConfig,
    corpus: ScriptCorpus,
    session: RecordingSession,
    ledger: MetadataLedger,
    sink: Box<dyn TakeSink>,
    store: Box<dyn LedgerStore>,
    script_index: usize,
    started_at: DateTime<Utc>,
}

impl SessionOrchestrator {
    /// Create a session over the given script, rehydrating any previously
    /// persisted ledger. The script position always starts at zero; only
    /// the ledger text survives a restart.
    pub fn new(
        config: SessionConfig,
        corpus: ScriptCorpus,
        device: Box<dyn CaptureDevice>,
        sink: Box<dyn TakeSink>,
        store: Box<dyn LedgerStore>,
    ) -> Result<Self> {
        let ledger = match store.get(LEDGER_STORE_KEY)? {
            Some(text) => {
                let ledger = MetadataLedger::restore(&text);
                info!("Ledger restored: {} entries", ledger.len());
                ledger
            }
            None => MetadataLedger::new(),
        };

        info!(
            "Session created: speaker {}, {} sentences",
            config.speaker_id,
            corpus.len()
        );

        Ok(Self {
            config,
            corpus,
            session: RecordingSession::new(device),
            ledger,
            sink,
            store,
            script_index: 0,
            started_at: Utc::now(),
        })
    }

    /// Start recording the current sentence.
    ///
    /// Signals `ScriptComplete` once every sentence has been exported. A
    /// stale captured take from a prior discard is reset first.
    pub async fn begin_take(&mut self) -> Result<(), RecorderError> {
        if self.script_index >= self.corpus.len() {
            info!("Script complete; begin_take is a no-op");
            return Err(RecorderError::ScriptComplete);
        }

        if !self.session.is_idle() {
            self.session.reset().await;
        }

        self.session.start().await
    }

    /// Stop recording and report what was captured. Does not advance the
    /// script or touch the ledger; export is a separate, explicit step.
    pub async fn end_take(&mut self) -> CaptureSummary {
        self.session.stop().await;

        let payload_bytes = self.session.payload().map(<[u8]>::len).unwrap_or(0);
        CaptureSummary {
            payload_bytes,
            can_export: payload_bytes > 0,
        }
    }

    /// Encode the captured take, emit it as `<speaker>-<index>.wav`, append
    /// the ledger line, persist the ledger, advance the script, and reset.
    ///
    /// Returns `Ok(None)` when there is no captured take (double invocation
    /// or nothing recorded) — a logged no-op, not a failure. On
    /// `DecodeFailure` nothing is emitted or appended and the session stays
    /// `Captured` so the user can retry or discard.
    pub async fn export_take(&mut self) -> Result<Option<ExportReceipt>, RecorderError> {
        let payload = match self.session.payload() {
            Some(payload) => payload,
            None => {
                warn!(
                    "export ignored: no captured take (session is {})",
                    self.session.state_name()
                );
                return Ok(None);
            }
        };

        if payload.is_empty() {
            return Err(RecorderError::EmptyCapture);
        }

        let sentence = self
            .corpus
            .sentence(self.script_index)
            .ok_or(RecorderError::ScriptComplete)?
            .to_string();

        let wav = waveform::encode_wav(payload)?;

        let take_id = self.take_id();
        let file_name = format!("{}.wav", take_id);

        self.sink.emit(&wav, &file_name);
        self.ledger.append(&take_id, &sentence);
        self.persist_ledger();

        self.script_index += 1;
        self.session.reset().await;

        info!(
            "Take exported: {} ({} bytes), next index {}",
            file_name,
            wav.len(),
            self.script_index
        );

        Ok(Some(ExportReceipt {
            take_id,
            file_name,
            wav_bytes: wav.len(),
            next_index: self.script_index,
        }))
    }

    /// Throw away the captured (or in-progress) take without exporting.
    pub async fn discard_take(&mut self) {
        self.session.reset().await;
    }

    pub fn status(&self) -> SessionStatus {
        let can_export = self
            .session
            .payload()
            .map(|p| !p.is_empty())
            .unwrap_or(false);

        SessionStatus {
            state: self.session.state_name().to_string(),
            speaker_id: self.config.speaker_id.clone(),
            script_index: self.script_index,
            script_len: self.corpus.len(),
            current_sentence: self
                .corpus
                .sentence(self.script_index)
                .map(String::from),
            progress: self.corpus.progress(self.script_index),
            started_at: self.started_at,
            ledger_lines: self.ledger.len(),
            can_export,
        }
    }

    /// The full serialized ledger text.
    pub fn ledger_text(&self) -> String {
        self.ledger.serialize()
    }

    /// Empty the ledger, in memory and in the store.
    pub fn clear_ledger(&mut self) -> Result<()> {
        self.ledger.clear();
        self.store.set(LEDGER_STORE_KEY, "")?;
        info!("Ledger cleared");
        Ok(())
    }

    pub fn session_state(&self) -> &TakeState {
        self.session.state()
    }

    fn take_id(&self) -> String {
        format!("{}-{}", self.config.speaker_id, self.script_index)
    }

    fn persist_ledger(&self) {
        if let Err(e) = self.store.set(LEDGER_STORE_KEY, &self.ledger.serialize()) {
            // The in-memory ledger stays authoritative; persistence retries
            // on the next mutation.
            error!("Failed to persist ledger: {}", e);
        }
    }
}
