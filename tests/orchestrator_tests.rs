// Integration tests for the per-take workflow.
//
// These tests walk the orchestrator through whole sessions: capture, export,
// ledger bookkeeping, script advancement, failure isolation, and ledger
// persistence across restarts.

mod common;

use common::{split_fragments, tone_samples, wav_bytes, ScriptedDevice};
use corpus_booth::{
    DirectorySink, FileLedgerStore, LedgerStore, MetadataLedger, RecorderError, ScriptCorpus,
    SessionConfig, SessionOrchestrator, LEDGER_STORE_KEY,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

type Take = Vec<Vec<u8>>;

fn orchestrator_with(
    takes: Vec<Take>,
    dir: &TempDir,
    speaker: &str,
) -> SessionOrchestrator {
    let corpus = ScriptCorpus::from_sentences(vec![
        "hello world".to_string(),
        "goodbye".to_string(),
    ]);
    let device = ScriptedDevice::new(takes);
    let sink = DirectorySink::new(dir.path()).unwrap();
    let store = FileLedgerStore::new(dir.path()).unwrap();

    SessionOrchestrator::new(
        SessionConfig::with_speaker_id(speaker),
        corpus,
        Box::new(device),
        Box::new(sink),
        Box::new(store),
    )
    .unwrap()
}

#[tokio::test]
async fn full_session_walkthrough() {
    let dir = TempDir::new().unwrap();

    // Take 0: three fragments totaling 480 samples. Take at index 1 first
    // captures nothing, then succeeds on the re-record.
    let take0 = split_fragments(wav_bytes(&tone_samples(480), 16000, 1), 3);
    let retake1 = split_fragments(wav_bytes(&tone_samples(480), 16000, 1), 2);
    let mut orchestrator = orchestrator_with(vec![take0, vec![], retake1], &dir, "S1");

    // Sentence 0 records and exports
    orchestrator.begin_take().await.unwrap();
    assert_eq!(orchestrator.status().state, "recording");

    let summary = orchestrator.end_take().await;
    assert!(summary.can_export);

    let receipt = orchestrator.export_take().await.unwrap().unwrap();
    assert_eq!(receipt.take_id, "S1-0");
    assert_eq!(receipt.file_name, "S1-0.wav");
    assert_eq!(receipt.next_index, 1);

    let exported = dir.path().join("S1-0.wav");
    assert!(exported.exists(), "Exported WAV should be on disk");
    let reader = hound::WavReader::open(&exported).unwrap();
    assert_eq!(reader.len(), 480);

    assert_eq!(orchestrator.ledger_text(), "S1-0|hello world");
    let status = orchestrator.status();
    assert_eq!(status.script_index, 1);
    assert_eq!(status.current_sentence.as_deref(), Some("goodbye"));
    assert_eq!(status.progress, 0.5);

    // Sentence 1, first attempt: empty capture, export disabled
    orchestrator.begin_take().await.unwrap();
    let summary = orchestrator.end_take().await;
    assert!(!summary.can_export);
    assert_eq!(summary.payload_bytes, 0);

    let err = orchestrator.export_take().await.unwrap_err();
    assert!(matches!(err, RecorderError::EmptyCapture));
    assert_eq!(orchestrator.ledger_text(), "S1-0|hello world");
    assert_eq!(orchestrator.status().script_index, 1);

    // Re-record sentence 1 and export
    orchestrator.begin_take().await.unwrap();
    orchestrator.end_take().await;
    let receipt = orchestrator.export_take().await.unwrap().unwrap();
    assert_eq!(receipt.file_name, "S1-1.wav");
    assert!(dir.path().join("S1-1.wav").exists());

    assert_eq!(
        orchestrator.ledger_text(),
        "S1-0|hello world\nS1-1|goodbye"
    );
    let status = orchestrator.status();
    assert_eq!(status.script_index, 2);
    assert_eq!(status.progress, 1.0);
    assert_eq!(status.current_sentence, None);

    // Script complete: further takes are refused
    let err = orchestrator.begin_take().await.unwrap_err();
    assert!(matches!(err, RecorderError::ScriptComplete));
}

#[tokio::test]
async fn decode_failure_leaves_ledger_and_capture_intact() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = orchestrator_with(
        vec![vec![b"definitely not audio".to_vec()]],
        &dir,
        "S1",
    );

    orchestrator.begin_take().await.unwrap();
    orchestrator.end_take().await;

    let err = orchestrator.export_take().await.unwrap_err();
    assert!(matches!(err, RecorderError::DecodeFailure(_)));

    // Nothing exported, nothing appended, take still held for retry
    assert!(!dir.path().join("S1-0.wav").exists());
    assert_eq!(orchestrator.ledger_text(), "");
    assert_eq!(orchestrator.status().state, "captured");
    assert_eq!(orchestrator.status().script_index, 0);

    // The user can still discard and return to idle
    orchestrator.discard_take().await;
    assert_eq!(orchestrator.status().state, "idle");
}

#[tokio::test]
async fn discarded_take_can_be_rerecorded_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let take0 = split_fragments(wav_bytes(&tone_samples(480), 16000, 1), 2);
    let mut orchestrator =
        orchestrator_with(vec![vec![b"scrapped".to_vec()], take0], &dir, "S1");

    orchestrator.begin_take().await.unwrap();
    orchestrator.end_take().await;
    orchestrator.discard_take().await;

    assert_eq!(orchestrator.ledger_text(), "");
    assert_eq!(orchestrator.status().script_index, 0);

    // Same index, same identifier on the re-record
    orchestrator.begin_take().await.unwrap();
    orchestrator.end_take().await;
    let receipt = orchestrator.export_take().await.unwrap().unwrap();
    assert_eq!(receipt.take_id, "S1-0");
}

#[tokio::test]
async fn ledger_persists_and_rehydrates_across_sessions() {
    let dir = TempDir::new().unwrap();
    let take0 = split_fragments(wav_bytes(&tone_samples(480), 16000, 1), 2);

    {
        let mut orchestrator = orchestrator_with(vec![take0], &dir, "S1");
        orchestrator.begin_take().await.unwrap();
        orchestrator.end_take().await;
        orchestrator.export_take().await.unwrap().unwrap();
    }

    // The serialized form landed in the store
    let store = FileLedgerStore::new(dir.path()).unwrap();
    let stored = store.get(LEDGER_STORE_KEY).unwrap().unwrap();
    assert_eq!(stored, "S1-0|hello world");

    // restore(serialize()) is a fixed point
    let restored = MetadataLedger::restore(&stored);
    assert_eq!(restored.serialize(), stored);

    // A fresh session over the same store starts with the old ledger but a
    // fresh script position
    let orchestrator = orchestrator_with(vec![], &dir, "S2");
    assert_eq!(orchestrator.ledger_text(), "S1-0|hello world");
    let status = orchestrator.status();
    assert_eq!(status.ledger_lines, 1);
    assert_eq!(status.script_index, 0);
}

#[tokio::test]
async fn clearing_the_ledger_empties_memory_and_store() {
    let dir = TempDir::new().unwrap();
    let take0 = split_fragments(wav_bytes(&tone_samples(480), 16000, 1), 2);

    let mut orchestrator = orchestrator_with(vec![take0], &dir, "S1");
    orchestrator.begin_take().await.unwrap();
    orchestrator.end_take().await;
    orchestrator.export_take().await.unwrap().unwrap();

    orchestrator.clear_ledger().unwrap();

    assert_eq!(orchestrator.ledger_text(), "");
    let store = FileLedgerStore::new(dir.path()).unwrap();
    assert_eq!(store.get(LEDGER_STORE_KEY).unwrap().as_deref(), Some(""));
}

#[tokio::test]
async fn concurrent_exports_produce_exactly_one_take() {
    let dir = TempDir::new().unwrap();
    let take0 = split_fragments(wav_bytes(&tone_samples(480), 16000, 1), 2);
    let orchestrator = orchestrator_with(vec![take0], &dir, "S1");
    let orchestrator = Arc::new(Mutex::new(orchestrator));

    {
        let mut guard = orchestrator.lock().await;
        guard.begin_take().await.unwrap();
        guard.end_take().await;
    }

    let first = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.lock().await.export_take().await }
    });
    let second = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.lock().await.export_take().await }
    });

    let results = [first.await.unwrap(), second.await.unwrap()];

    let exported = results
        .iter()
        .filter(|r| matches!(r, Ok(Some(_))))
        .count();
    let rejected = results.iter().filter(|r| matches!(r, Ok(None))).count();
    assert_eq!(exported, 1, "Exactly one export should win");
    assert_eq!(rejected, 1, "The loser must be a no-op");

    let guard = orchestrator.lock().await;
    assert_eq!(guard.ledger_text(), "S1-0|hello world");
    assert_eq!(guard.status().script_index, 1);
}
