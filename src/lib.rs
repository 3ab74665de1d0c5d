pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod ledger;
pub mod script;
pub mod session;
pub mod storage;

pub use audio::{
    CaptureDevice, CaptureDeviceFactory, CaptureSource, FileDevice, Fragment, FragmentBuffer,
    MicrophoneDevice, StreamHandle,
};
pub use config::Config;
pub use error::RecorderError;
pub use export::{DirectorySink, TakeSink};
pub use http::{create_router, AppState};
pub use ledger::{LedgerEntry, MetadataLedger, FIELD_SEPARATOR, LEDGER_STORE_KEY};
pub use script::ScriptCorpus;
pub use session::{
    CaptureSummary, ExportReceipt, RecordingSession, SessionConfig, SessionOrchestrator,
    SessionStatus, TakeState,
};
pub use storage::{FileLedgerStore, LedgerStore};
