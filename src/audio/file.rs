// File-backed capture device
//
// Streams an existing encoded audio file as a fragment stream. The
// concatenated payload is byte-identical to the source file, so whatever
// container the file uses flows through decode unchanged. Used for batch
// processing and deterministic tests.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

use super::backend::{CaptureDevice, Fragment, StreamHandle};

/// Bytes per fragment when replaying a file.
const FRAGMENT_BYTES: usize = 4096;

pub struct FileDevice {
    path: PathBuf,
    name: String,
    pending: Option<Vec<u8>>,
    armed: bool,
}

impl FileDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self {
            path,
            name,
            pending: None,
            armed: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for FileDevice {
    async fn request_access(&mut self) -> Result<StreamHandle> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read capture source: {}", self.path.display()))?;

        info!(
            "Capture source opened: {} ({} bytes)",
            self.path.display(),
            bytes.len()
        );

        self.pending = Some(bytes);
        Ok(StreamHandle::new(0))
    }

    async fn arm(&mut self, _handle: StreamHandle) -> Result<mpsc::Receiver<Fragment>> {
        let bytes = self
            .pending
            .take()
            .context("arm called before access was granted")?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            for chunk in bytes.chunks(FRAGMENT_BYTES) {
                if tx.send(chunk.to_vec()).await.is_err() {
                    break;
                }
            }
        });

        self.armed = true;
        Ok(rx)
    }

    async fn disarm(&mut self) -> Result<()> {
        // The replay task closes the channel once the file is exhausted;
        // nothing to tear down here.
        self.armed = false;
        Ok(())
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn name(&self) -> &str {
        &self.name
    }
}
