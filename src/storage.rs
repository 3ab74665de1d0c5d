use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

/// Persistent key-value store for the serialized ledger.
///
/// The core only ever reads and writes whole values under a fixed key; the
/// implementation decides where the text lives.
pub trait LedgerStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Flat-file store: each key is a file in the configured directory.
pub struct FileLedgerStore {
    dir: PathBuf,
}

impl FileLedgerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create ledger directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl LedgerStore for FileLedgerStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read ledger file: {}", path.display()))
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write ledger file: {}", path.display()))?;
        debug!("Ledger persisted: {} ({} bytes)", path.display(), value.len());
        Ok(())
    }
}
