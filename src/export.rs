use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info};

/// Destination for encoded take files.
///
/// Fire-and-forget from the core's point of view: emission failures are
/// logged, never returned.
pub trait TakeSink: Send + Sync {
    fn emit(&self, bytes: &[u8], filename: &str);
}

/// Writes exported takes into an output directory.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self { dir })
    }
}

impl TakeSink for DirectorySink {
    fn emit(&self, bytes: &[u8], filename: &str) {
        let path = self.dir.join(filename);
        match std::fs::write(&path, bytes) {
            Ok(()) => info!("Exported take: {} ({} bytes)", path.display(), bytes.len()),
            Err(e) => error!("Failed to write take {}: {}", path.display(), e),
        }
    }
}
