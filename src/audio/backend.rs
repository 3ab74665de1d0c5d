use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// A chunk of raw encoded audio delivered incrementally while capture is
/// active. Opaque to the session; only the waveform encoder interprets the
/// concatenated payload.
pub type Fragment = Vec<u8>;

/// Opaque proof that a device access request was granted. Consumed by
/// `arm()`; a handle is only meaningful to the device that issued it.
#[derive(Debug)]
pub struct StreamHandle {
    token: u64,
}

impl StreamHandle {
    pub fn new(token: u64) -> Self {
        Self { token }
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

/// Capture device abstraction
///
/// Implementations:
/// - `MicrophoneDevice`: default input device via cpal; fragments are framed
///   as a streaming WAV byte sequence
/// - `FileDevice`: streams an existing encoded audio file (batch processing
///   and tests)
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Request access to the underlying input. Suspends until the platform
    /// grants or denies; denial or absence of a device is an error.
    async fn request_access(&mut self) -> Result<StreamHandle>;

    /// Begin capturing and return the fragment stream. The channel closes
    /// once the device is disarmed and all in-flight fragments have been
    /// delivered.
    async fn arm(&mut self, handle: StreamHandle) -> Result<mpsc::Receiver<Fragment>>;

    /// Stop capturing and end the fragment stream.
    async fn disarm(&mut self) -> Result<()>;

    /// Whether the device is currently armed.
    fn is_armed(&self) -> bool;

    /// Device name for logging.
    fn name(&self) -> &str;
}

/// Capture source selection.
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Default microphone input.
    Microphone,
    /// Encoded audio file replayed as a fragment stream.
    File(PathBuf),
}

/// Capture device factory
pub struct CaptureDeviceFactory;

impl CaptureDeviceFactory {
    /// Create a capture device for the configured source.
    pub fn create(source: CaptureSource) -> Result<Box<dyn CaptureDevice>> {
        match source {
            CaptureSource::Microphone => Ok(Box::new(super::microphone::MicrophoneDevice::new())),
            CaptureSource::File(path) => Ok(Box::new(super::file::FileDevice::new(path))),
        }
    }
}
