use thiserror::Error;

/// Failure taxonomy for the recording core.
///
/// Every variant is recoverable: the session is left in a consistent state
/// and the user may retry the operation. Illegal state transitions are not
/// represented here at all; they are logged no-ops (UI double-invocation,
/// not data corruption).
#[derive(Debug, Error)]
pub enum RecorderError {
    /// No capture device exists, or access to it was denied.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(anyhow::Error),

    /// The stopped take contains zero fragments; there is nothing to export.
    #[error("capture produced no audio")]
    EmptyCapture,

    /// The raw payload could not be parsed as audio.
    #[error("captured payload could not be decoded: {0}")]
    DecodeFailure(anyhow::Error),

    /// Every sentence in the script has been recorded. A terminal signal,
    /// not a fault.
    #[error("script complete; no sentences left to record")]
    ScriptComplete,

    /// Serializing decoded PCM into the WAV container failed.
    #[error("failed to write waveform container")]
    WaveformWrite(#[from] hound::Error),
}
