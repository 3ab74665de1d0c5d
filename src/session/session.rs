use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::audio::{CaptureDevice, FragmentBuffer};
use crate::error::RecorderError;

/// Lifecycle of a single take.
///
/// The raw payload exists only in `Captured`; the fragment buffer is
/// populated only between arm and stop of one take. Keeping the payload
/// inside the variant makes "captured but no payload" unrepresentable.
#[derive(Debug)]
pub enum TakeState {
    /// Nothing in progress, nothing held.
    Idle,
    /// Device access requested, capture not yet confirmed.
    Arming,
    /// Device armed; fragments are streaming into the buffer.
    Recording,
    /// Capture finished; the raw payload is held for preview or export.
    Captured { payload: Vec<u8> },
}

impl TakeState {
    pub fn name(&self) -> &'static str {
        match self {
            TakeState::Idle => "idle",
            TakeState::Arming => "arming",
            TakeState::Recording => "recording",
            TakeState::Captured { .. } => "captured",
        }
    }
}

/// State machine for one recording take.
///
/// Coordinates the capture device and the fragment buffer. Transitions are
/// driven only by `start()`, `stop()`, and `reset()`; illegal transitions
/// are warn-logged no-ops rather than errors, since they indicate
/// double-invocation at the control surface, not data corruption.
pub struct RecordingSession {
    device: Box<dyn CaptureDevice>,

    /// Shared with the fragment pump task; the only concurrent-write path.
    buffer: Arc<Mutex<FragmentBuffer>>,

    state: TakeState,

    /// Bumped on every arm and every reset. The pump task snapshots it at
    /// spawn and abandons appends once its snapshot falls behind, so
    /// fragments from an abandoned take never leak into the next one.
    generation: Arc<AtomicU64>,

    /// Moves fragments from the device stream into the buffer in delivery
    /// order.
    pump: Option<JoinHandle<()>>,
}

impl RecordingSession {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            device,
            buffer: Arc::new(Mutex::new(FragmentBuffer::new())),
            state: TakeState::Idle,
            generation: Arc::new(AtomicU64::new(0)),
            pump: None,
        }
    }

    /// Begin a take: request device access, arm the device, and start the
    /// fragment pump.
    ///
    /// Requires `Idle`. Suspends while the platform decides on access;
    /// denial (or no device at all) fails with `DeviceUnavailable` and the
    /// session returns to `Idle` with partial state discarded.
    pub async fn start(&mut self) -> Result<(), RecorderError> {
        if !matches!(self.state, TakeState::Idle) {
            warn!("start() ignored: session is {}", self.state.name());
            return Ok(());
        }

        self.state = TakeState::Arming;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_buffer().clear();

        let handle = match self.device.request_access().await {
            Ok(handle) => handle,
            Err(e) => {
                self.state = TakeState::Idle;
                return Err(RecorderError::DeviceUnavailable(e));
            }
        };

        let mut rx = match self.device.arm(handle).await {
            Ok(rx) => rx,
            Err(e) => {
                self.state = TakeState::Idle;
                return Err(RecorderError::DeviceUnavailable(e));
            }
        };

        let buffer = Arc::clone(&self.buffer);
        let gen_counter = Arc::clone(&self.generation);
        self.pump = Some(tokio::spawn(async move {
            while let Some(fragment) = rx.recv().await {
                if gen_counter.load(Ordering::SeqCst) != generation {
                    // This take was abandoned while the fragment was in
                    // flight.
                    break;
                }
                match buffer.lock() {
                    Ok(mut buffer) => buffer.push(fragment),
                    Err(poisoned) => poisoned.into_inner().push(fragment),
                }
            }
        }));

        self.state = TakeState::Recording;
        info!("Recording started on {}", self.device.name());

        Ok(())
    }

    /// End the take: disarm the device, flush every in-flight fragment, and
    /// assemble the raw payload.
    ///
    /// Requires `Recording`. A take with zero fragments still transitions to
    /// `Captured`, with an empty payload; export treats that as
    /// `EmptyCapture` rather than a crash.
    pub async fn stop(&mut self) {
        if !matches!(self.state, TakeState::Recording) {
            warn!("stop() ignored: session is {}", self.state.name());
            return;
        }

        if let Err(e) = self.device.disarm().await {
            warn!("Device disarm reported an error: {}", e);
        }

        // Disarm closes the fragment stream; the pump drains what is left
        // and exits, so every delivered fragment lands before we assemble.
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                warn!("Fragment pump ended abnormally: {}", e);
            }
        }

        let payload = self.lock_buffer().take_payload();
        info!("Capture stopped: {} bytes", payload.len());

        self.state = TakeState::Captured { payload };
    }

    /// Return to `Idle`, discarding any buffer contents and payload.
    ///
    /// Valid from every state and idempotent. Bumping the generation first
    /// means a still-running pump (or a late device-access completion)
    /// cannot write into the next take.
    pub async fn reset(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        if let Some(pump) = self.pump.take() {
            pump.abort();
        }

        if matches!(self.state, TakeState::Arming | TakeState::Recording) {
            if let Err(e) = self.device.disarm().await {
                warn!("Device disarm during reset failed: {}", e);
            }
        }

        self.lock_buffer().clear();
        self.state = TakeState::Idle;
    }

    pub fn state(&self) -> &TakeState {
        &self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, TakeState::Idle)
    }

    /// Raw payload of the captured take; `None` outside `Captured`.
    pub fn payload(&self) -> Option<&[u8]> {
        match &self.state {
            TakeState::Captured { payload } => Some(payload.as_slice()),
            _ => None,
        }
    }

    /// Fragments accumulated so far, for diagnostics.
    pub fn fragment_count(&self) -> usize {
        self.lock_buffer().fragment_count()
    }

    fn lock_buffer(&self) -> MutexGuard<'_, FragmentBuffer> {
        // A poisoned lock means the pump panicked mid-push; the buffer is
        // still structurally sound.
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
