// Microphone capture backend using cpal.
//
// Fragments are framed as a streaming WAV byte sequence: the first fragment
// is a RIFF/WAVE header with unknown chunk sizes, every later fragment is
// raw 16-bit PCM from the input callback. Concatenated in delivery order
// they form a payload the waveform encoder can decode no matter where the
// fragment boundaries fall.
//
// cpal streams are not Send, so the stream lives on a dedicated thread that
// parks until disarm.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{CaptureDevice, Fragment, StreamHandle};

/// Fragment channel depth; input callbacks deliver every few milliseconds.
const FRAGMENT_CHANNEL_CAPACITY: usize = 256;

/// Default microphone input.
pub struct MicrophoneDevice {
    stop_flag: Option<Arc<AtomicBool>>,
    worker: Option<std::thread::JoinHandle<()>>,
    next_token: u64,
    armed: bool,
}

impl MicrophoneDevice {
    pub fn new() -> Self {
        Self {
            stop_flag: None,
            worker: None,
            next_token: 0,
            armed: false,
        }
    }
}

impl Default for MicrophoneDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureDevice for MicrophoneDevice {
    async fn request_access(&mut self) -> Result<StreamHandle> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no default input device"))?;

        let name = device.name().unwrap_or_else(|_| "unknown".to_string());

        device
            .default_input_config()
            .with_context(|| format!("Input device '{}' rejected config query", name))?;

        info!("Capture access granted: {}", name);

        self.next_token += 1;
        Ok(StreamHandle::new(self.next_token))
    }

    async fn arm(&mut self, _handle: StreamHandle) -> Result<mpsc::Receiver<Fragment>> {
        if self.armed {
            anyhow::bail!("microphone is already armed");
        }

        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        let worker_stop = Arc::clone(&stop_flag);
        let worker = std::thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || capture_worker(tx, worker_stop, ready_tx))
            .context("Failed to spawn capture thread")?;

        // Wait until the stream is confirmed playing (or failed to build).
        match tokio::task::spawn_blocking(move || ready_rx.recv()).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => {
                let _ = worker.join();
                return Err(e.context("Microphone failed to start"));
            }
            Ok(Err(_)) => {
                let _ = worker.join();
                anyhow::bail!("capture thread exited before confirming start");
            }
            Err(e) => anyhow::bail!("capture readiness wait failed: {}", e),
        }

        self.stop_flag = Some(stop_flag);
        self.worker = Some(worker);
        self.armed = true;

        info!("Microphone armed");

        Ok(rx)
    }

    async fn disarm(&mut self) -> Result<()> {
        if !self.armed {
            return Ok(());
        }

        if let Some(stop) = self.stop_flag.take() {
            stop.store(true, Ordering::SeqCst);
        }

        if let Some(worker) = self.worker.take() {
            // The worker polls the stop flag every few milliseconds; join it
            // off the async runtime.
            match tokio::task::spawn_blocking(move || worker.join()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => warn!("Capture thread panicked"),
                Err(e) => warn!("Capture thread join failed: {}", e),
            }
        }

        self.armed = false;
        info!("Microphone disarmed");

        Ok(())
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

/// Owns the cpal stream for the lifetime of one take.
fn capture_worker(
    tx: mpsc::Sender<Fragment>,
    stop: Arc<AtomicBool>,
    ready: std::sync::mpsc::Sender<Result<()>>,
) {
    let (stream, sample_rate, channels) = match open_input_stream(tx.clone()) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    // Header goes out before the stream plays: PCM fragments start flowing
    // the moment callbacks begin, and the payload must lead with the header.
    if tx
        .blocking_send(streaming_wav_header(sample_rate, channels))
        .is_err()
    {
        return;
    }

    if let Err(e) = stream.play() {
        let _ = ready.send(Err(anyhow!(e).context("Failed to start input stream")));
        return;
    }

    let _ = ready.send(Ok(()));

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(5));
    }

    // Dropping the stream stops the callbacks; the callback's sender clone
    // goes with it, and ours on return, which closes the fragment channel.
    drop(stream);
}

fn open_input_stream(tx: mpsc::Sender<Fragment>) -> Result<(cpal::Stream, u32, u16)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("no default input device"))?;
    let config = device
        .default_input_config()
        .context("Failed to query default input config")?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels();

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), tx, |s| {
            (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
        }),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), tx, |s| s),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), tx, |s| {
            (s as i32 - 32768) as i16
        }),
        other => anyhow::bail!("unsupported input sample format: {:?}", other),
    }?;

    Ok((stream, sample_rate, channels))
}

fn build_stream<T: cpal::SizedSample + 'static>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tx: mpsc::Sender<Fragment>,
    convert: fn(T) -> i16,
) -> Result<cpal::Stream> {
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mut bytes = Vec::with_capacity(data.len() * 2);
            for &sample in data {
                bytes.extend_from_slice(&convert(sample).to_le_bytes());
            }
            // try_send: the audio callback must never block. A full channel
            // means the receiver is gone or lagging; disarm is imminent.
            let _ = tx.try_send(bytes);
        },
        |err| warn!("Microphone stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// 44-byte RIFF/WAVE header with unknown chunk sizes, the framing used by
/// streaming PCM writers. Decoders read the data chunk to end of stream.
pub fn streaming_wav_header(sample_rate: u32, channels: u16) -> Fragment {
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = channels * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;

    let mut header = Vec::with_capacity(44);
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&u32::MAX.to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&16u32.to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes()); // PCM format tag
    header.extend_from_slice(&channels.to_le_bytes());
    header.extend_from_slice(&sample_rate.to_le_bytes());
    header.extend_from_slice(&byte_rate.to_le_bytes());
    header.extend_from_slice(&block_align.to_le_bytes());
    header.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    header.extend_from_slice(b"data");
    header.extend_from_slice(&u32::MAX.to_le_bytes());
    header
}
