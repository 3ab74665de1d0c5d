// Shared test support: a fully scripted capture device and WAV fixtures.
#![allow(dead_code)]

use anyhow::Result;
use corpus_booth::{CaptureDevice, Fragment, StreamHandle};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Capture device driven entirely by the test.
///
/// Each `arm()` delivers the next scripted take's fragments, preloaded into
/// the channel so delivery order is deterministic. The live sender is
/// exposed so tests can push late fragments after a take was abandoned.
pub struct ScriptedDevice {
    takes: VecDeque<Vec<Fragment>>,
    deny_access: bool,
    close_on_disarm: bool,
    live_tx: Arc<Mutex<Option<mpsc::Sender<Fragment>>>>,
    armed: bool,
}

impl ScriptedDevice {
    pub fn new(takes: Vec<Vec<Fragment>>) -> Self {
        Self {
            takes: takes.into(),
            deny_access: false,
            close_on_disarm: true,
            live_tx: Arc::new(Mutex::new(None)),
            armed: false,
        }
    }

    /// A device whose access request is always denied.
    pub fn denying() -> Self {
        Self {
            deny_access: true,
            ..Self::new(Vec::new())
        }
    }

    /// A device that keeps the fragment channel open across disarm, to
    /// simulate fragments still in flight after a take is abandoned.
    pub fn leaky(takes: Vec<Vec<Fragment>>) -> Self {
        Self {
            close_on_disarm: false,
            ..Self::new(takes)
        }
    }

    /// Handle to the currently armed take's fragment sender.
    pub fn sender_handle(&self) -> Arc<Mutex<Option<mpsc::Sender<Fragment>>>> {
        Arc::clone(&self.live_tx)
    }
}

#[async_trait::async_trait]
impl CaptureDevice for ScriptedDevice {
    async fn request_access(&mut self) -> Result<StreamHandle> {
        if self.deny_access {
            anyhow::bail!("access denied by test");
        }
        Ok(StreamHandle::new(1))
    }

    async fn arm(&mut self, _handle: StreamHandle) -> Result<mpsc::Receiver<Fragment>> {
        let fragments = self.takes.pop_front().unwrap_or_default();
        let (tx, rx) = mpsc::channel(fragments.len() + 1);
        for fragment in fragments {
            tx.try_send(fragment).expect("scripted channel overflow");
        }
        *self.live_tx.lock().unwrap() = Some(tx);
        self.armed = true;
        Ok(rx)
    }

    async fn disarm(&mut self) -> Result<()> {
        self.armed = false;
        if self.close_on_disarm {
            *self.live_tx.lock().unwrap() = None;
        }
        Ok(())
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Complete WAV file bytes for the given interleaved samples.
pub fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Split a byte payload into `parts` fragments of roughly equal size.
pub fn split_fragments(bytes: Vec<u8>, parts: usize) -> Vec<Fragment> {
    let size = ((bytes.len() + parts - 1) / parts).max(1);
    bytes.chunks(size).map(<[u8]>::to_vec).collect()
}

/// Deterministic non-silent test signal.
pub fn tone_samples(count: usize) -> Vec<i16> {
    (0..count).map(|i| ((i % 64) as i16 - 32) * 256).collect()
}
