// Waveform normalization: decode a captured payload into PCM and re-encode
// it as a portable RIFF/WAVE container.
//
// The capture device's native framing is treated as opaque bytes up to this
// point; here symphonia probes and decodes it, and hound serializes the
// result so every exported take is self-describing regardless of how it was
// captured.

use std::io::Cursor;

use anyhow::anyhow;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::RecorderError;

/// Interleaved PCM pulled out of a captured payload. Rate and channel count
/// come from the decoded source, never from this component.
struct PcmBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

/// Decode a raw captured payload and re-encode it as RIFF/WAVE bytes.
///
/// Pure and deterministic: same payload in, same container out, no partial
/// success. Fails with `DecodeFailure` when the payload is empty, corrupt,
/// or in a container symphonia cannot read.
pub fn encode_wav(raw: &[u8]) -> Result<Vec<u8>, RecorderError> {
    if raw.is_empty() {
        return Err(RecorderError::DecodeFailure(anyhow!("payload is empty")));
    }

    let pcm = decode_payload(raw)?;
    write_wav(&pcm)
}

fn decode_payload(raw: &[u8]) -> Result<PcmBuffer, RecorderError> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(raw.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| RecorderError::DecodeFailure(anyhow!(e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| RecorderError::DecodeFailure(anyhow!("no decodable track in payload")))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| RecorderError::DecodeFailure(anyhow!(e)))?;

    let mut samples: Vec<i16> = Vec::new();
    let mut sample_rate = 0u32;
    let mut channels = 0u16;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream. Streamed captures declare unknown chunk sizes,
            // so EOF can arrive before the container claims it should.
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(RecorderError::DecodeFailure(anyhow!(e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(RecorderError::DecodeFailure(anyhow!(e))),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count() as u16;

        let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    if samples.is_empty() {
        return Err(RecorderError::DecodeFailure(anyhow!(
            "payload decoded to zero samples"
        )));
    }

    debug!(
        "Decoded payload: {} samples, {}Hz, {} channels",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(PcmBuffer {
        samples,
        sample_rate,
        channels,
    })
}

fn write_wav(pcm: &PcmBuffer) -> Result<Vec<u8>, RecorderError> {
    let spec = hound::WavSpec {
        channels: pcm.channels,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in &pcm.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}
