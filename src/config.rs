use anyhow::Result;
use serde::Deserialize;

use crate::audio::CaptureSource;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub corpus: CorpusConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Capture source: "microphone", or "file" with `input_path` set.
    pub device: String,
    pub input_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CorpusConfig {
    /// Plain-text script, one sentence per line.
    pub script_path: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportConfig {
    /// Where exported WAV takes land.
    pub output_dir: String,
    /// Where the serialized ledger persists.
    pub ledger_dir: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn capture_source(&self) -> Result<CaptureSource> {
        match self.audio.device.as_str() {
            "microphone" => Ok(CaptureSource::Microphone),
            "file" => {
                let path = self.audio.input_path.as_ref().ok_or_else(|| {
                    anyhow::anyhow!("audio.device = \"file\" requires audio.input_path")
                })?;
                Ok(CaptureSource::File(path.into()))
            }
            other => anyhow::bail!("Unknown capture device: {}", other),
        }
    }
}
