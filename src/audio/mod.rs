pub mod backend;
pub mod buffer;
pub mod file;
pub mod microphone;
pub mod waveform;

pub use backend::{CaptureDevice, CaptureDeviceFactory, CaptureSource, Fragment, StreamHandle};
pub use buffer::FragmentBuffer;
pub use file::FileDevice;
pub use microphone::MicrophoneDevice;
