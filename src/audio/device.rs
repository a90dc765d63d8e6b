use thiserror::Error;

use crate::config::AudioSettings;

/// Failures opening or driving a tone device
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("unable to read output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("unable to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("unable to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio callback is no longer receiving commands")]
    Disconnected,

    #[error("output stream failed: {0}")]
    Stream(String),
}

/// Something that can hand out a fresh tone device
pub trait ToneOutput {
    type Device: ToneDevice;

    fn acquire(&mut self) -> Result<Self::Device, DeviceError>;

    /// New level settings, used from the next acquired device on
    fn update_settings(&mut self, _settings: AudioSettings) {}
}

/// An acquired tone device. Timing is the caller's job: a tone keeps sounding
/// until `stop_tone` is called.
pub trait ToneDevice {
    fn start_tone(&mut self, frequency_hz: u32) -> Result<(), DeviceError>;

    fn stop_tone(&mut self) -> Result<(), DeviceError>;

    /// Give the device back. Consumes it, so it can only happen once.
    fn release(self);
}
