use crate::config::AudioSettings;

/// Messages from the playback engine to the audio callback
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToneCommand {
    /// Key the oscillator at this frequency
    Start { frequency_hz: u32 },
    /// Release the key
    Stop,
}

/// Messages from the UI to the controller thread
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerCommand {
    UpdateText(String),
    Convert,
    TogglePlayback,
    UpdateAudioSettings(AudioSettings),
    Shutdown,
}
