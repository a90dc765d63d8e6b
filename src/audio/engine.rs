use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::device::{DeviceError, ToneDevice, ToneOutput};
use super::tone::ToneGenerator;
use crate::config::AudioSettings;
use crate::messages::ToneCommand;

/// Opens the default cpal output device, once per playback session
pub struct CpalOutput {
    settings: AudioSettings,
}

impl CpalOutput {
    pub fn new(settings: AudioSettings) -> Self {
        Self { settings }
    }
}

impl ToneOutput for CpalOutput {
    type Device = CpalDevice;

    fn update_settings(&mut self, settings: AudioSettings) {
        self.settings = settings;
    }

    fn acquire(&mut self) -> Result<CpalDevice, DeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;

        let supported_config = device.default_output_config()?;
        let sample_rate = supported_config.sample_rate().0;

        let (cmd_tx, cmd_rx) = bounded::<ToneCommand>(64);
        let failure = Arc::new(Mutex::new(None));
        let drained = Arc::new(AtomicBool::new(false));
        let voice = KeyedVoice {
            generator: ToneGenerator::new(
                sample_rate,
                self.settings.master_volume,
                self.settings.ramp_ms,
            ),
            cmd_rx,
            released: false,
            drained: Arc::clone(&drained),
        };

        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(
                &device,
                &supported_config.into(),
                voice,
                Arc::clone(&failure),
            )?,
            cpal::SampleFormat::I16 => build_stream::<i16>(
                &device,
                &supported_config.into(),
                voice,
                Arc::clone(&failure),
            )?,
            cpal::SampleFormat::U16 => build_stream::<u16>(
                &device,
                &supported_config.into(),
                voice,
                Arc::clone(&failure),
            )?,
            other => return Err(DeviceError::UnsupportedFormat(format!("{:?}", other))),
        };

        stream.play()?;
        log::debug!("Opened audio output at {} Hz", sample_rate);

        Ok(CpalDevice {
            cmd_tx,
            failure,
            drained,
            ramp: Duration::from_secs_f32(self.settings.ramp_ms.max(0.0) / 1000.0),
            stream,
        })
    }
}

/// Callback side of a device: applies queued commands, then renders
struct KeyedVoice {
    generator: ToneGenerator,
    cmd_rx: Receiver<ToneCommand>,
    released: bool,
    drained: Arc<AtomicBool>,
}

impl KeyedVoice {
    fn render(&mut self, buffer: &mut [f32]) {
        loop {
            match self.cmd_rx.try_recv() {
                Ok(ToneCommand::Start { frequency_hz }) => {
                    self.generator.key_down(frequency_hz as f32)
                }
                Ok(ToneCommand::Stop) => self.generator.key_up(),
                Err(TryRecvError::Empty) => break,
                // Device released, fade out whatever is left
                Err(TryRecvError::Disconnected) => {
                    self.generator.key_up();
                    self.released = true;
                    break;
                }
            }
        }

        self.generator.fill_buffer(buffer);

        if self.released && !self.generator.is_sounding() {
            self.drained.store(true, Ordering::Release);
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut voice: KeyedVoice,
    failure: Arc<Mutex<Option<String>>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut mono_buffer = Vec::new();

    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let num_frames = data.len() / channels;
            mono_buffer.resize(num_frames, 0.0);
            voice.render(&mut mono_buffer);

            // Duplicate mono to all channels
            for (frame, &sample) in data.chunks_mut(channels).zip(mono_buffer.iter()) {
                let converted: T = T::from_sample(sample);
                for channel_sample in frame.iter_mut() {
                    *channel_sample = converted;
                }
            }
        },
        move |err| {
            log::error!("Audio stream error: {}", err);
            if let Ok(mut failure) = failure.lock() {
                *failure = Some(err.to_string());
            }
        },
        None,
    )
}

/// Longest wait for the release ramp on top of the ramp itself
const DRAIN_MARGIN: Duration = Duration::from_millis(100);

/// A live output stream keyed through a command channel
pub struct CpalDevice {
    cmd_tx: Sender<ToneCommand>,
    failure: Arc<Mutex<Option<String>>>,
    // Set by the callback once released and faded to silence
    drained: Arc<AtomicBool>,
    ramp: Duration,
    stream: cpal::Stream,
}

impl CpalDevice {
    fn send(&self, cmd: ToneCommand) -> Result<(), DeviceError> {
        if let Some(reason) = self.failure.lock().ok().and_then(|f| f.clone()) {
            return Err(DeviceError::Stream(reason));
        }

        match self.cmd_tx.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                Err(DeviceError::Stream("audio callback stalled".to_string()))
            }
            Err(TrySendError::Disconnected(_)) => Err(DeviceError::Disconnected),
        }
    }
}

impl ToneDevice for CpalDevice {
    fn start_tone(&mut self, frequency_hz: u32) -> Result<(), DeviceError> {
        self.send(ToneCommand::Start { frequency_hz })
    }

    fn stop_tone(&mut self) -> Result<(), DeviceError> {
        self.send(ToneCommand::Stop)
    }

    /// Lets the release ramp play out before pausing, so stopping mid-tone
    /// does not click.
    fn release(self) {
        let CpalDevice {
            cmd_tx,
            drained,
            ramp,
            stream,
            ..
        } = self;

        if let Err(e) = cmd_tx.try_send(ToneCommand::Stop) {
            // Closing the channel below keys up as well
            log::debug!("Stop not queued on release: {}", e);
        }
        drop(cmd_tx);

        let deadline = Instant::now() + ramp + DRAIN_MARGIN;
        while !drained.load(Ordering::Acquire) {
            if Instant::now() >= deadline {
                log::warn!("Audio output did not fade out in time");
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }

        if let Err(e) = stream.pause() {
            log::warn!("Failed to pause audio stream: {}", e);
        }
        log::debug!("Released audio output");
    }
}
