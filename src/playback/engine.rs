//! Drives a tone device through the timed element plan of a message.
//!
//! The engine never sleeps. `start` keys the first element, then the owner
//! calls `poll` with the current time; each call runs every step that has come
//! due and reports when the next one will be. Between polls the engine is
//! suspended at a delay boundary.
//!
//! Each element ends a fixed duration after the previous one was due, not after
//! the poll that noticed it, so small wake-up delays do not add up over a
//! message. A poll later than `MAX_LATENESS` starts the timeline over from
//! that poll instead of rushing through the missed elements.

use std::time::{Duration, Instant};

use super::state::PlaybackStatus;
use super::timing::{schedule, Element};
use crate::audio::{DeviceError, ToneDevice, ToneOutput};
use crate::cancel::{CancelToken, Generation};
use crate::clock::Clock;
use crate::morse::EncodedMessage;

/// How far behind schedule a poll may be before the timeline is re-anchored
const MAX_LATENESS: Duration = Duration::from_millis(50);

/// Everything owned by one playback, dropped as a unit when it ends
struct PlaybackSession<D> {
    steps: Vec<Element>,
    cursor: usize,
    token: CancelToken,
    device: D,
    sounding: bool,
    due: Instant,
}

impl<D: ToneDevice> PlaybackSession<D> {
    /// Finish the current element and begin the next one.
    /// Returns false when the plan is exhausted.
    fn step(&mut self, now: Instant) -> Result<bool, DeviceError> {
        if self.sounding {
            self.sounding = false;
            self.device.stop_tone()?;
        }

        let Some(&element) = self.steps.get(self.cursor) else {
            return Ok(false);
        };
        self.cursor += 1;

        if let Element::Tone { frequency_hz, .. } = element {
            self.device.start_tone(frequency_hz)?;
            self.sounding = true;
        }
        let late_by = now.saturating_duration_since(self.due);
        let base = if late_by > MAX_LATENESS {
            log::debug!("Playback {}ms behind, re-anchoring", late_by.as_millis());
            now
        } else {
            self.due
        };
        self.due = base + element.duration();

        Ok(true)
    }
}

pub struct PlaybackEngine<O: ToneOutput> {
    output: O,
    status: PlaybackStatus,
    generation: Generation,
    session: Option<PlaybackSession<O::Device>>,
}

impl<O: ToneOutput> PlaybackEngine<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            status: PlaybackStatus::Idle,
            generation: Generation::new(),
            session: None,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Begin playing `encoded`.
    ///
    /// Ignored while already playing or for an empty message. A fresh device
    /// is acquired for every session; if that fails the engine logs it and
    /// stays Idle. The first element starts when the device is ready, so the
    /// clock is read after acquiring. Returns true if a session is running
    /// afterwards.
    pub fn start<C: Clock + ?Sized>(&mut self, encoded: &EncodedMessage, clock: &C) -> bool {
        if self.status.is_playing() {
            log::debug!("Playback already in progress, ignoring start");
            return false;
        }
        if encoded.is_empty() {
            return false;
        }

        self.status = PlaybackStatus::Playing;
        let token = self.generation.advance();

        let device = match self.output.acquire() {
            Ok(device) => device,
            Err(e) => {
                log::error!("Error acquiring tone device: {}", e);
                self.finish();
                return false;
            }
        };

        let now = clock.now();
        log::info!("Playing {} Morse symbols", encoded.len());
        self.session = Some(PlaybackSession {
            steps: schedule(encoded),
            cursor: 0,
            token,
            device,
            sounding: false,
            due: now,
        });

        self.poll(now);
        self.status.is_playing()
    }

    /// Run every step due at `now`. Returns when the engine next needs polling,
    /// or None once it is Idle.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        loop {
            let session = self.session.as_mut()?;

            if !self.status.is_playing() || session.token.is_cancelled() {
                self.finish();
                return None;
            }
            if now < session.due {
                return Some(session.due);
            }

            match session.step(now) {
                Ok(true) => {}
                Ok(false) => {
                    log::debug!("Playback complete");
                    self.finish();
                    return None;
                }
                Err(e) => {
                    log::error!("Error playing Morse code: {}", e);
                    self.finish();
                    return None;
                }
            }
        }
    }

    /// Stop playback, silencing any tone and releasing the device. No-op when Idle.
    pub fn stop(&mut self) {
        if !self.status.is_playing() && self.session.is_none() {
            return;
        }
        log::debug!("Stopping playback");
        self.finish();
    }

    fn finish(&mut self) {
        self.status = PlaybackStatus::Idle;
        self.generation.cancel();

        if let Some(mut session) = self.session.take() {
            if session.sounding {
                if let Err(e) = session.device.stop_tone() {
                    log::warn!("Failed to silence tone: {}", e);
                }
            }
            session.device.release();
        }
    }
}

impl<O: ToneOutput> Drop for PlaybackEngine<O> {
    fn drop(&mut self) {
        self.finish();
    }
}
