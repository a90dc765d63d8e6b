use crossbeam_channel::Receiver;
use std::time::Instant;

use crate::audio::ToneOutput;
use crate::clock::Clock;
use crate::morse::{encode, EncodedMessage};
use crate::playback::PlaybackEngine;
use crate::reveal::{RevealScheduler, RevealSequence};
use crate::store::{Store, UiState};

/// Owns the UI state and both timelines (reveal and playback).
///
/// Nothing here runs on its own: the owner calls `tick`, which advances
/// whatever is due and says when to come back.
pub struct Controller<O: ToneOutput, C: Clock> {
    store: Store,
    clock: C,
    encoded: EncodedMessage,
    reveal: RevealScheduler,
    reveal_sequence: Option<RevealSequence>,
    playback: PlaybackEngine<O>,
}

impl<O: ToneOutput, C: Clock> Controller<O, C> {
    pub fn new(output: O, clock: C) -> Self {
        Self {
            store: Store::new(),
            clock,
            encoded: EncodedMessage::default(),
            reveal: RevealScheduler::new(),
            reveal_sequence: None,
            playback: PlaybackEngine::new(output),
        }
    }

    pub fn state(&self) -> &UiState {
        self.store.state()
    }

    pub fn subscribe(&mut self) -> Receiver<UiState> {
        self.store.subscribe()
    }

    pub fn output_mut(&mut self) -> &mut O {
        self.playback.output_mut()
    }

    pub fn update_text(&mut self, text: &str) {
        self.store.update(|s| s.input_text = text.to_string());
    }

    /// Encode the current input and restart the reveal animation
    pub fn convert(&mut self) {
        let encoded = encode(&self.store.state().input_text);
        log::debug!("Converted {} symbols", encoded.len());

        self.store.update(|s| {
            s.morse_code = encoded.to_string();
            s.displayed_text.clear();
        });

        let now = self.clock.now();
        self.reveal_sequence = Some(self.reveal.start(encoded.clone(), now));
        self.encoded = encoded;
        self.tick();
    }

    pub fn toggle_playback(&mut self) {
        if self.playback.status().is_playing() {
            self.playback.stop();
        } else {
            self.playback.start(&self.encoded, &self.clock);
        }
        self.sync_playback();
    }

    /// Advance both timelines to the current time.
    /// Returns the earliest instant anything is due next.
    pub fn tick(&mut self) -> Option<Instant> {
        let now = self.clock.now();

        let reveal_due = match self.reveal_sequence.as_mut() {
            Some(sequence) => {
                while let Some(reveal) = sequence.poll(now) {
                    self.store
                        .update(|s| s.displayed_text = reveal.visible_text().to_string());
                }
                let due = sequence.next_due();
                if sequence.is_finished() {
                    self.reveal_sequence = None;
                }
                due
            }
            None => None,
        };

        let playback_due = self.playback.poll(now);
        self.sync_playback();

        match (reveal_due, playback_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancel the reveal and release the audio device
    pub fn shutdown(&mut self) {
        self.reveal.cancel();
        self.reveal_sequence = None;
        self.playback.stop();
        self.sync_playback();
    }

    fn sync_playback(&mut self) {
        let is_playing = self.playback.status().is_playing();
        self.store.update(|s| s.is_playing = is_playing);
    }
}
