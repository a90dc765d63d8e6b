//! Typewriter-style reveal of the encoded message.
//!
//! A reveal session is a lazy sequence of snapshots, one per character, each
//! due `REVEAL_INTERVAL` after the previous one. The first (empty) snapshot is
//! due as soon as the session starts.

use std::time::{Duration, Instant};

use crate::cancel::{CancelToken, Generation};
use crate::morse::EncodedMessage;

/// Delay between revealing consecutive characters
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(80);

/// How much of the encoded message is on screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealState {
    pub encoded: EncodedMessage,
    pub visible_length: usize,
}

impl RevealState {
    pub fn visible_text(&self) -> &str {
        self.encoded.prefix(self.visible_length)
    }
}

/// Starts reveal sessions for one display, superseding the previous session each time
#[derive(Debug, Default)]
pub struct RevealScheduler {
    generation: Generation,
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin revealing `encoded`. Any sequence started earlier stops emitting.
    pub fn start(&mut self, encoded: EncodedMessage, now: Instant) -> RevealSequence {
        let token = self.generation.advance();
        log::debug!("Starting reveal of {} symbols", encoded.len());

        RevealSequence {
            total: encoded.len(),
            encoded,
            token,
            next_length: 0,
            due: now,
            done: false,
        }
    }

    /// Stop the in-flight session without starting a new one
    pub fn cancel(&mut self) {
        self.generation.cancel();
    }
}

pub struct RevealSequence {
    encoded: EncodedMessage,
    total: usize,
    token: CancelToken,
    next_length: usize,
    due: Instant,
    done: bool,
}

impl RevealSequence {
    /// True once the last snapshot was emitted or the session was superseded
    pub fn is_finished(&self) -> bool {
        self.done || self.token.is_cancelled()
    }

    /// When the next snapshot becomes available
    pub fn next_due(&self) -> Option<Instant> {
        if self.is_finished() {
            None
        } else {
            Some(self.due)
        }
    }

    /// Emit the next snapshot if it is due at `now`.
    ///
    /// Returns at most one snapshot per call; call again until None to catch up
    /// after a late poll.
    pub fn poll(&mut self, now: Instant) -> Option<RevealState> {
        if self.is_finished() || now < self.due {
            return None;
        }

        let state = RevealState {
            encoded: self.encoded.clone(),
            visible_length: self.next_length,
        };

        if self.next_length >= self.total {
            self.done = true;
        } else {
            self.next_length += 1;
            self.due += REVEAL_INTERVAL;
        }

        Some(state)
    }
}
