//! UI state container.
//!
//! One owner writes through `update`; anyone else subscribes and receives a
//! snapshot after every change.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Everything the presentation layer renders
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub input_text: String,
    pub morse_code: String,
    pub displayed_text: String,
    pub is_playing: bool,
}

/// What the display renders
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayState<'a> {
    pub visible_text: &'a str,
    pub morse_text: &'a str,
    pub is_playing: bool,
}

impl UiState {
    pub fn display(&self) -> DisplayState<'_> {
        DisplayState {
            visible_text: &self.displayed_text,
            morse_text: &self.morse_code,
            is_playing: self.is_playing,
        }
    }

    /// The reveal has not caught up with the full message yet
    pub fn is_revealing(&self) -> bool {
        self.displayed_text.chars().count() < self.morse_code.chars().count()
    }

    pub fn has_morse_code(&self) -> bool {
        !self.morse_code.is_empty()
    }
}

#[derive(Default)]
pub struct Store {
    state: UiState,
    subscribers: Vec<Sender<UiState>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Receive a snapshot now and after every later change
    pub fn subscribe(&mut self) -> Receiver<UiState> {
        let (tx, rx) = unbounded();
        // Receiver is alive, cannot fail
        let _ = tx.send(self.state.clone());
        self.subscribers.push(tx);
        rx
    }

    /// Apply `mutate` and notify subscribers if anything changed.
    /// Returns whether the state changed.
    pub fn update(&mut self, mutate: impl FnOnce(&mut UiState)) -> bool {
        let mut next = self.state.clone();
        mutate(&mut next);
        if next == self.state {
            return false;
        }

        self.state = next;
        let state = &self.state;
        self.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
        true
    }
}
