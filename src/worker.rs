//! Runs the controller on its own thread.
//!
//! The thread sleeps until a command arrives or the next reveal tick or tone
//! edge is due, so timing does not depend on how often the window repaints.
//! The UI sends `ControllerCommand`s and renders the latest `UiState` snapshot.

use crossbeam_channel::{at, bounded, never, select, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use thiserror::Error;

use crate::audio::ToneOutput;
use crate::clock::Clock;
use crate::controller::Controller;
use crate::messages::ControllerCommand;
use crate::store::UiState;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("unable to start controller thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("controller thread exited during startup")]
    Startup,
}

/// UI side of the controller thread
pub struct ControllerHandle {
    cmd_tx: Sender<ControllerCommand>,
    state_rx: Receiver<UiState>,
    state: UiState,
    thread: Option<JoinHandle<()>>,
}

impl ControllerHandle {
    /// Start the controller thread. `notify` is called from that thread after
    /// every state change, typically to request a repaint.
    pub fn spawn<O, C, F>(output: O, clock: C, notify: F) -> Result<Self, WorkerError>
    where
        O: ToneOutput + Send + 'static,
        C: Clock + Send + 'static,
        F: Fn() + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);

        let thread = thread::Builder::new()
            .name("morse-controller".to_string())
            .spawn(move || {
                // Built here so the audio device never leaves this thread
                let mut controller = Controller::new(output, clock);
                if ready_tx.send(controller.subscribe()).is_err() {
                    return;
                }
                run(controller, cmd_rx, notify);
            })?;

        let state_rx = ready_rx.recv().map_err(|_| WorkerError::Startup)?;
        log::debug!("Controller thread started");

        Ok(Self {
            cmd_tx,
            state_rx,
            state: UiState::default(),
            thread: Some(thread),
        })
    }

    pub fn send(&self, cmd: ControllerCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::error!("Controller thread is gone, command dropped");
        }
    }

    /// Take in every snapshot published since the last call
    pub fn refresh(&mut self) {
        if let Some(state) = self.state_rx.try_iter().last() {
            self.state = state;
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Stop playback, release the device and wait for the thread to exit
    pub fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let _ = self.cmd_tx.send(ControllerCommand::Shutdown);
        if thread.join().is_err() {
            log::error!("Controller thread panicked");
        }
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<O: ToneOutput, C: Clock>(
    mut controller: Controller<O, C>,
    cmd_rx: Receiver<ControllerCommand>,
    notify: impl Fn(),
) {
    let mut next_due: Option<Instant> = None;
    let mut published = controller.state().clone();

    loop {
        let timer = next_due.map(at).unwrap_or_else(never);

        select! {
            recv(cmd_rx) -> cmd => match cmd {
                Ok(ControllerCommand::UpdateText(text)) => controller.update_text(&text),
                Ok(ControllerCommand::Convert) => controller.convert(),
                Ok(ControllerCommand::TogglePlayback) => controller.toggle_playback(),
                Ok(ControllerCommand::UpdateAudioSettings(settings)) => {
                    // Takes effect from the next playback, each one opens a fresh device
                    controller.output_mut().update_settings(settings);
                }
                Ok(ControllerCommand::Shutdown) | Err(_) => {
                    controller.shutdown();
                    notify();
                    log::debug!("Controller thread stopped");
                    return;
                }
            },
            recv(timer) -> _ => {}
        }

        next_due = controller.tick();

        if controller.state() != &published {
            published = controller.state().clone();
            notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::testing::{DeviceEvent, RecordingOutput};
    use std::time::Duration;

    fn spawn(output: &RecordingOutput) -> (ControllerHandle, Receiver<()>) {
        let (wake_tx, wake_rx) = unbounded();
        let handle = ControllerHandle::spawn(output.clone(), SystemClock, move || {
            let _ = wake_tx.send(());
        })
        .unwrap();
        (handle, wake_rx)
    }

    #[test]
    fn test_runs_timelines_without_being_polled() {
        let output = RecordingOutput::with_system_clock();
        let (mut handle, wake_rx) = spawn(&output);

        handle.send(ControllerCommand::UpdateText("E".to_string()));
        handle.send(ControllerCommand::Convert);
        handle.send(ControllerCommand::TogglePlayback);

        // Only wake-ups from the controller thread move things along here
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            handle.refresh();
            let state = handle.state();
            if state.displayed_text == "." && !state.is_playing && output.released_count() == 1 {
                break;
            }
            assert!(Instant::now() < deadline, "controller stalled at {:?}", state);
            let _ = wake_rx.recv_timeout(Duration::from_millis(50));
        }

        let events = output.events();
        assert_eq!(output.tone_count(), 1);
        let (DeviceEvent::ToneOn { at: on, .. }, DeviceEvent::ToneOff { at: off }) =
            (&events[1], &events[2])
        else {
            panic!("unexpected device events {:?}", events);
        };
        // Wall clock, so only roughly 120ms
        let length = *off - *on;
        assert!(length >= Duration::from_millis(100), "dot too short: {:?}", length);
        assert!(length < Duration::from_millis(400), "dot too long: {:?}", length);
    }

    #[test]
    fn test_shutdown_releases_device_mid_playback() {
        let output = RecordingOutput::with_system_clock();
        let (mut handle, _wake_rx) = spawn(&output);

        handle.send(ControllerCommand::UpdateText("SOS".to_string()));
        handle.send(ControllerCommand::Convert);
        handle.send(ControllerCommand::TogglePlayback);
        handle.shutdown();

        assert_eq!(output.acquired_count(), 1);
        assert_eq!(output.released_count(), 1);

        // Already stopped
        handle.shutdown();
        handle.send(ControllerCommand::TogglePlayback);
        assert_eq!(output.acquired_count(), 1);
    }

    #[test]
    fn test_snapshots_follow_commands() {
        let output = RecordingOutput::with_system_clock();
        let (mut handle, wake_rx) = spawn(&output);

        handle.send(ControllerCommand::UpdateText("hi".to_string()));
        wake_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.refresh();

        assert_eq!(handle.state().input_text, "hi");
        assert!(!handle.state().has_morse_code());
    }
}
