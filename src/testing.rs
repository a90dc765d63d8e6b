//! Test doubles: a virtual clock and a recording tone output.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::audio::{DeviceError, ToneDevice, ToneOutput};
use crate::clock::{Clock, SystemClock};

/// Virtual clock that only moves when told to.
///
/// Clones share the same time, so a test can hand one copy to the code under
/// test and keep another to advance it.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    /// Jump to `instant`. Moving backwards is ignored.
    pub fn set(&self, instant: Instant) {
        let mut now = self.now.lock().unwrap();
        if instant > *now {
            *now = instant;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

/// What happened to the device, timestamped from when the output was created
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    Acquired,
    ToneOn { frequency_hz: u32, at: Duration },
    ToneOff { at: Duration },
    Released { at: Duration },
}

#[derive(Default)]
struct Shared {
    events: Vec<DeviceEvent>,
    fail_acquire: bool,
    acquire_delay: Duration,
    fail_on_tone: Option<usize>,
    fail_on_stop: Option<usize>,
    tones_started: usize,
    tones_stopped: usize,
}

/// Tone output that records every device call instead of making sound
#[derive(Clone)]
pub struct RecordingOutput {
    clock: Arc<dyn Clock + Send + Sync>,
    // Present when time is virtual, so a slow acquire can move it
    manual: Option<ManualClock>,
    origin: Instant,
    shared: Arc<Mutex<Shared>>,
}

impl RecordingOutput {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            origin: clock.now(),
            manual: Some(clock.clone()),
            clock: Arc::new(clock),
            shared: Arc::default(),
        }
    }

    /// Timestamps events against the wall clock
    pub fn with_system_clock() -> Self {
        Self {
            origin: SystemClock.now(),
            manual: None,
            clock: Arc::new(SystemClock),
            shared: Arc::default(),
        }
    }

    pub fn events(&self) -> Vec<DeviceEvent> {
        self.lock().events.clone()
    }

    pub fn fail_acquire(&self, fail: bool) {
        self.lock().fail_acquire = fail;
    }

    /// Opening the device takes `delay` of virtual time
    pub fn slow_acquire(&self, delay: Duration) {
        self.lock().acquire_delay = delay;
    }

    /// Make the `index`-th (zero-based) `start_tone` call fail
    pub fn fail_on_tone(&self, index: usize) {
        self.lock().fail_on_tone = Some(index);
    }

    /// Make the `index`-th (zero-based) `stop_tone` call fail
    pub fn fail_on_stop(&self, index: usize) {
        self.lock().fail_on_stop = Some(index);
    }

    pub fn acquired_count(&self) -> usize {
        self.count(|e| matches!(e, DeviceEvent::Acquired))
    }

    pub fn released_count(&self) -> usize {
        self.count(|e| matches!(e, DeviceEvent::Released { .. }))
    }

    pub fn tone_count(&self) -> usize {
        self.count(|e| matches!(e, DeviceEvent::ToneOn { .. }))
    }

    fn count(&self, predicate: impl Fn(&DeviceEvent) -> bool) -> usize {
        self.lock().events.iter().filter(|e| predicate(e)).count()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap()
    }

    fn elapsed(&self) -> Duration {
        self.clock.now() - self.origin
    }
}

impl ToneOutput for RecordingOutput {
    type Device = RecordingDevice;

    fn acquire(&mut self) -> Result<RecordingDevice, DeviceError> {
        let mut shared = self.lock();
        if shared.fail_acquire {
            return Err(DeviceError::NoOutputDevice);
        }
        if let Some(clock) = &self.manual {
            clock.advance(shared.acquire_delay);
        }
        shared.events.push(DeviceEvent::Acquired);
        drop(shared);

        Ok(RecordingDevice {
            output: self.clone(),
        })
    }
}

pub struct RecordingDevice {
    output: RecordingOutput,
}

impl ToneDevice for RecordingDevice {
    fn start_tone(&mut self, frequency_hz: u32) -> Result<(), DeviceError> {
        let at = self.output.elapsed();
        let mut shared = self.output.lock();

        let index = shared.tones_started;
        shared.tones_started += 1;
        if shared.fail_on_tone == Some(index) {
            return Err(DeviceError::Stream("simulated failure".to_string()));
        }

        shared.events.push(DeviceEvent::ToneOn { frequency_hz, at });
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), DeviceError> {
        let at = self.output.elapsed();
        let mut shared = self.output.lock();

        let index = shared.tones_stopped;
        shared.tones_stopped += 1;
        if shared.fail_on_stop == Some(index) {
            return Err(DeviceError::Disconnected);
        }

        shared.events.push(DeviceEvent::ToneOff { at });
        Ok(())
    }

    fn release(self) {
        let at = self.output.elapsed();
        self.output.lock().events.push(DeviceEvent::Released { at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();

        other.advance(Duration::from_millis(80));
        assert_eq!(clock.now() - start, Duration::from_millis(80));
    }

    #[test]
    fn test_manual_clock_never_goes_backwards() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance(Duration::from_millis(500));
        clock.set(start);
        assert_eq!(clock.now() - start, Duration::from_millis(500));
    }

    #[test]
    fn test_slow_acquire_moves_virtual_time() {
        let clock = ManualClock::new();
        let start = clock.now();
        let mut output = RecordingOutput::new(clock.clone());
        output.slow_acquire(Duration::from_millis(150));

        let device = output.acquire().unwrap();
        device.release();
        assert_eq!(clock.now() - start, Duration::from_millis(150));
        assert_eq!(
            output.events(),
            vec![
                DeviceEvent::Acquired,
                DeviceEvent::Released { at: Duration::from_millis(150) },
            ]
        );
    }
}
