//! Time source for the timed sequences.
//!
//! Nothing in the core sleeps. Each sequence records the instant its next step
//! is due and is resumed by polling it with the current time, so a virtual
//! clock can drive a whole playback without waiting.

use std::time::Instant;

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
