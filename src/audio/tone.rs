/// Keyed sine oscillator with a raised cosine attack/release.
///
/// Unlike a fixed-length element, a keyed tone does not know in advance how
/// long it will sound, so the envelope follows the key state sample by sample.
pub struct ToneGenerator {
    frequency_hz: f32,
    sample_rate: f32,
    phase: f64,
    amplitude: f32,
    ramp_samples: usize,
    // 0 = silent, ramp_samples = fully on
    ramp_position: usize,
    key_down: bool,
}

impl ToneGenerator {
    pub fn new(sample_rate: u32, amplitude: f32, ramp_ms: f32) -> Self {
        let ramp_samples = ((sample_rate as f32 * ramp_ms / 1000.0) as usize).max(1);

        Self {
            frequency_hz: 0.0,
            sample_rate: sample_rate as f32,
            phase: 0.0,
            amplitude: amplitude.clamp(0.0, 1.0),
            ramp_samples,
            ramp_position: 0,
            key_down: false,
        }
    }

    /// Key the tone at `frequency_hz`
    pub fn key_down(&mut self, frequency_hz: f32) {
        if self.ramp_position == 0 {
            // Start from a zero crossing when coming out of silence
            self.phase = 0.0;
        }
        self.frequency_hz = frequency_hz;
        self.key_down = true;
    }

    /// Release the key; the tone fades out over the ramp
    pub fn key_up(&mut self) {
        self.key_down = false;
    }

    /// True while anything is audible, including the release ramp
    pub fn is_sounding(&self) -> bool {
        self.key_down || self.ramp_position > 0
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.key_down {
            self.ramp_position = (self.ramp_position + 1).min(self.ramp_samples);
        } else {
            self.ramp_position = self.ramp_position.saturating_sub(1);
        }

        if self.ramp_position == 0 {
            return 0.0;
        }

        let sample = (self.phase * 2.0 * std::f64::consts::PI).sin() as f32;
        self.phase += self.frequency_hz as f64 / self.sample_rate as f64;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample * self.envelope() * self.amplitude
    }

    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    fn envelope(&self) -> f32 {
        let position = self.ramp_position as f32 / self.ramp_samples as f32;
        0.5 * (1.0 - (std::f32::consts::PI * position).cos())
    }
}
