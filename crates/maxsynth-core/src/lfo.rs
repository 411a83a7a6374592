//! Low Frequency Oscillator for cutoff modulation.
//!
//! The synth runs a single free-running LFO per engine. It renders one block
//! at a time into a buffer that every voice reads, so all voices see the same
//! modulation phase.

use core::f32::consts::PI;
use libm::sinf;

/// LFO waveform type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LfoWaveform {
    /// Smooth, natural modulation.
    #[default]
    Sine,
    /// Linear ramps with hard corners.
    Triangle,
    /// Rising ramp with an abrupt reset.
    Saw,
    /// Binary high/low modulation.
    Square,
}

impl LfoWaveform {
    /// Every waveform in choice-index order.
    pub const ALL: [LfoWaveform; 4] = [
        LfoWaveform::Sine,
        LfoWaveform::Triangle,
        LfoWaveform::Square,
        LfoWaveform::Saw,
    ];

    /// Display labels in choice-index order.
    pub const LABELS: [&'static str; 4] = ["Sine", "Triangle", "Square", "Saw"];

    /// Waveform for a choice index. Unknown indices fall back to sine.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }
}

/// Low Frequency Oscillator for generating modulation signals.
///
/// Generates periodic waveforms in `[-1, 1]` at sub-audio frequencies
/// (typically 0.1-20 Hz) from a normalized phase accumulator.
///
/// # Example
///
/// ```rust
/// use maxsynth_core::{Lfo, LfoWaveform};
///
/// let mut lfo = Lfo::new(48000.0, 2.0); // 2 Hz
/// lfo.set_waveform(LfoWaveform::Triangle);
///
/// let value = lfo.next();
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    /// Sample rate in Hz
    sample_rate: f32,
    waveform: LfoWaveform,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 2.0)
    }
}

impl Lfo {
    /// Create new LFO with given sample rate and frequency
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz.max(0.0) / sample_rate,
            sample_rate,
            waveform: LfoWaveform::Sine,
        }
    }

    /// Set frequency in Hz. Phase is preserved.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz.max(0.0) / self.sample_rate;
    }

    /// Get current frequency in Hz
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Set waveform
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Get current waveform
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Reset phase to 0
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Get current phase (0.0 - 1.0)
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Get next LFO value (-1.0 to 1.0)
    #[inline]
    pub fn next(&mut self) -> f32 {
        let output = match self.waveform {
            LfoWaveform::Sine => sinf(self.phase * 2.0 * PI),
            LfoWaveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
            LfoWaveform::Saw => 2.0 * self.phase - 1.0,
            LfoWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        output
    }

    /// Fill `out` with consecutive LFO values.
    #[inline]
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next();
        }
    }

    /// Set sample rate, keeping the frequency in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.set_frequency(freq);
    }
}
