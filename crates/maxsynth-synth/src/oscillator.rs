//! Audio-rate oscillators and the per-voice oscillator bank.
//!
//! Saw and square use PolyBLEP (Polynomial Band-Limited Step) correction
//! at their discontinuities. The triangle is rendered directly from the
//! folded phase: its corners are slope changes, so it aliases far less.

use core::f32::consts::PI;
use libm::{fabsf, sinf};

/// Number of oscillators in every voice.
pub const OSCILLATOR_COUNT: usize = 2;

/// Oscillator waveform types
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OscillatorWaveform {
    /// Pure fundamental.
    #[default]
    Sine = 0,
    /// 50% duty cycle, odd harmonics.
    Square = 1,
    /// Rising ramp, all harmonics.
    Saw = 2,
    /// Folded ramp, odd harmonics rolling off at 12 dB/oct.
    Triangle = 3,
    /// Uniform white noise, independent of phase.
    Noise = 4,
}

impl OscillatorWaveform {
    /// Every waveform in choice-index order.
    pub const ALL: [OscillatorWaveform; 5] = [
        OscillatorWaveform::Sine,
        OscillatorWaveform::Square,
        OscillatorWaveform::Saw,
        OscillatorWaveform::Triangle,
        OscillatorWaveform::Noise,
    ];

    /// Display labels in choice-index order.
    pub const LABELS: [&'static str; 5] = ["Sine", "Square", "Saw", "Triangle", "Noise"];

    /// Waveform for a choice index. Unknown indices fall back to sine.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Choice index of this waveform.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Single audio-rate oscillator driven by a normalized phase accumulator.
///
/// # Example
///
/// ```rust
/// use maxsynth_synth::{Oscillator, OscillatorWaveform};
///
/// let mut osc = Oscillator::new(48000.0);
/// osc.set_waveform(OscillatorWaveform::Saw);
/// osc.set_frequency(440.0, true);
///
/// let sample = osc.advance();
/// assert!(sample.abs() <= 1.1);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    waveform: OscillatorWaveform,
    /// Xorshift32 state for the noise waveform
    noise_state: u32,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Create a sine oscillator at 440 Hz.
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        Self {
            phase: 0.0,
            phase_inc: 440.0 / sample_rate,
            sample_rate,
            frequency: 440.0,
            waveform: OscillatorWaveform::Sine,
            noise_state: 0x1234_5678,
        }
    }

    /// Set frequency in Hz.
    ///
    /// With `reset_phase` false the phase is untouched, so the waveform
    /// continues from where it is at the new rate. With `reset_phase` true
    /// the next sample starts from phase 0.
    pub fn set_frequency(&mut self, freq_hz: f32, reset_phase: bool) {
        self.frequency = if freq_hz.is_finite() {
            freq_hz.max(0.0)
        } else {
            0.0
        };
        self.phase_inc = self.frequency / self.sample_rate;
        if reset_phase {
            self.phase = 0.0;
        }
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set waveform type. Phase is kept.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    /// Current waveform.
    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Set sample rate, keeping the frequency in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Current phase in [0.0, 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Generate the next sample and advance the phase.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let output = self.generate(self.phase);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            // Frequencies above the sample rate can skip whole cycles.
            if self.phase >= 1.0 {
                self.phase -= libm::floorf(self.phase);
            }
        }
        output
    }

    /// Add `buffer.len()` samples of output into `buffer`.
    #[inline]
    pub fn add_to(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample += self.advance();
        }
    }

    #[inline]
    fn generate(&mut self, phase: f32) -> f32 {
        let dt = self.phase_inc;
        match self.waveform {
            OscillatorWaveform::Sine => sinf(phase * 2.0 * PI),
            OscillatorWaveform::Square => {
                let naive = if phase < 0.5 { 1.0 } else { -1.0 };
                let falling = if phase < 0.5 { phase + 0.5 } else { phase - 0.5 };
                naive + poly_blep(phase, dt) - poly_blep(falling, dt)
            }
            OscillatorWaveform::Saw => 2.0 * phase - 1.0 - poly_blep(phase, dt),
            OscillatorWaveform::Triangle => 2.0 * fabsf(2.0 * phase - 1.0) - 1.0,
            OscillatorWaveform::Noise => self.next_noise(),
        }
    }

    #[inline]
    fn next_noise(&mut self) -> f32 {
        let mut x = self.noise_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_state = x;

        // Top 24 bits to [0, 1), then to [-1, 1)
        (x >> 8) as f32 / 8_388_608.0 - 1.0
    }
}

/// 4th-order PolyBLEP correction.
///
/// C²-continuous piecewise polynomial spanning two samples either side of
/// a unit step discontinuity at phase 0. Subtract it from a rising ramp
/// that resets at phase 0; add it at a rising edge, subtract at a falling
/// edge, for a square.
///
/// Reference: Välimäki et al., "Antialiasing Oscillators", IEEE Signal
/// Processing Magazine, 2010.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    //   p₁(n) = A₄·n⁴ + A₃·n³ + A₂·n² + A₀  for n ∈ [0,1)
    //   p₂(n) = C·(2-n)⁴                     for n ∈ [1,2)
    const A4: f32 = -43.0 / 48.0;
    const A3: f32 = 7.0 / 6.0;
    const A2: f32 = 0.5;
    const A0: f32 = -1.0;
    const C: f32 = -11.0 / 48.0;

    if dt <= 0.0 {
        return 0.0;
    }
    let window = 2.0 * dt;
    let piece = |n: f32| {
        if n < 1.0 {
            let n2 = n * n;
            A4 * n2 * n2 + A3 * n2 * n + A2 * n2 + A0
        } else {
            let u = 2.0 - n;
            let u2 = u * u;
            C * u2 * u2
        }
    };

    if t < window {
        piece(t / dt)
    } else if t > 1.0 - window {
        -piece((1.0 - t) / dt)
    } else {
        0.0
    }
}

/// The oscillators of one voice, summed with per-oscillator enable flags.
///
/// All oscillators share the note frequency. A disabled oscillator is
/// muted, not removed: its waveform setting survives and it resumes when
/// re-enabled.
///
/// # Example
///
/// ```rust
/// use maxsynth_synth::{OscillatorBank, OscillatorWaveform};
///
/// let mut bank = OscillatorBank::new(48000.0);
/// bank.set_waveform(1, OscillatorWaveform::Saw);
/// bank.set_enabled(1, true);
/// bank.set_frequency(220.0, true);
///
/// let mut block = [0.0f32; 64];
/// bank.process(&mut block);
/// ```
#[derive(Debug, Clone)]
pub struct OscillatorBank {
    oscillators: [Oscillator; OSCILLATOR_COUNT],
    enabled: [bool; OSCILLATOR_COUNT],
}

impl Default for OscillatorBank {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl OscillatorBank {
    /// Create a bank with oscillator 1 enabled and the rest muted.
    pub fn new(sample_rate: f32) -> Self {
        let mut enabled = [false; OSCILLATOR_COUNT];
        enabled[0] = true;
        Self {
            oscillators: core::array::from_fn(|_| Oscillator::new(sample_rate)),
            enabled,
        }
    }

    /// Set sample rate on every oscillator.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for osc in &mut self.oscillators {
            osc.set_sample_rate(sample_rate);
        }
    }

    /// Set the frequency of every oscillator. See [`Oscillator::set_frequency`].
    pub fn set_frequency(&mut self, freq_hz: f32, reset_phase: bool) {
        for osc in &mut self.oscillators {
            osc.set_frequency(freq_hz, reset_phase);
        }
    }

    /// Set the waveform of oscillator `index`. Out-of-range indices are ignored.
    pub fn set_waveform(&mut self, index: usize, waveform: OscillatorWaveform) {
        if let Some(osc) = self.oscillators.get_mut(index) {
            osc.set_waveform(waveform);
        }
    }

    /// Enable or mute oscillator `index`. Out-of-range indices are ignored.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(flag) = self.enabled.get_mut(index) {
            *flag = enabled;
        }
    }

    /// Whether oscillator `index` contributes to the mix.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabled.get(index).copied().unwrap_or(false)
    }

    /// Read access to the oscillators.
    pub fn oscillators(&self) -> &[Oscillator; OSCILLATOR_COUNT] {
        &self.oscillators
    }

    /// Reset every oscillator's phase to 0.
    pub fn reset(&mut self) {
        for osc in &mut self.oscillators {
            osc.reset();
        }
    }

    /// Overwrite `buffer` with the sum of the enabled oscillators.
    ///
    /// With every oscillator muted the buffer is silent.
    #[inline]
    pub fn process(&mut self, buffer: &mut [f32]) {
        buffer.fill(0.0);
        for (osc, &enabled) in self.oscillators.iter_mut().zip(self.enabled.iter()) {
            if enabled {
                osc.add_to(buffer);
            }
        }
    }
}
