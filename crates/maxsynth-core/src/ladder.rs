//! Ladder filter with six selectable responses.
//!
//! Four cascaded one-pole lowpass stages with global feedback from the last
//! stage back to the input node. Every response is a fixed linear mix of the
//! input node and the four stage outputs, so all modes share one state
//! vector and switching mode never needs a reset.
//!
//! # Topology
//!
//! Writing `L` for one stage's lowpass response and `a` for the input node:
//!
//! | Mode  | Mix                      | Taps `[a, s1, s2, s3, s4]` |
//! |-------|--------------------------|----------------------------|
//! | LPF12 | `L²`                     | `[0, 0, 1, 0, 0]`          |
//! | LPF24 | `L⁴`                     | `[0, 0, 0, 0, 1]`          |
//! | HPF12 | `(1 - L)²`               | `[1, -2, 1, 0, 0]`         |
//! | HPF24 | `(1 - L)⁴`               | `[1, -4, 6, -4, 1]`        |
//! | BPF12 | `2·L·(1 - L)`            | `[0, 2, -2, 0, 0]`         |
//! | BPF24 | `4·L²·(1 - L)²`          | `[0, 0, 4, -8, 4]`         |
//!
//! The bandpass mixes are scaled for unity gain at the cutoff frequency
//! when resonance is zero.
//!
//! Each stage is a one-pole with an extra zero (`0.769 / 0.231` input
//! split), which keeps the discrete cascade's phase close to the analog
//! prototype near Nyquist. The feedback signal passes through `tanh`, so
//! the loop stays bounded even at full resonance where the filter
//! self-oscillates.
//!
//! # Reference
//!
//! Välimäki & Huovilainen, "Oscillator and Filter Algorithms for Virtual
//! Analog Synthesis", Computer Music Journal 30(2), 2006.

use core::f32::consts::PI;
use libm::{expf, tanhf};

use crate::Effect;
use crate::flush_denormal;

/// Lowest cutoff the filter accepts, in Hz.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff the filter accepts, in Hz (further limited to 0.49 × sample rate).
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
/// Upper bound of the resonance control.
pub const MAX_RESONANCE: f32 = 10.0;

/// Input weight of each stage's zero.
const STAGE_B0: f32 = 0.769_230_8;
/// Delayed-input weight of each stage's zero.
const STAGE_B1: f32 = 0.230_769_2;

/// Filter response type.
///
/// Discriminants match the host-facing choice index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Low-pass, 12 dB/oct.
    Lpf12 = 0,
    /// Low-pass, 24 dB/oct.
    #[default]
    Lpf24 = 1,
    /// High-pass, 12 dB/oct.
    Hpf12 = 2,
    /// High-pass, 24 dB/oct.
    Hpf24 = 3,
    /// Band-pass, 12 dB/oct skirts.
    Bpf12 = 4,
    /// Band-pass, 24 dB/oct skirts.
    Bpf24 = 5,
}

impl FilterMode {
    /// Every mode in choice-index order.
    pub const ALL: [FilterMode; 6] = [
        FilterMode::Lpf12,
        FilterMode::Lpf24,
        FilterMode::Hpf12,
        FilterMode::Hpf24,
        FilterMode::Bpf12,
        FilterMode::Bpf24,
    ];

    /// Display labels in choice-index order.
    pub const LABELS: [&'static str; 6] = ["LPF12", "LPF24", "HPF12", "HPF24", "BPF12", "BPF24"];

    /// Mode for a choice index. Unknown indices fall back to [`FilterMode::Lpf24`].
    ///
    /// ```rust
    /// use maxsynth_core::FilterMode;
    ///
    /// assert_eq!(FilterMode::from_index(3), FilterMode::Hpf24);
    /// assert_eq!(FilterMode::from_index(42), FilterMode::Lpf24);
    /// ```
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Choice index of this mode.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label, e.g. `"LPF24"`.
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }

    /// Nominal slope in dB per octave.
    pub fn slope_db(self) -> f32 {
        match self {
            FilterMode::Lpf12 | FilterMode::Hpf12 | FilterMode::Bpf12 => 12.0,
            FilterMode::Lpf24 | FilterMode::Hpf24 | FilterMode::Bpf24 => 24.0,
        }
    }

    /// Output taps over `[input node, stage1, stage2, stage3, stage4]`.
    fn taps(self) -> [f32; 5] {
        match self {
            FilterMode::Lpf12 => [0.0, 0.0, 1.0, 0.0, 0.0],
            FilterMode::Lpf24 => [0.0, 0.0, 0.0, 0.0, 1.0],
            FilterMode::Hpf12 => [1.0, -2.0, 1.0, 0.0, 0.0],
            FilterMode::Hpf24 => [1.0, -4.0, 6.0, -4.0, 1.0],
            FilterMode::Bpf12 => [0.0, 2.0, -2.0, 0.0, 0.0],
            FilterMode::Bpf24 => [0.0, 0.0, 4.0, -8.0, 4.0],
        }
    }

    /// Fraction of the input added back into the feedback path.
    ///
    /// Resonance feedback costs passband level in the low/band modes; the
    /// high-pass modes have no passband at DC and take no compensation.
    fn compensation(self) -> f32 {
        match self {
            FilterMode::Hpf12 | FilterMode::Hpf24 => 0.0,
            _ => 0.5,
        }
    }
}

/// Four-stage ladder filter.
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to `[20, min(20000, 0.49 × sample_rate)]` (default 1000)
/// - `resonance`: `[0, 10]`, 0 is no feedback and 10 is the edge of
///   self-oscillation (default 0)
/// - `mode`: one of six [`FilterMode`]s (default `Lpf24`)
///
/// # Example
///
/// ```rust
/// use maxsynth_core::{Effect, FilterMode, LadderFilter};
///
/// let mut filter = LadderFilter::new(48000.0);
/// filter.set_mode(FilterMode::Hpf12);
/// filter.set_cutoff(200.0);
///
/// let mut block = [0.25f32; 32];
/// filter.process_block_inplace(&mut block);
/// ```
#[derive(Debug, Clone)]
pub struct LadderFilter {
    /// `[input node, stage1, stage2, stage3, stage4]` from the previous sample.
    state: [f32; 5],

    // Coefficients
    pole: f32,
    gain: f32,
    feedback: f32,
    compensation: f32,
    taps: [f32; 5],

    // Parameters
    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
    mode: FilterMode,
}

impl Default for LadderFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl LadderFilter {
    /// Create a filter at the given sample rate: 1000 Hz, no resonance, LPF24.
    pub fn new(sample_rate: f32) -> Self {
        let mode = FilterMode::default();
        let mut filter = Self {
            state: [0.0; 5],
            pole: 0.0,
            gain: 0.0,
            feedback: 0.0,
            compensation: mode.compensation(),
            taps: mode.taps(),
            sample_rate,
            cutoff: 1000.0,
            resonance: 0.0,
            mode,
        };
        filter.update_coefficients();
        filter
    }

    /// Set cutoff frequency in Hz. Out-of-range and non-finite values are clamped.
    pub fn set_cutoff(&mut self, freq: f32) {
        let upper = MAX_CUTOFF_HZ.min(self.sample_rate * 0.49).max(MIN_CUTOFF_HZ);
        self.cutoff = if freq.is_finite() {
            freq.clamp(MIN_CUTOFF_HZ, upper)
        } else {
            upper
        };
        self.update_coefficients();
    }

    /// Current cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance in `[0, 10]`. Values are clamped; NaN is treated as 0.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = if resonance.is_nan() {
            0.0
        } else {
            resonance.clamp(0.0, MAX_RESONANCE)
        };
        self.feedback = 4.0 * self.resonance / MAX_RESONANCE;
    }

    /// Current resonance.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Select the response. State is kept, so switching mid-note is click-free
    /// apart from the change of response itself.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
        self.taps = mode.taps();
        self.compensation = mode.compensation();
    }

    /// Current response.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    fn update_coefficients(&mut self) {
        self.pole = expf(-2.0 * PI * self.cutoff / self.sample_rate);
        self.gain = 1.0 - self.pole;
    }
}

impl Effect for LadderFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let s = &mut self.state;
        let b0 = self.gain * STAGE_B0;
        let b1 = self.gain * STAGE_B1;

        let a = input - self.feedback * (tanhf(s[4]) - self.compensation * input);
        let y1 = b0 * a + b1 * s[0] + self.pole * s[1];
        let y2 = b0 * y1 + b1 * s[1] + self.pole * s[2];
        let y3 = b0 * y2 + b1 * s[2] + self.pole * s[3];
        let y4 = b0 * y3 + b1 * s[3] + self.pole * s[4];

        *s = [
            flush_denormal(a),
            flush_denormal(y1),
            flush_denormal(y2),
            flush_denormal(y3),
            flush_denormal(y4),
        ];

        let t = &self.taps;
        t[0] * a + t[1] * y1 + t[2] * y2 + t[3] * y3 + t[4] * y4
    }

    fn reset(&mut self) {
        self.state = [0.0; 5];
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        // Re-clamp against the new Nyquist limit.
        self.set_cutoff(self.cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn impulse_response(filter: &mut LadderFilter, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| filter.process(if n == 0 { 1.0 } else { 0.0 }))
            .collect()
    }

    /// |H(f)| of an impulse response, evaluated as a single DFT bin.
    fn magnitude_at(h: &[f32], freq: f32) -> f64 {
        let w = 2.0 * core::f64::consts::PI * f64::from(freq) / f64::from(SR);
        let (mut re, mut im) = (0.0f64, 0.0f64);
        for (n, &x) in h.iter().enumerate() {
            let phi = w * n as f64;
            re += f64::from(x) * phi.cos();
            im -= f64::from(x) * phi.sin();
        }
        (re * re + im * im).sqrt()
    }

    #[test]
    fn test_ladder_lpf24_monotonic_above_cutoff() {
        let mut filter = LadderFilter::new(SR);
        filter.set_mode(FilterMode::Lpf24);
        filter.set_cutoff(1000.0);
        filter.set_resonance(0.0);

        let h = impulse_response(&mut filter, SR as usize);
        assert!(h.iter().all(|x| x.is_finite()), "impulse response not finite");

        let freqs = [1000.0, 1500.0, 2000.0, 4000.0, 8000.0, 12000.0, 16000.0, 20000.0];
        let mags: Vec<f64> = freqs.iter().map(|&f| magnitude_at(&h, f)).collect();
        for pair in mags.windows(2) {
            assert!(
                pair[1] < pair[0],
                "magnitude must fall above cutoff: {:?}",
                mags
            );
        }
        // Unity at DC
        assert!((magnitude_at(&h, 0.0) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_ladder_lpf24_steeper_than_lpf12() {
        let mut lp12 = LadderFilter::new(SR);
        lp12.set_mode(FilterMode::Lpf12);
        let mut lp24 = LadderFilter::new(SR);
        lp24.set_mode(FilterMode::Lpf24);

        let h12 = impulse_response(&mut lp12, 8192);
        let h24 = impulse_response(&mut lp24, 8192);
        assert!(magnitude_at(&h24, 8000.0) < magnitude_at(&h12, 8000.0));
    }

    #[test]
    fn test_ladder_highpass_blocks_dc() {
        for mode in [FilterMode::Hpf12, FilterMode::Hpf24] {
            let mut filter = LadderFilter::new(SR);
            filter.set_mode(mode);
            filter.set_cutoff(500.0);
            let mut out = 0.0;
            for _ in 0..48000 {
                out = filter.process(1.0);
            }
            assert!(out.abs() < 1e-3, "{mode:?} passed DC: {out}");
        }
    }

    #[test]
    fn test_ladder_bandpass_peaks_near_cutoff() {
        for mode in [FilterMode::Bpf12, FilterMode::Bpf24] {
            let mut filter = LadderFilter::new(SR);
            filter.set_mode(mode);
            filter.set_cutoff(1000.0);
            let h = impulse_response(&mut filter, 16384);
            let at_cutoff = magnitude_at(&h, 1000.0);
            assert!(at_cutoff > magnitude_at(&h, 100.0), "{mode:?} low skirt");
            assert!(at_cutoff > magnitude_at(&h, 10000.0), "{mode:?} high skirt");
            assert!(at_cutoff > 0.7 && at_cutoff < 1.3, "{mode:?} peak {at_cutoff}");
        }
    }

    #[test]
    fn test_ladder_full_resonance_stays_bounded() {
        for mode in FilterMode::ALL {
            let mut filter = LadderFilter::new(SR);
            filter.set_mode(mode);
            filter.set_cutoff(2000.0);
            filter.set_resonance(MAX_RESONANCE);
            for n in 0..SR as usize {
                let x = if n % 100 < 50 { 0.8 } else { -0.8 };
                let y = filter.process(x);
                // Taps sum to at most 16 in magnitude and |a| <= 6.4 at these levels
                assert!(y.is_finite() && y.abs() < 128.0, "{mode:?} blew up: {y}");
            }
        }
    }

    #[test]
    fn test_ladder_cutoff_clamped() {
        let mut filter = LadderFilter::new(SR);
        filter.set_cutoff(1.0);
        assert_eq!(filter.cutoff(), MIN_CUTOFF_HZ);
        filter.set_cutoff(1e9);
        assert_eq!(filter.cutoff(), MAX_CUTOFF_HZ);
        filter.set_cutoff(f32::NAN);
        assert_eq!(filter.cutoff(), MAX_CUTOFF_HZ);

        let mut low_rate = LadderFilter::new(22050.0);
        low_rate.set_cutoff(20_000.0);
        assert!((low_rate.cutoff() - 22050.0 * 0.49).abs() < 0.01);
    }

    #[test]
    fn test_ladder_resonance_clamped() {
        let mut filter = LadderFilter::new(SR);
        filter.set_resonance(-3.0);
        assert_eq!(filter.resonance(), 0.0);
        filter.set_resonance(25.0);
        assert_eq!(filter.resonance(), MAX_RESONANCE);
    }

    #[test]
    fn test_filter_mode_index_roundtrip() {
        for (i, mode) in FilterMode::ALL.iter().enumerate() {
            assert_eq!(mode.index(), i);
            assert_eq!(FilterMode::from_index(i), *mode);
        }
        assert_eq!(FilterMode::from_index(6), FilterMode::Lpf24);
        assert_eq!(FilterMode::Bpf12.label(), "BPF12");
        assert_eq!(FilterMode::Hpf24.slope_db(), 24.0);
    }

    #[test]
    fn test_ladder_reset_clears_state() {
        let mut filter = LadderFilter::new(SR);
        for _ in 0..100 {
            filter.process(1.0);
        }
        filter.reset();
        assert_eq!(filter.process(0.0), 0.0);
    }
}
