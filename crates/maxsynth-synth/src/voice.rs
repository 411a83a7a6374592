//! Voice capability interface and the subtractive voice.
//!
//! A [`Voice`] is a monophonic rendering unit the engine can start, stop
//! and mix. [`SubtractiveVoice`] is the one shipped here: oscillator bank
//! into a ladder filter whose cutoff follows a filter envelope and the
//! shared LFO, shaped by an amplitude envelope.

use alloc::vec;
use alloc::vec::Vec;

use libm::exp2f;
use maxsynth_core::{Effect, FilterMode, LadderFilter, MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};

use crate::envelope::{AdsrEnvelope, AdsrParams};
use crate::oscillator::{OSCILLATOR_COUNT, OscillatorBank, OscillatorWaveform};
use crate::params::ParamSnapshot;

/// Samples per filter modulation step.
pub const FILTER_CHUNK: usize = 32;

/// Output gain per unit of velocity. Leaves headroom for many voices.
pub const VELOCITY_GAIN: f32 = 0.3;

/// Scratch size used before the first `prepare`.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 512;

/// Lifecycle of a voice as seen by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceState {
    /// No note. Contributes silence and is free for allocation.
    #[default]
    Idle,
    /// Holding a note.
    Active,
    /// Note released, release tail still sounding.
    Releasing,
}

/// Inclusive MIDI note range a voice accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRange {
    /// Lowest accepted note.
    pub low: u8,
    /// Highest accepted note.
    pub high: u8,
}

impl KeyRange {
    /// Every MIDI note.
    pub const FULL: KeyRange = KeyRange { low: 0, high: 127 };

    /// Range between two notes, in either order.
    pub const fn new(a: u8, b: u8) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Whether `note` falls inside the range.
    #[inline]
    pub const fn contains(&self, note: u8) -> bool {
        note >= self.low && note <= self.high
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// What the engine needs from a voice.
///
/// Implementations must not allocate, block or panic in
/// [`render`](Voice::render), [`start_note`](Voice::start_note),
/// [`stop_note`](Voice::stop_note) or
/// [`update_parameters`](Voice::update_parameters).
pub trait Voice {
    /// Size internal buffers and set the sample rate. Called outside the
    /// render path; may allocate. Leaves the voice idle.
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize);

    /// Whether this voice can play `note`. The engine skips voices that
    /// decline.
    fn can_play_note(&self, note: u8) -> bool {
        let _ = note;
        true
    }

    /// Begin `note` at `velocity` (0.0 to 1.0) from a clean state.
    fn start_note(&mut self, note: u8, velocity: f32);

    /// Release the note. With `allow_tail_off` false the voice falls
    /// silent at once and becomes idle.
    fn stop_note(&mut self, velocity: f32, allow_tail_off: bool);

    /// Add `len` frames into every channel of `output` starting at frame
    /// `start`. `lfo` holds the shared modulation signal for those frames.
    fn render(&mut self, output: &mut [&mut [f32]], start: usize, len: usize, lfo: &[f32]);

    /// Apply one block's parameters.
    fn update_parameters(&mut self, params: &ParamSnapshot);

    /// Current lifecycle state.
    fn state(&self) -> VoiceState;

    /// Note being played or released, if any.
    fn note(&self) -> Option<u8>;

    /// Anything but idle.
    fn is_active(&self) -> bool {
        self.state() != VoiceState::Idle
    }
}

/// Cutoff modulation settings copied from the snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FilterModulation {
    base_cutoff: f32,
    env_enabled: bool,
    env_amount: f32,
    lfo_amount: f32,
}

impl Default for FilterModulation {
    fn default() -> Self {
        Self {
            base_cutoff: 1000.0,
            env_enabled: true,
            env_amount: 0.3,
            lfo_amount: 0.0,
        }
    }
}

impl FilterModulation {
    /// Envelope pushes the cutoff toward 20 kHz, the LFO then scales it by
    /// up to ±2 octaves.
    #[inline]
    fn cutoff(&self, env: f32, lfo: f32) -> f32 {
        let mut cutoff = self.base_cutoff;
        if self.env_enabled {
            cutoff += env * self.env_amount * (MAX_CUTOFF_HZ - self.base_cutoff);
        }
        cutoff *= exp2f(lfo * self.lfo_amount * 2.0);
        cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
    }
}

/// Mean of `lfo[offset..offset + len]`, zero where the slice runs short.
#[inline]
fn chunk_average(lfo: &[f32], offset: usize, len: usize) -> f32 {
    let Some(tail) = lfo.get(offset..) else {
        return 0.0;
    };
    let window = &tail[..len.min(tail.len())];
    if window.is_empty() {
        0.0
    } else {
        window.iter().sum::<f32>() / window.len() as f32
    }
}

/// Two-oscillator subtractive voice.
///
/// ## Signal flow
///
/// ```text
/// osc bank -> × velocity gain -> ladder filter (per 32-sample chunk) -> × amp env -> mix
///                                   ^
///              base + filter env + shared LFO
/// ```
///
/// # Example
///
/// ```rust
/// use maxsynth_synth::{ParamSnapshot, SubtractiveVoice, Voice, VoiceState};
///
/// let mut voice = SubtractiveVoice::new(48000.0);
/// voice.update_parameters(&ParamSnapshot::default());
/// voice.start_note(69, 1.0);
///
/// let mut left = [0.0f32; 256];
/// let mut right = [0.0f32; 256];
/// let lfo = [0.0f32; 256];
/// voice.render(&mut [&mut left[..], &mut right[..]], 0, 256, &lfo);
/// assert_eq!(left, right);
///
/// voice.stop_note(0.0, true);
/// assert_eq!(voice.state(), VoiceState::Releasing);
/// ```
#[derive(Debug, Clone)]
pub struct SubtractiveVoice {
    oscillators: OscillatorBank,
    amp_env: AdsrEnvelope,
    filter_env: AdsrEnvelope,
    filter: LadderFilter,
    modulation: FilterModulation,
    /// Mono render buffer, sized by `prepare`
    scratch: Vec<f32>,
    note: Option<u8>,
    velocity: f32,
    gain: f32,
    state: VoiceState,
    key_range: KeyRange,
}

impl Default for SubtractiveVoice {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl SubtractiveVoice {
    /// Create an idle voice accepting every note.
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            oscillators: OscillatorBank::new(sample_rate),
            amp_env: AdsrEnvelope::new(sample_rate),
            filter_env: AdsrEnvelope::new(sample_rate),
            filter: LadderFilter::new(sample_rate),
            modulation: FilterModulation::default(),
            scratch: vec![0.0; DEFAULT_MAX_BLOCK_SIZE],
            note: None,
            velocity: 0.0,
            gain: 0.0,
            state: VoiceState::Idle,
            key_range: KeyRange::FULL,
        };
        voice.update_parameters(&ParamSnapshot::default());
        voice
    }

    /// Restrict the notes this voice accepts.
    #[must_use]
    pub fn with_key_range(mut self, key_range: KeyRange) -> Self {
        self.key_range = key_range;
        self
    }

    /// Accepted note range.
    pub fn key_range(&self) -> KeyRange {
        self.key_range
    }

    /// Hot-swap the amplitude envelope.
    pub fn update_envelope(&mut self, params: AdsrParams) {
        self.amp_env.update_envelope(params);
    }

    /// Set base cutoff, resonance and response.
    pub fn update_filter(&mut self, cutoff: f32, resonance: f32, mode: FilterMode) {
        self.modulation.base_cutoff = if cutoff.is_finite() {
            cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
        } else {
            MAX_CUTOFF_HZ
        };
        self.filter.set_resonance(resonance);
        self.filter.set_mode(mode);
    }

    /// Hot-swap the filter envelope and its routing to the cutoff.
    pub fn update_filter_envelope(&mut self, params: AdsrParams, enabled: bool, amount: f32) {
        self.filter_env.update_envelope(params);
        self.modulation.env_enabled = enabled;
        self.modulation.env_amount = if amount.is_nan() {
            0.0
        } else {
            amount.clamp(0.0, 1.0)
        };
    }

    /// Set the LFO-to-cutoff depth.
    pub fn update_lfo(&mut self, amount: f32) {
        self.modulation.lfo_amount = if amount.is_nan() {
            0.0
        } else {
            amount.clamp(0.0, 1.0)
        };
    }

    /// Set waveform and enable flag of oscillator `index`.
    pub fn update_waveform(&mut self, index: usize, waveform: OscillatorWaveform, enabled: bool) {
        self.oscillators.set_waveform(index, waveform);
        self.oscillators.set_enabled(index, enabled);
    }

    /// The oscillator bank.
    pub fn oscillators(&self) -> &OscillatorBank {
        &self.oscillators
    }

    /// Amplitude envelope.
    pub fn amp_envelope(&self) -> &AdsrEnvelope {
        &self.amp_env
    }

    /// Filter envelope.
    pub fn filter_envelope(&self) -> &AdsrEnvelope {
        &self.filter_env
    }

    /// The ladder filter, including the most recent modulated cutoff.
    pub fn filter(&self) -> &LadderFilter {
        &self.filter
    }

    /// Velocity of the current note.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Output gain derived from velocity.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    fn hard_reset(&mut self) {
        self.amp_env.reset();
        self.filter_env.reset();
        self.oscillators.reset();
        self.filter.reset();
    }

    fn clear_note(&mut self) {
        self.hard_reset();
        self.note = None;
        self.state = VoiceState::Idle;
    }
}

impl Voice for SubtractiveVoice {
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.oscillators.set_sample_rate(sample_rate);
        self.amp_env.set_sample_rate(sample_rate);
        self.filter_env.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
        self.scratch.clear();
        self.scratch.resize(max_block_size.max(1), 0.0);
        self.clear_note();
    }

    fn can_play_note(&self, note: u8) -> bool {
        self.key_range.contains(note)
    }

    fn start_note(&mut self, note: u8, velocity: f32) {
        let note = note.min(127);
        let velocity = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(0.0, 1.0)
        };

        // Full reset so a reused voice starts exactly like a fresh one.
        self.hard_reset();
        self.oscillators.set_frequency(midi_to_freq(note), true);
        self.velocity = velocity;
        self.gain = velocity * VELOCITY_GAIN;
        self.note = Some(note);
        self.state = VoiceState::Active;

        self.amp_env.note_on();
        self.filter_env.note_on();
    }

    fn stop_note(&mut self, _velocity: f32, allow_tail_off: bool) {
        if self.state == VoiceState::Idle {
            return;
        }
        if !allow_tail_off {
            self.clear_note();
            return;
        }
        self.amp_env.note_off();
        self.filter_env.note_off();
        if self.amp_env.is_active() {
            self.state = VoiceState::Releasing;
        } else {
            self.clear_note();
        }
    }

    fn render(&mut self, output: &mut [&mut [f32]], start: usize, len: usize, lfo: &[f32]) {
        if self.state == VoiceState::Idle {
            return;
        }
        let len = len.min(self.scratch.len());
        let block = &mut self.scratch[..len];

        self.oscillators.process(block);
        for sample in block.iter_mut() {
            *sample *= self.gain;
        }

        for (i, chunk) in block.chunks_mut(FILTER_CHUNK).enumerate() {
            // One envelope reading per chunk, but the envelope still runs
            // in real time.
            let env = self.filter_env.next_sample();
            self.filter_env.skip(chunk.len() - 1);
            let lfo_avg = chunk_average(lfo, i * FILTER_CHUNK, chunk.len());

            self.filter.set_cutoff(self.modulation.cutoff(env, lfo_avg));
            self.filter.process_block_inplace(chunk);
        }

        for sample in block.iter_mut() {
            *sample *= self.amp_env.next_sample();
        }

        for channel in output.iter_mut() {
            if let Some(dest) = channel.get_mut(start..start + len) {
                for (out, &sample) in dest.iter_mut().zip(block.iter()) {
                    *out += sample;
                }
            }
        }

        if !self.amp_env.is_active() {
            self.clear_note();
        }
    }

    fn update_parameters(&mut self, params: &ParamSnapshot) {
        self.update_envelope(params.amp_env);
        self.update_filter(
            params.filter_cutoff,
            params.filter_resonance,
            params.filter_mode,
        );
        self.update_filter_envelope(
            params.filter_env,
            params.filter_env_enabled,
            params.filter_env_amount,
        );
        self.update_lfo(params.lfo_amount);
        for i in 0..OSCILLATOR_COUNT {
            self.update_waveform(i, params.waveforms[i], params.osc_enabled[i]);
        }
    }

    fn state(&self) -> VoiceState {
        self.state
    }

    fn note(&self) -> Option<u8> {
        self.note
    }
}

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn render_mono(voice: &mut SubtractiveVoice, len: usize, lfo_value: f32) -> Vec<f32> {
        let mut out = vec![0.0f32; len];
        let lfo = vec![lfo_value; len];
        voice.render(&mut [&mut out[..]], 0, len, &lfo);
        out
    }

    fn fast_release() -> ParamSnapshot {
        ParamSnapshot {
            amp_env: AdsrParams::new(0.01, 0.01, 0.5, 0.01),
            ..ParamSnapshot::default()
        }
    }

    #[test]
    fn test_midi_to_freq_a4() {
        let freq = midi_to_freq(69);
        assert!(
            (freq - 440.0).abs() < 0.01,
            "A4 should be 440 Hz, got {}",
            freq
        );
    }

    #[test]
    fn test_midi_to_freq_middle_c() {
        let freq = midi_to_freq(60);
        assert!(
            (freq - 261.63).abs() < 0.1,
            "C4 should be ~261.63 Hz, got {}",
            freq
        );
    }

    #[test]
    fn test_start_note() {
        let mut voice = SubtractiveVoice::new(SR);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert_eq!(voice.note(), None);

        voice.start_note(69, 1.0);
        assert_eq!(voice.state(), VoiceState::Active);
        assert_eq!(voice.note(), Some(69));
        assert!((voice.gain() - VELOCITY_GAIN).abs() < 1e-6);
        assert!((voice.oscillators().oscillators()[0].frequency() - 440.0).abs() < 0.01);
    }

    #[test]
    fn test_start_note_sanitizes_input() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.start_note(200, 7.0);
        assert_eq!(voice.note(), Some(127));
        assert_eq!(voice.velocity(), 1.0);

        voice.start_note(60, f32::NAN);
        assert_eq!(voice.velocity(), 0.0);
    }

    #[test]
    fn test_idle_voice_renders_nothing() {
        let mut voice = SubtractiveVoice::new(SR);
        let mut out = [0.25f32; 128];
        let lfo = [0.0f32; 128];
        voice.render(&mut [&mut out[..]], 0, 128, &lfo);
        assert!(out.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_render_adds_into_output() {
        let mut a = SubtractiveVoice::new(SR);
        let mut b = SubtractiveVoice::new(SR);
        a.start_note(64, 0.8);
        b.start_note(64, 0.8);

        let clean = render_mono(&mut a, 256, 0.0);
        let mut offset = vec![0.5f32; 256];
        let lfo = [0.0f32; 256];
        b.render(&mut [&mut offset[..]], 0, 256, &lfo);

        for (c, o) in clean.iter().zip(offset.iter()) {
            assert!((c + 0.5 - o).abs() < 1e-6);
        }
        assert!(clean.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_render_window_and_channels() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.update_parameters(&ParamSnapshot {
            amp_env: AdsrParams::new(0.001, 0.1, 1.0, 0.1),
            ..ParamSnapshot::default()
        });
        voice.start_note(72, 1.0);

        let mut left = [0.0f32; 300];
        let mut right = [0.0f32; 300];
        let lfo = [0.0f32; 100];
        voice.render(&mut [&mut left[..], &mut right[..]], 100, 100, &lfo);

        assert_eq!(left, right);
        assert!(left[..100].iter().all(|&s| s == 0.0));
        assert!(left[200..].iter().all(|&s| s == 0.0));
        assert!(left[100..200].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_stop_with_tail_releases_then_idles() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.update_parameters(&fast_release());
        voice.start_note(60, 1.0);
        render_mono(&mut voice, 512, 0.0);

        voice.stop_note(0.0, true);
        assert_eq!(voice.state(), VoiceState::Releasing);
        assert_eq!(voice.note(), Some(60));

        // 10 ms release = 480 samples
        let tail = render_mono(&mut voice, 512, 0.0);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert_eq!(voice.note(), None);
        assert!(tail[..100].iter().any(|&s| s != 0.0));
        assert!(tail[490..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_stop_without_tail_is_immediate() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.start_note(60, 1.0);
        render_mono(&mut voice, 256, 0.0);

        voice.stop_note(0.0, false);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert!(render_mono(&mut voice, 256, 0.0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_stop_idle_voice_is_noop() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.stop_note(0.0, true);
        assert_eq!(voice.state(), VoiceState::Idle);
    }

    #[test]
    fn test_restart_matches_fresh_voice() {
        let mut fresh = SubtractiveVoice::new(SR);
        let mut reused = SubtractiveVoice::new(SR);

        reused.start_note(48, 1.0);
        render_mono(&mut reused, 333, 0.0);

        fresh.start_note(60, 0.7);
        reused.start_note(60, 0.7);
        let a = render_mono(&mut fresh, 256, 0.0);
        let b = render_mono(&mut reused, 256, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_env_opens_cutoff() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.update_parameters(&ParamSnapshot {
            filter_env: AdsrParams::new(0.01, 1.0, 1.0, 0.1),
            filter_env_amount: 1.0,
            filter_cutoff: 500.0,
            ..ParamSnapshot::default()
        });
        voice.start_note(60, 1.0);
        // Past the 10 ms attack the envelope sits at 1.0
        render_mono(&mut voice, 512, 0.0);
        render_mono(&mut voice, 512, 0.0);
        assert!((voice.filter().cutoff() - MAX_CUTOFF_HZ).abs() < 1.0);
    }

    #[test]
    fn test_filter_env_disabled_leaves_cutoff() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.update_parameters(&ParamSnapshot {
            filter_env_enabled: false,
            filter_env_amount: 1.0,
            filter_cutoff: 500.0,
            ..ParamSnapshot::default()
        });
        voice.start_note(60, 1.0);
        render_mono(&mut voice, 512, 0.0);
        assert!((voice.filter().cutoff() - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_lfo_scales_cutoff_in_octaves() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.update_parameters(&ParamSnapshot {
            filter_env_enabled: false,
            filter_cutoff: 500.0,
            lfo_amount: 1.0,
            ..ParamSnapshot::default()
        });
        voice.start_note(60, 1.0);

        render_mono(&mut voice, 64, 1.0);
        assert!((voice.filter().cutoff() - 2000.0).abs() < 0.5);

        render_mono(&mut voice, 64, -1.0);
        assert!((voice.filter().cutoff() - 125.0).abs() < 0.1);

        voice.update_lfo(0.5);
        render_mono(&mut voice, 64, 1.0);
        assert!((voice.filter().cutoff() - 1000.0).abs() < 0.5);
    }

    #[test]
    fn test_modulated_cutoff_is_clamped() {
        let modulation = FilterModulation {
            base_cutoff: 15000.0,
            env_enabled: true,
            env_amount: 1.0,
            lfo_amount: 1.0,
        };
        assert_eq!(modulation.cutoff(1.0, 1.0), MAX_CUTOFF_HZ);

        let low = FilterModulation {
            base_cutoff: 30.0,
            env_enabled: false,
            env_amount: 0.0,
            lfo_amount: 1.0,
        };
        assert_eq!(low.cutoff(0.0, -1.0), MIN_CUTOFF_HZ);
    }

    #[test]
    fn test_chunk_average() {
        let lfo = [1.0, 3.0, 5.0, 7.0];
        assert_eq!(chunk_average(&lfo, 0, 2), 2.0);
        assert_eq!(chunk_average(&lfo, 2, 32), 6.0);
        assert_eq!(chunk_average(&lfo, 9, 4), 0.0);
        assert_eq!(chunk_average(&[], 0, 4), 0.0);
    }

    #[test]
    fn test_key_range() {
        let voice = SubtractiveVoice::new(SR).with_key_range(KeyRange::new(72, 48));
        assert_eq!(voice.key_range(), KeyRange { low: 48, high: 72 });
        assert!(voice.can_play_note(48));
        assert!(voice.can_play_note(72));
        assert!(!voice.can_play_note(47));
        assert!(!voice.can_play_note(73));
        assert!(SubtractiveVoice::new(SR).can_play_note(0));
    }

    #[test]
    fn test_prepare_resizes_and_idles() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.start_note(60, 1.0);
        voice.prepare(44100.0, 1024);
        assert_eq!(voice.state(), VoiceState::Idle);

        voice.start_note(60, 1.0);
        let out = render_mono(&mut voice, 1024, 0.0);
        // The whole block renders, not just the first 512 frames
        assert!(out[900..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_update_waveform_toggles_oscillators() {
        let mut voice = SubtractiveVoice::new(SR);
        voice.update_waveform(0, OscillatorWaveform::Saw, false);
        voice.update_waveform(1, OscillatorWaveform::Square, true);
        let bank = voice.oscillators();
        assert!(!bank.is_enabled(0));
        assert!(bank.is_enabled(1));
        assert_eq!(bank.oscillators()[1].waveform(), OscillatorWaveform::Square);
    }
}
