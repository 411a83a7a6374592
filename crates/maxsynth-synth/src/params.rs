//! Parameter layout, lock-free parameter store and per-block snapshots.
//!
//! The control side (UI, host automation, config loader) writes plain `f32`
//! values into [`SynthParams`]. The render thread pulls a [`ParamSnapshot`]
//! once per block. Each value lives in its own `AtomicU32` holding the f32
//! bit pattern, so both sides are wait-free and a read can never observe a
//! torn float. Values written between two snapshots land in the next block.
//!
//! # Example
//!
//! ```rust
//! use maxsynth_synth::{ParamIndex, SynthParams};
//!
//! let params = SynthParams::new();
//! params.set(ParamIndex::FilterCutoff, 2500.0);
//! params.set(ParamIndex::Attack, 99.0); // clamped to 5 s
//!
//! let snapshot = params.snapshot();
//! assert_eq!(snapshot.filter_cutoff, 2500.0);
//! assert_eq!(snapshot.amp_env.attack, 5.0);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use maxsynth_core::{FilterMode, LfoWaveform, ParamDescriptor, ParamId};

use crate::envelope::AdsrParams;
use crate::oscillator::{OSCILLATOR_COUNT, OscillatorWaveform};

/// Number of synth parameters.
pub const PARAM_COUNT: usize = 20;

/// Position of each parameter in [`PARAMS`] and in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ParamIndex {
    Attack = 0,
    Decay,
    Sustain,
    Release,
    FilterAttack,
    FilterDecay,
    FilterSustain,
    FilterRelease,
    FilterEnvEnabled,
    FilterEnvAmount,
    FilterCutoff,
    FilterResonance,
    FilterMode,
    Osc1Waveform,
    Osc1Enabled,
    Osc2Waveform,
    Osc2Enabled,
    LfoFreq,
    LfoAmount,
    LfoWaveform,
}

impl ParamIndex {
    /// Every parameter in table order.
    pub const ALL: [ParamIndex; PARAM_COUNT] = [
        ParamIndex::Attack,
        ParamIndex::Decay,
        ParamIndex::Sustain,
        ParamIndex::Release,
        ParamIndex::FilterAttack,
        ParamIndex::FilterDecay,
        ParamIndex::FilterSustain,
        ParamIndex::FilterRelease,
        ParamIndex::FilterEnvEnabled,
        ParamIndex::FilterEnvAmount,
        ParamIndex::FilterCutoff,
        ParamIndex::FilterResonance,
        ParamIndex::FilterMode,
        ParamIndex::Osc1Waveform,
        ParamIndex::Osc1Enabled,
        ParamIndex::Osc2Waveform,
        ParamIndex::Osc2Enabled,
        ParamIndex::LfoFreq,
        ParamIndex::LfoAmount,
        ParamIndex::LfoWaveform,
    ];

    /// Position in the parameter table.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Descriptor for this parameter.
    #[inline]
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &PARAMS[self.index()]
    }

    /// Stable string id, e.g. `"filter_cutoff"`.
    pub fn id(self) -> &'static str {
        self.descriptor().string_id
    }

    /// Look up a parameter by string id. Matching ignores ASCII case.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.id().eq_ignore_ascii_case(id))
    }
}

const FILTER_MODE_LABELS: &[&str] = &FilterMode::LABELS;
const OSC_WAVEFORM_LABELS: &[&str] = &OscillatorWaveform::LABELS;
const LFO_WAVEFORM_LABELS: &[&str] = &LfoWaveform::LABELS;

/// Descriptor table, indexed by [`ParamIndex`].
pub static PARAMS: [ParamDescriptor; PARAM_COUNT] = [
    ParamDescriptor::time_seconds("Attack", "Atk", 0.1)
        .with_id(ParamId(0), "attack")
        .with_group("Amp Envelope"),
    ParamDescriptor::time_seconds("Decay", "Dec", 0.2)
        .with_id(ParamId(1), "decay")
        .with_group("Amp Envelope"),
    ParamDescriptor::unit_level("Sustain", "Sus", 0.7)
        .with_id(ParamId(2), "sustain")
        .with_group("Amp Envelope"),
    ParamDescriptor::time_seconds("Release", "Rel", 0.3)
        .with_id(ParamId(3), "release")
        .with_group("Amp Envelope"),
    ParamDescriptor::time_seconds("Filter Attack", "F.Atk", 0.1)
        .with_id(ParamId(4), "filter_attack")
        .with_group("Filter Envelope"),
    ParamDescriptor::time_seconds("Filter Decay", "F.Dec", 0.2)
        .with_id(ParamId(5), "filter_decay")
        .with_group("Filter Envelope"),
    ParamDescriptor::unit_level("Filter Sustain", "F.Sus", 0.7)
        .with_id(ParamId(6), "filter_sustain")
        .with_group("Filter Envelope"),
    ParamDescriptor::time_seconds("Filter Release", "F.Rel", 0.3)
        .with_id(ParamId(7), "filter_release")
        .with_group("Filter Envelope"),
    ParamDescriptor::toggle("Filter Env", "F.Env", true)
        .with_id(ParamId(8), "filter_env_enabled")
        .with_group("Filter Envelope"),
    ParamDescriptor::unit_level("Filter Env Amount", "F.Amt", 0.3)
        .with_id(ParamId(9), "filter_env_amount")
        .with_group("Filter Envelope"),
    ParamDescriptor::frequency("Cutoff", "Cutoff", 20.0, 20000.0, 1000.0)
        .with_id(ParamId(10), "filter_cutoff")
        .with_group("Filter"),
    ParamDescriptor::linear("Resonance", "Res", 0.0, 10.0, 0.0)
        .with_id(ParamId(11), "filter_resonance")
        .with_group("Filter"),
    ParamDescriptor::choice("Filter Mode", "Mode", FILTER_MODE_LABELS, 1)
        .with_id(ParamId(12), "filter_mode")
        .with_group("Filter"),
    ParamDescriptor::choice("Osc 1 Waveform", "Osc1", OSC_WAVEFORM_LABELS, 0)
        .with_id(ParamId(13), "osc1_waveform")
        .with_group("Oscillators"),
    ParamDescriptor::toggle("Osc 1 Enabled", "Osc1 On", true)
        .with_id(ParamId(14), "osc1_enabled")
        .with_group("Oscillators"),
    ParamDescriptor::choice("Osc 2 Waveform", "Osc2", OSC_WAVEFORM_LABELS, 0)
        .with_id(ParamId(15), "osc2_waveform")
        .with_group("Oscillators"),
    ParamDescriptor::toggle("Osc 2 Enabled", "Osc2 On", false)
        .with_id(ParamId(16), "osc2_enabled")
        .with_group("Oscillators"),
    ParamDescriptor::frequency("LFO Rate", "Rate", 0.1, 20.0, 2.0)
        .with_id(ParamId(17), "lfo_freq")
        .with_group("LFO"),
    ParamDescriptor::unit_level("LFO Amount", "Depth", 0.0)
        .with_id(ParamId(18), "lfo_amount")
        .with_group("LFO"),
    ParamDescriptor::choice("LFO Waveform", "LFO", LFO_WAVEFORM_LABELS, 0)
        .with_id(ParamId(19), "lfo_waveform")
        .with_group("LFO"),
];

/// One block's worth of parameter values, already clamped and decoded.
///
/// Every voice receives the same snapshot. Build one by hand with struct
/// update syntax or pull it from [`SynthParams::snapshot`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSnapshot {
    /// Amplitude envelope.
    pub amp_env: AdsrParams,
    /// Filter envelope.
    pub filter_env: AdsrParams,
    /// Whether the filter envelope moves the cutoff.
    pub filter_env_enabled: bool,
    /// Filter envelope depth, 0 to 1 of the span from cutoff to 20 kHz.
    pub filter_env_amount: f32,
    /// Base cutoff in Hz.
    pub filter_cutoff: f32,
    /// Resonance, 0 to 10.
    pub filter_resonance: f32,
    /// Filter response.
    pub filter_mode: FilterMode,
    /// Waveform per oscillator.
    pub waveforms: [OscillatorWaveform; OSCILLATOR_COUNT],
    /// Enable flag per oscillator.
    pub osc_enabled: [bool; OSCILLATOR_COUNT],
    /// LFO rate in Hz.
    pub lfo_freq: f32,
    /// LFO-to-cutoff depth, 0 to 1.
    pub lfo_amount: f32,
    /// LFO shape.
    pub lfo_waveform: LfoWaveform,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self::from_values(&default_values())
    }
}

impl ParamSnapshot {
    /// Decode raw values in table order.
    ///
    /// Each value is clamped to its descriptor's range first, so NaN,
    /// out-of-range numbers and unknown choice indices all decode to
    /// something playable.
    pub fn from_values(values: &[f32; PARAM_COUNT]) -> Self {
        let v = |p: ParamIndex| PARAMS[p.index()].clamp(values[p.index()]);
        let on = |p: ParamIndex| v(p) >= 0.5;
        let choice = |p: ParamIndex| v(p) as usize;

        Self {
            amp_env: AdsrParams::new(
                v(ParamIndex::Attack),
                v(ParamIndex::Decay),
                v(ParamIndex::Sustain),
                v(ParamIndex::Release),
            ),
            filter_env: AdsrParams::new(
                v(ParamIndex::FilterAttack),
                v(ParamIndex::FilterDecay),
                v(ParamIndex::FilterSustain),
                v(ParamIndex::FilterRelease),
            ),
            filter_env_enabled: on(ParamIndex::FilterEnvEnabled),
            filter_env_amount: v(ParamIndex::FilterEnvAmount),
            filter_cutoff: v(ParamIndex::FilterCutoff),
            filter_resonance: v(ParamIndex::FilterResonance),
            filter_mode: FilterMode::from_index(choice(ParamIndex::FilterMode)),
            waveforms: [
                OscillatorWaveform::from_index(choice(ParamIndex::Osc1Waveform)),
                OscillatorWaveform::from_index(choice(ParamIndex::Osc2Waveform)),
            ],
            osc_enabled: [on(ParamIndex::Osc1Enabled), on(ParamIndex::Osc2Enabled)],
            lfo_freq: v(ParamIndex::LfoFreq),
            lfo_amount: v(ParamIndex::LfoAmount),
            lfo_waveform: LfoWaveform::from_index(choice(ParamIndex::LfoWaveform)),
        }
    }
}

fn default_values() -> [f32; PARAM_COUNT] {
    core::array::from_fn(|i| PARAMS[i].default)
}

/// Lock-free parameter store shared between control and render threads.
///
/// Wrap it in an `Arc` and hand one clone to the processor. Writers call
/// [`set`](Self::set) from any thread; the render thread calls
/// [`snapshot`](Self::snapshot) once per block.
#[derive(Debug)]
pub struct SynthParams {
    values: [AtomicU32; PARAM_COUNT],
}

impl Default for SynthParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthParams {
    /// Create a store holding every parameter's default.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(PARAMS[i].default.to_bits())),
        }
    }

    /// Current plain value.
    #[inline]
    pub fn get(&self, param: ParamIndex) -> f32 {
        f32::from_bits(self.values[param.index()].load(Ordering::Acquire))
    }

    /// Clamp `value` to the parameter's range, store it and return what was
    /// stored.
    #[inline]
    pub fn set(&self, param: ParamIndex, value: f32) -> f32 {
        let clamped = param.descriptor().clamp(value);
        self.values[param.index()].store(clamped.to_bits(), Ordering::Release);
        clamped
    }

    /// Current value mapped to 0.0..=1.0 along the parameter's curve.
    pub fn get_normalized(&self, param: ParamIndex) -> f32 {
        param.descriptor().normalize(self.get(param))
    }

    /// Set from a 0.0..=1.0 position along the parameter's curve.
    pub fn set_normalized(&self, param: ParamIndex, normalized: f32) -> f32 {
        self.set(param, param.descriptor().denormalize(normalized))
    }

    /// Set by string id. Returns `None` for an unknown id.
    pub fn set_by_id(&self, id: &str, value: f32) -> Option<f32> {
        ParamIndex::from_id(id).map(|param| self.set(param, value))
    }

    /// Restore every parameter to its default.
    pub fn reset_to_defaults(&self) {
        for (slot, desc) in self.values.iter().zip(PARAMS.iter()) {
            slot.store(desc.default.to_bits(), Ordering::Release);
        }
    }

    /// Read every value once and decode into a snapshot.
    pub fn snapshot(&self) -> ParamSnapshot {
        let values: [f32; PARAM_COUNT] =
            core::array::from_fn(|i| f32::from_bits(self.values[i].load(Ordering::Acquire)));
        ParamSnapshot::from_values(&values)
    }
}
