//! ADSR envelope generator for synthesis.
//!
//! Linear, time-accurate attack-decay-sustain-release ramps. An attack of
//! `T` seconds climbs from 0 to 1 in `T × sample_rate` samples, decay and
//! release likewise take exactly their configured time.
//!
//! The level is accumulated in `f64` so that multi-second ramps at high
//! sample rates land on their targets within a sample.

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive. Output is zero.
    #[default]
    Idle,
    /// Output ramps up toward 1.0.
    Attack,
    /// Output falls from 1.0 toward the sustain level.
    Decay,
    /// Output holds at the sustain level while the note is held.
    Sustain,
    /// Output falls to zero after note-off.
    Release,
}

/// Stage times in seconds plus the sustain level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdsrParams {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level, 0.0 to 1.0.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.2,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

impl AdsrParams {
    /// Construct from the four stage values.
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

/// Linear ADSR envelope generator.
///
/// - `note_on` enters Attack from whatever the current level is, so a
///   retrigger during Release ramps up without a click.
/// - `note_off` enters Release from the current level.
/// - `update_envelope` swaps parameters without touching stage or level.
///
/// # Example
///
/// ```rust
/// use maxsynth_synth::{AdsrEnvelope, AdsrParams, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.update_envelope(AdsrParams::new(0.01, 0.1, 0.7, 0.2));
///
/// env.note_on();
/// for _ in 0..480 {
///     env.next_sample();
/// }
/// assert!((env.level() - 1.0).abs() < 1e-6);
///
/// env.note_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f64,
    sample_rate: f64,
    params: AdsrParams,

    // Per-sample level deltas
    attack_rate: f64,
    decay_rate: f64,
    release_rate: f64,
    /// Fraction of a sample the attack overshot 1.0 by, owed to the decay
    decay_carry: f64,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create an idle envelope with default parameters.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate: f64::from(sample_rate.max(1.0)),
            params: AdsrParams::default(),
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
            decay_carry: 0.0,
        };
        env.recalculate_rates();
        env
    }

    /// Set sample rate and recompute ramp rates. Stage and level are kept.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = f64::from(sample_rate.max(1.0));
        self.recalculate_rates();
        if self.state == EnvelopeState::Release {
            self.release_rate = self.level / self.samples_for(self.params.release);
        }
    }

    /// Hot-swap all four parameters.
    ///
    /// Neither stage nor level changes. A ramp in progress continues from
    /// the current level at the new rate. During Release the remaining
    /// tail is rescaled only when the release time itself changes; it then
    /// lasts the new release time from here.
    pub fn update_envelope(&mut self, params: AdsrParams) {
        let previous_release = self.params.release;
        self.params = AdsrParams {
            attack: sanitize_time(params.attack),
            decay: sanitize_time(params.decay),
            sustain: if params.sustain.is_nan() {
                AdsrParams::default().sustain
            } else {
                params.sustain.clamp(0.0, 1.0)
            },
            release: sanitize_time(params.release),
        };
        self.recalculate_rates();
        if self.state == EnvelopeState::Release && self.params.release != previous_release {
            self.release_rate = self.level / self.samples_for(self.params.release);
        }
    }

    /// Current parameters.
    pub fn params(&self) -> AdsrParams {
        self.params
    }

    fn samples_for(&self, seconds: f32) -> f64 {
        (f64::from(seconds) * self.sample_rate).max(1.0)
    }

    fn recalculate_rates(&mut self) {
        self.attack_rate = 1.0 / self.samples_for(self.params.attack);
        self.decay_rate =
            (1.0 - f64::from(self.params.sustain)) / self.samples_for(self.params.decay);
        // The Release slope is fixed at note-off; see `note_off`.
        if self.state != EnvelopeState::Release {
            self.release_rate =
                f64::from(self.params.sustain) / self.samples_for(self.params.release);
        }
    }

    /// Enter Attack from the current level.
    pub fn note_on(&mut self) {
        self.state = EnvelopeState::Attack;
    }

    /// Enter Release from the current level. No-op when idle.
    pub fn note_off(&mut self) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        if self.level > 0.0 {
            self.state = EnvelopeState::Release;
            self.release_rate = self.level / self.samples_for(self.params.release);
        } else {
            self.state = EnvelopeState::Idle;
        }
    }

    /// Hard reset to Idle at level 0.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.decay_carry = 0.0;
    }

    /// Current stage.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current output level without advancing.
    pub fn level(&self) -> f32 {
        self.level as f32
    }

    /// False only when idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {}
            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    // Keep the decay on the original time grid.
                    self.decay_carry = (self.level - 1.0) / self.attack_rate;
                    self.level = 1.0;
                    self.state = if self.params.sustain < 1.0 {
                        EnvelopeState::Decay
                    } else {
                        EnvelopeState::Sustain
                    };
                }
            }
            EnvelopeState::Decay => {
                let sustain = f64::from(self.params.sustain);
                if self.level <= sustain {
                    // Sustain was raised past the level; the Sustain glide takes it up.
                    self.decay_carry = 0.0;
                    self.state = EnvelopeState::Sustain;
                } else {
                    self.level -= self.decay_rate * (1.0 + self.decay_carry);
                    self.decay_carry = 0.0;
                    if self.level <= sustain {
                        self.level = sustain;
                        self.state = EnvelopeState::Sustain;
                    }
                }
            }
            EnvelopeState::Sustain => {
                // Glide toward a sustain level that moved while held.
                let sustain = f64::from(self.params.sustain);
                let step = 1.0 / self.samples_for(self.params.decay);
                if self.level > sustain {
                    self.level = (self.level - step).max(sustain);
                } else if self.level < sustain {
                    self.level = (self.level + step).min(sustain);
                }
            }
            EnvelopeState::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }
        self.level as f32
    }

    /// Advance `samples` samples without reading the intermediate levels.
    #[inline]
    pub fn skip(&mut self, samples: usize) {
        for _ in 0..samples {
            if self.state == EnvelopeState::Idle {
                break;
            }
            self.next_sample();
        }
    }
}

/// Times must be positive and finite; anything else falls back to 1 ms.
fn sanitize_time(seconds: f32) -> f32 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.001
    }
}
