//! Engine and offline render configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use maxsynth_synth::{
    KeyRange, NoteEvent, NoteEventKind, ParamIndex, SubtractiveVoice, SynthEngine, SynthParams,
    SynthProcessor,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{ParamValue, ValidationError, ValidationResult, resolve_param};

const SAMPLE_RATE_RANGE: (u32, u32) = (8000, 384_000);
const BLOCK_SIZE_RANGE: (usize, usize) = (1, 8192);
const CHANNEL_RANGE: (usize, usize) = (1, 8);
const VOICE_RANGE: (usize, usize) = (1, 128);
const MAX_SECONDS: f64 = 3600.0;

/// Inclusive MIDI note range served by every voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRangeConfig {
    /// Lowest note.
    pub low: u8,
    /// Highest note.
    pub high: u8,
}

impl Default for KeyRangeConfig {
    fn default() -> Self {
        Self { low: 0, high: 127 }
    }
}

/// Engine construction settings.
///
/// # TOML Format
///
/// ```toml
/// [engine]
/// sample_rate = 44100
/// max_block_size = 256
/// channels = 2
/// voices = 8
/// key_range = { low = 36, high = 96 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Largest block the engine renders in one pass.
    pub max_block_size: usize,
    /// Output channel count.
    pub channels: usize,
    /// Voice pool size.
    pub voices: usize,
    /// Notes the voices accept.
    pub key_range: KeyRangeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            max_block_size: 512,
            channels: 2,
            voices: 10,
            key_range: KeyRangeConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Every out-of-range setting, as individual errors.
    fn problems(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut check = |name: &str, value: f64, (min, max): (f64, f64)| {
            if !(min..=max).contains(&value) {
                errors.push(ValidationError::out_of_range(name, value, min, max));
            }
        };
        check(
            "engine.sample_rate",
            f64::from(self.sample_rate),
            (f64::from(SAMPLE_RATE_RANGE.0), f64::from(SAMPLE_RATE_RANGE.1)),
        );
        check(
            "engine.max_block_size",
            self.max_block_size as f64,
            (BLOCK_SIZE_RANGE.0 as f64, BLOCK_SIZE_RANGE.1 as f64),
        );
        check(
            "engine.channels",
            self.channels as f64,
            (CHANNEL_RANGE.0 as f64, CHANNEL_RANGE.1 as f64),
        );
        check(
            "engine.voices",
            self.voices as f64,
            (VOICE_RANGE.0 as f64, VOICE_RANGE.1 as f64),
        );
        check(
            "engine.key_range.low",
            f64::from(self.key_range.low),
            (0.0, 127.0),
        );
        check(
            "engine.key_range.high",
            f64::from(self.key_range.high),
            (0.0, 127.0),
        );
        if self.key_range.low > self.key_range.high {
            errors.push(ValidationError::invalid_format(
                "engine.key_range",
                format!(
                    "low note {} is above high note {}",
                    self.key_range.low, self.key_range.high
                ),
            ));
        }
        errors
    }

    /// Check every setting, reporting all problems at once.
    pub fn validate(&self) -> ValidationResult<()> {
        ValidationError::collect(self.problems())
    }

    /// Build and prepare a processor reading `params`.
    pub fn build_processor(&self, params: Arc<SynthParams>) -> SynthProcessor {
        let sample_rate = self.sample_rate as f32;
        let key_range = KeyRange::new(self.key_range.low, self.key_range.high);
        let engine = SynthEngine::from_voices(
            (0..self.voices).map(|_| SubtractiveVoice::new(sample_rate).with_key_range(key_range)),
        );
        let mut processor = SynthProcessor::with_engine(params, engine);
        processor.prepare(
            f64::from(self.sample_rate),
            self.max_block_size,
            self.channels,
        );
        tracing::debug!(
            voices = self.voices,
            sample_rate = self.sample_rate,
            channels = self.channels,
            "processor built from config"
        );
        processor
    }
}

fn default_velocity() -> f32 {
    0.8
}

fn default_duration() -> f64 {
    1.0
}

/// One note of an offline render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    /// MIDI note number.
    pub note: u8,
    /// Velocity, 0 to 1.
    #[serde(default = "default_velocity")]
    pub velocity: f32,
    /// Note-on time in seconds.
    #[serde(default)]
    pub start: f64,
    /// Held time in seconds before note-off.
    #[serde(default = "default_duration")]
    pub duration: f64,
}

impl NoteSpec {
    /// Note starting at `start` held for `duration` seconds.
    pub fn new(note: u8, velocity: f32, start: f64, duration: f64) -> Self {
        Self {
            note,
            velocity,
            start,
            duration,
        }
    }

    fn problems(&self, index: usize) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let field = |name: &str| format!("notes[{index}].{name}");
        if self.note > 127 {
            errors.push(ValidationError::out_of_range(
                field("note"),
                f64::from(self.note),
                0.0,
                127.0,
            ));
        }
        if !(0.0..=1.0).contains(&self.velocity) {
            errors.push(ValidationError::out_of_range(
                field("velocity"),
                f64::from(self.velocity),
                0.0,
                1.0,
            ));
        }
        if !(0.0..=MAX_SECONDS).contains(&self.start) {
            errors.push(ValidationError::out_of_range(
                field("start"),
                self.start,
                0.0,
                MAX_SECONDS,
            ));
        }
        if !(self.duration > 0.0 && self.duration <= MAX_SECONDS) {
            errors.push(ValidationError::out_of_range(
                field("duration"),
                self.duration,
                0.0,
                MAX_SECONDS,
            ));
        }
        errors
    }
}

/// A note event pinned to an absolute frame of the render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    /// Frame at which the event takes effect.
    pub frame: u64,
    /// The event.
    pub event: NoteEvent,
}

fn default_tail() -> f64 {
    1.0
}

fn default_bits() -> u16 {
    32
}

/// Offline render description: engine setup, parameter values, notes.
///
/// # TOML Format
///
/// ```toml
/// tail_seconds = 1.5
/// bits_per_sample = 16
///
/// [engine]
/// voices = 6
///
/// [params]
/// osc1_waveform = "saw"
/// osc2_enabled = true
/// osc2_waveform = "square"
/// filter_cutoff = "1.2kHz"
/// attack = "20ms"
/// release = 0.8
///
/// [[notes]]
/// note = 48
/// duration = 2.0
///
/// [[notes]]
/// note = 55
/// velocity = 0.6
/// start = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Engine construction settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Parameter values by string id. Unnamed parameters keep defaults.
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
    /// Notes to play.
    #[serde(default)]
    pub notes: Vec<NoteSpec>,
    /// Seconds rendered after the last note-off.
    #[serde(default = "default_tail")]
    pub tail_seconds: f64,
    /// Output bit depth: 16, 24 or 32 (float).
    #[serde(default = "default_bits")]
    pub bits_per_sample: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            params: BTreeMap::new(),
            notes: Vec::new(),
            tail_seconds: default_tail(),
            bits_per_sample: default_bits(),
        }
    }
}

impl RenderConfig {
    /// Parse from a TOML string without validating.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Check the engine, every parameter, every note and the tail, and
    /// report all problems found.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = self.engine.problems();
        errors.extend(
            self.params
                .iter()
                .filter_map(|(id, value)| resolve_param(id, value).err()),
        );
        for (i, note) in self.notes.iter().enumerate() {
            errors.extend(note.problems(i));
        }
        if !(0.0..=MAX_SECONDS).contains(&self.tail_seconds) {
            errors.push(ValidationError::out_of_range(
                "tail_seconds",
                self.tail_seconds,
                0.0,
                MAX_SECONDS,
            ));
        }
        if !matches!(self.bits_per_sample, 16 | 24 | 32) {
            errors.push(ValidationError::invalid_format(
                "bits_per_sample",
                format!("expected 16, 24 or 32, got {}", self.bits_per_sample),
            ));
        }

        let result = ValidationError::collect(errors);
        if let Err(err) = &result {
            tracing::warn!(problems = err.errors().len(), "render config rejected");
        }
        result
    }

    /// Parameter values resolved against the table, in file order.
    pub fn resolved_params(&self) -> ValidationResult<Vec<(ParamIndex, f32)>> {
        let mut resolved = Vec::with_capacity(self.params.len());
        let mut errors = Vec::new();
        for (id, value) in &self.params {
            match resolve_param(id, value) {
                Ok(pair) => resolved.push(pair),
                Err(err) => errors.push(err),
            }
        }
        ValidationError::collect(errors)?;
        Ok(resolved)
    }

    /// Write the configured values into a parameter store. Parameters the
    /// config does not name are left as they are.
    pub fn apply_params(&self, store: &SynthParams) -> ValidationResult<()> {
        for (param, value) in self.resolved_params()? {
            store.set(param, value);
        }
        Ok(())
    }

    fn seconds_to_frames(&self, seconds: f64) -> u64 {
        (seconds * f64::from(self.engine.sample_rate)).round().max(0.0) as u64
    }

    /// Note-ons and note-offs pinned to frames, sorted by frame.
    ///
    /// At a shared frame, note-offs come before note-ons so a note that
    /// ends exactly where its repeat begins does not cut the repeat short.
    pub fn schedule(&self) -> Vec<ScheduledEvent> {
        let mut events = Vec::with_capacity(self.notes.len() * 2);
        for spec in &self.notes {
            let on = self.seconds_to_frames(spec.start);
            let off = self.seconds_to_frames(spec.start + spec.duration).max(on + 1);
            events.push(ScheduledEvent {
                frame: on,
                event: NoteEvent::note_on(spec.note, spec.velocity),
            });
            events.push(ScheduledEvent {
                frame: off,
                event: NoteEvent::note_off(spec.note),
            });
        }
        events.sort_by_key(|e| (e.frame, e.event.kind == NoteEventKind::NoteOn));
        events
    }

    /// Total frames: the last note-off plus the tail.
    pub fn total_frames(&self) -> u64 {
        let last_off = self
            .notes
            .iter()
            .map(|n| self.seconds_to_frames(n.start + n.duration))
            .max()
            .unwrap_or(0);
        last_off + self.seconds_to_frames(self.tail_seconds)
    }
}

/// Read, parse and validate a render configuration file.
pub fn load_render_config(path: impl AsRef<Path>) -> Result<RenderConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let config = RenderConfig::from_toml_str(&text)?;
    config.validate()?;
    tracing::info!(
        path = %path.display(),
        notes = config.notes.len(),
        params = config.params.len(),
        "loaded render config"
    );
    Ok(config)
}
