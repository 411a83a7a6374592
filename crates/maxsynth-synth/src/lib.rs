//! Maxsynth Synth - polyphonic subtractive synthesis engine
//!
//! Builds playable voices from the `maxsynth-core` primitives and manages
//! a fixed pool of them under a real-time, allocation-free render path.
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! - [`Oscillator`] - Phase-accumulator oscillator with PolyBLEP saw/square
//! - [`OscillatorBank`] - Per-voice oscillators with enable flags
//! - [`OscillatorWaveform`] - Sine, Square, Saw, Triangle, Noise
//!
//! ## Envelopes
//!
//! - [`AdsrEnvelope`] - Time-accurate linear ADSR
//! - [`AdsrParams`], [`EnvelopeState`]
//!
//! ```rust
//! use maxsynth_synth::{AdsrEnvelope, AdsrParams};
//!
//! let mut env = AdsrEnvelope::new(48000.0);
//! env.update_envelope(AdsrParams::new(0.01, 0.1, 0.7, 0.2));
//! env.note_on();
//! let level = env.next_sample();
//! assert!(level > 0.0);
//! ```
//!
//! ## Voices
//!
//! - [`Voice`] - Capability interface the engine drives
//! - [`SubtractiveVoice`] - Oscillators, ladder filter, filter and amp envelopes
//! - [`KeyRange`], [`VoiceState`]
//!
//! ## Engine
//!
//! - [`SynthEngine`] - Voice pool with deterministic stealing
//! - [`NoteEvent`] / [`NoteEventKind`] - Block-timestamped note input
//!
//! ## Parameters
//!
//! - [`SynthParams`] - Lock-free store written by the control thread
//! - [`ParamSnapshot`] - Decoded per-block values
//! - [`ParamIndex`], [`PARAMS`] - Parameter table
//! - [`SynthProcessor`] - Store + engine, the host-facing entry point
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc`). Disable the
//! default `std` feature:
//!
//! ```toml
//! [dependencies]
//! maxsynth-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use maxsynth_synth::{NoteEvent, ParamIndex, SynthParams, SynthProcessor};
//!
//! let params = Arc::new(SynthParams::new());
//! params.set(ParamIndex::Osc1Waveform, 2.0); // saw
//! params.set(ParamIndex::FilterCutoff, 1800.0);
//!
//! let mut synth = SynthProcessor::new(Arc::clone(&params), 10);
//! synth.prepare(48000.0, 512, 2);
//!
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! let chord = [
//!     NoteEvent::note_on(60, 0.8),
//!     NoteEvent::note_on(64, 0.8),
//!     NoteEvent::note_on(67, 0.8),
//! ];
//! synth.render(&mut [&mut left[..], &mut right[..]], &chord);
//!
//! assert_eq!(synth.engine().active_voice_count(), 3);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod engine;
pub mod envelope;
pub mod event;
pub mod oscillator;
pub mod params;
pub mod processor;
pub mod voice;

pub use engine::{DEFAULT_SAMPLE_RATE, DEFAULT_VOICE_COUNT, SynthEngine};
pub use envelope::{AdsrEnvelope, AdsrParams, EnvelopeState};
pub use event::{NoteEvent, NoteEventKind};
pub use oscillator::{OSCILLATOR_COUNT, Oscillator, OscillatorBank, OscillatorWaveform};
pub use params::{PARAM_COUNT, PARAMS, ParamIndex, ParamSnapshot, SynthParams};
pub use processor::SynthProcessor;
pub use voice::{
    DEFAULT_MAX_BLOCK_SIZE, FILTER_CHUNK, KeyRange, SubtractiveVoice, VELOCITY_GAIN, Voice,
    VoiceState, midi_to_freq,
};
