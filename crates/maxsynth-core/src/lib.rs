//! Maxsynth Core - DSP primitives for the maxsynth subtractive synthesizer
//!
//! This crate provides the building blocks every voice is assembled from,
//! designed for real-time rendering with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Processing
//!
//! - [`Effect`] - Object-safe trait for mono sample processors
//!
//! ## Filters
//!
//! - [`LadderFilter`] - Four-stage ladder with six response modes
//! - [`FilterMode`] - LPF/HPF/BPF at 12 and 24 dB/oct
//!
//! ## Modulation
//!
//! - [`Lfo`] - Free-running low-frequency oscillator with block rendering
//!
//! ## Parameters
//!
//! - [`ParamDescriptor`] - Range, default, scale and display metadata
//! - [`ParamId`], [`ParamScale`], [`ParamUnit`], [`ParamFlags`]
//!
//! ## Utilities
//!
//! - [`soft_limit`] - Transparent below ±0.95, tanh knee above
//! - [`flush_denormal`], [`linear_to_db`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! maxsynth-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use maxsynth_core::{Effect, FilterMode, LadderFilter, Lfo};
//!
//! let mut filter = LadderFilter::new(48000.0);
//! filter.set_mode(FilterMode::Lpf24);
//! filter.set_cutoff(1200.0);
//! filter.set_resonance(3.0);
//!
//! let mut lfo = Lfo::new(48000.0, 2.0);
//! let mut block = [0.0f32; 64];
//! lfo.render(&mut block);
//!
//! let y = filter.process(0.5);
//! assert!(y.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod effect;
pub mod ladder;
pub mod lfo;
pub mod math;
pub mod param_info;

pub use effect::Effect;
pub use ladder::{FilterMode, LadderFilter, MAX_CUTOFF_HZ, MAX_RESONANCE, MIN_CUTOFF_HZ};
pub use lfo::{Lfo, LfoWaveform};
pub use math::{SOFT_LIMIT_KNEE, flush_denormal, linear_to_db, soft_limit};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit};
