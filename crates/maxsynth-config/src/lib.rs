//! Configuration for offline rendering with the maxsynth synthesizer.
//!
//! Render jobs are described in TOML: engine settings, parameter values by
//! string id, and a list of timed notes. Values are checked against the
//! synth's parameter table before anything is rendered, and every problem
//! in a file is reported together.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use maxsynth_config::RenderConfig;
//! use maxsynth_synth::{ParamIndex, SynthParams};
//!
//! let config = RenderConfig::from_toml_str(r#"
//!     tail_seconds = 0.5
//!
//!     [params]
//!     osc1_waveform = "saw"
//!     filter_cutoff = "800Hz"
//!
//!     [[notes]]
//!     note = 57
//!     duration = 0.25
//! "#).unwrap();
//! config.validate().unwrap();
//!
//! let params = Arc::new(SynthParams::new());
//! config.apply_params(&params).unwrap();
//! assert_eq!(params.get(ParamIndex::FilterCutoff), 800.0);
//!
//! let processor = config.engine.build_processor(Arc::clone(&params));
//! assert_eq!(processor.engine().voice_count(), 10);
//! assert_eq!(config.total_frames(), 12000 + 24000);
//! ```

mod error;
mod render_config;

/// Parameter value parsing and validation.
pub mod validation;

pub use error::ConfigError;
pub use render_config::{
    EngineConfig, KeyRangeConfig, NoteSpec, RenderConfig, ScheduledEvent, load_render_config,
};
pub use validation::{
    ParamValue, ValidationError, ValidationResult, parse_assignment, parse_param_value,
    resolve_param,
};
