//! Parameter value parsing and validation.
//!
//! Values arrive from TOML files and `id=value` command-line assignments.
//! Each is resolved against the synth's descriptor table into a
//! `(ParamIndex, f32)` pair, or rejected with a [`ValidationError`] naming
//! the offending parameter.
//!
//! ```rust
//! use maxsynth_config::{ParamValue, parse_assignment, resolve_param};
//! use maxsynth_synth::ParamIndex;
//!
//! let (param, value) = parse_assignment("filter_cutoff=1.2kHz").unwrap();
//! assert_eq!(param, ParamIndex::FilterCutoff);
//! assert_eq!(value, 1200.0);
//!
//! let (_, wave) = resolve_param("osc1_waveform", &ParamValue::Text("saw".into())).unwrap();
//! assert_eq!(wave, 2.0);
//! ```

use maxsynth_core::ParamDescriptor;
use maxsynth_synth::ParamIndex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// No parameter with this string id.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter or setting.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Value that cannot be interpreted for this parameter.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Name of the parameter or setting.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Folds collected errors: none is `Ok`, one is itself, more is
    /// [`Multiple`](Self::Multiple).
    pub fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }

    /// Individual errors, flattening [`Multiple`](Self::Multiple).
    pub fn errors(&self) -> Vec<&ValidationError> {
        match self {
            ValidationError::Multiple(all) => all.iter().flat_map(|e| e.errors()).collect(),
            other => vec![other],
        }
    }

    pub(crate) fn out_of_range(param: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        ValidationError::OutOfRange {
            param: param.into(),
            value,
            min,
            max,
        }
    }

    pub(crate) fn invalid_format(param: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A parameter value as written in a config file.
///
/// Numbers are plain values in the parameter's unit. Strings are either a
/// choice label (`"saw"`, `"lpf24"`, `"on"`) or a number with a unit
/// suffix (see [`parse_param_value`]). Booleans set toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// On/off switch.
    Bool(bool),
    /// Plain number.
    Number(f64),
    /// Label or number with unit suffix.
    Text(String),
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Number(f64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Parse a parameter value string into an f32.
///
/// Supports various formats:
/// - Plain numbers: "0.5", "1.2", "-0.3"
/// - Percentages: "50%", "120%" (divided by 100)
/// - Decibels: "-6dB", "+3dB" (converted to linear gain)
/// - Time in ms: "100ms" (converted to seconds)
/// - Time in s: "1.5s" (kept as seconds)
/// - Frequency in Hz: "440Hz"
/// - Frequency in kHz: "1.2kHz" (converted to Hz)
pub fn parse_param_value(value: &str) -> Option<f32> {
    let value = value.trim();

    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|v| v / 100.0);
    }

    if let Some(db) = value
        .strip_suffix("dB")
        .or_else(|| value.strip_suffix("db"))
    {
        return db
            .trim()
            .parse::<f32>()
            .ok()
            .map(|v| libm::powf(10.0, v / 20.0));
    }

    if let Some(ms) = value.strip_suffix("ms") {
        return ms.trim().parse::<f32>().ok().map(|v| v / 1000.0);
    }

    if let Some(s) = value.strip_suffix('s') {
        return s.trim().parse::<f32>().ok();
    }

    if let Some(khz) = value
        .strip_suffix("kHz")
        .or_else(|| value.strip_suffix("khz"))
    {
        return khz.trim().parse::<f32>().ok().map(|v| v * 1000.0);
    }

    if let Some(hz) = value
        .strip_suffix("Hz")
        .or_else(|| value.strip_suffix("hz"))
    {
        return hz.trim().parse::<f32>().ok();
    }

    value.parse::<f32>().ok()
}

fn check_range(id: &str, desc: &ParamDescriptor, value: f32) -> ValidationResult<f32> {
    if !value.is_finite() {
        return Err(ValidationError::invalid_format(id, "value is not finite"));
    }
    if value < desc.min || value > desc.max {
        return Err(ValidationError::out_of_range(
            id,
            f64::from(value),
            f64::from(desc.min),
            f64::from(desc.max),
        ));
    }
    if desc.is_stepped() && value.fract() != 0.0 {
        return Err(ValidationError::invalid_format(
            id,
            format!("expected a whole choice index, got {value}"),
        ));
    }
    Ok(value)
}

fn expected_choices(desc: &ParamDescriptor) -> String {
    format!("expected one of: {}", desc.choices.join(", "))
}

/// Resolve one config value against the parameter table.
///
/// Range errors are reported, not clamped: a config that asks for an
/// attack of 9 s is wrong, even though the store would accept and clamp it.
pub fn resolve_param(id: &str, value: &ParamValue) -> ValidationResult<(ParamIndex, f32)> {
    let param =
        ParamIndex::from_id(id).ok_or_else(|| ValidationError::UnknownParameter(id.to_string()))?;
    let desc = param.descriptor();

    let plain = match value {
        ParamValue::Bool(on) => {
            if desc.choices.len() != 2 {
                return Err(ValidationError::invalid_format(
                    id,
                    "booleans only apply to on/off parameters",
                ));
            }
            if *on { 1.0 } else { 0.0 }
        }
        ParamValue::Number(n) => check_range(id, desc, *n as f32)?,
        ParamValue::Text(text) => {
            if let Some(index) = desc.choice_index(text) {
                index as f32
            } else if desc.choices.len() == 2 && text.trim().eq_ignore_ascii_case("true") {
                1.0
            } else if desc.choices.len() == 2 && text.trim().eq_ignore_ascii_case("false") {
                0.0
            } else if let Some(number) = parse_param_value(text) {
                check_range(id, desc, number)?
            } else if desc.is_stepped() {
                return Err(ValidationError::invalid_format(id, expected_choices(desc)));
            } else {
                return Err(ValidationError::invalid_format(
                    id,
                    format!("cannot parse '{text}' as a number"),
                ));
            }
        }
    };

    Ok((param, plain))
}

/// Parse an `id=value` assignment as given on the command line.
pub fn parse_assignment(assignment: &str) -> ValidationResult<(ParamIndex, f32)> {
    let (id, value) = assignment.split_once('=').ok_or_else(|| {
        ValidationError::invalid_format(assignment, "expected an assignment of the form id=value")
    })?;
    resolve_param(id.trim(), &ParamValue::Text(value.trim().to_string()))
}
