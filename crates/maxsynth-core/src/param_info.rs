//! Parameter metadata for host-facing synth controls.
//!
//! A [`ParamDescriptor`] carries everything a host, GUI or config loader needs
//! to present and validate one parameter: display names, unit, range,
//! default, normalization curve, stable IDs and, for choice parameters, the
//! option labels.
//!
//! Descriptors are plain `Copy` data built with `const fn` factories, so a
//! whole parameter table can live in a `static`.
//!
//! # Example
//!
//! ```rust
//! use maxsynth_core::{ParamDescriptor, ParamId};
//!
//! const ATTACK: ParamDescriptor = ParamDescriptor::time_seconds("Attack", "Atk", 0.1)
//!     .with_id(ParamId(1), "attack")
//!     .with_group("amp");
//!
//! assert_eq!(ATTACK.clamp(9.0), 5.0);
//! assert_eq!(ATTACK.string_id, "attack");
//! ```
//!
//! # no_std Support
//!
//! This module is fully `no_std` compatible with no heap allocations required.

/// Scaling curve for parameter normalization.
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)`, requires `min > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamScale {
    /// Equal resolution across the range.
    #[default]
    Linear,
    /// More resolution at low values. Used for frequencies.
    Logarithmic,
}

/// Stable parameter identifier that survives reordering.
///
/// Once assigned, a `ParamId` must never change for a given parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Parameter capability flags.
///
/// ```rust
/// use maxsynth_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter.
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete integer steps (choices and toggles).
    pub const STEPPED: Self = Self(1 << 1);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Seconds, for envelope times.
    Seconds,
    /// Hertz, for cutoff and LFO rate.
    Hertz,
    /// Dimensionless (levels, amounts, choices).
    None,
}

impl ParamUnit {
    /// Unit suffix for display, including the leading space.
    ///
    /// ```rust
    /// use maxsynth_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Seconds => " s",
            ParamUnit::Hertz => " Hz",
            ParamUnit::None => "",
        }
    }
}

/// Complete description of one synth parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g., "Filter Cutoff").
    pub name: &'static str,
    /// Short name for narrow displays, max 8 characters.
    pub short_name: &'static str,
    /// Unit type for formatting the value.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value at construction and after reset.
    pub default: f32,
    /// Recommended increment for encoder-style control.
    pub step: f32,
    /// Stable numeric ID.
    pub id: ParamId,
    /// Stable string ID used in config files and on the command line.
    pub string_id: &'static str,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Capability flags.
    pub flags: ParamFlags,
    /// Group for tree display (e.g., `"filter"`). Empty means top-level.
    pub group: &'static str,
    /// Option labels for choice parameters, indexed by value. Empty otherwise.
    pub choices: &'static [&'static str],
}

const TOGGLE_LABELS: &[&str] = &["off", "on"];

impl ParamDescriptor {
    /// Envelope time in seconds, 0.01 to 5.0.
    pub const fn time_seconds(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Seconds,
            min: 0.01,
            max: 5.0,
            default,
            step: 0.01,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
            group: "",
            choices: &[],
        }
    }

    /// Dimensionless level or amount, 0.0 to 1.0.
    pub const fn unit_level(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min: 0.0,
            max: 1.0,
            default,
            step: 0.01,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
            group: "",
            choices: &[],
        }
    }

    /// Frequency in Hz with a logarithmic curve.
    pub const fn frequency(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Hertz,
            min,
            max,
            default,
            step: 1.0,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Logarithmic,
            flags: ParamFlags::AUTOMATABLE,
            group: "",
            choices: &[],
        }
    }

    /// Linear continuous range.
    pub const fn linear(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: 0.1,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
            group: "",
            choices: &[],
        }
    }

    /// Choice among `labels`; the value is the label index.
    pub const fn choice(
        name: &'static str,
        short_name: &'static str,
        labels: &'static [&'static str],
        default_index: usize,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min: 0.0,
            max: (labels.len() - 1) as f32,
            default: default_index as f32,
            step: 1.0,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
            group: "",
            choices: labels,
        }
    }

    /// On/off switch stored as 0.0 / 1.0.
    pub const fn toggle(name: &'static str, short_name: &'static str, default_on: bool) -> Self {
        Self::choice(name, short_name, TOGGLE_LABELS, default_on as usize)
    }

    /// Sets the stable parameter ID and string ID.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the parameter group.
    pub const fn with_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    /// True for choice and toggle parameters.
    #[inline]
    pub const fn is_stepped(&self) -> bool {
        self.flags.contains(ParamFlags::STEPPED)
    }

    /// Clamps a value to the valid range, rounding stepped parameters to
    /// the nearest step. NaN maps to the default.
    ///
    /// ```rust
    /// use maxsynth_core::ParamDescriptor;
    ///
    /// let sustain = ParamDescriptor::unit_level("Sustain", "Sus", 0.7);
    /// assert_eq!(sustain.clamp(-1.0), 0.0);
    /// assert_eq!(sustain.clamp(f32::NAN), 0.7);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let clamped = value.clamp(self.min, self.max);
        if self.is_stepped() {
            libm::roundf(clamped)
        } else {
            clamped
        }
    }

    /// Converts a plain value to the normalized range (0.0 to 1.0).
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let value = self.clamp(value);
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return (value - self.min) / range;
                }
                libm::logf(value / self.min) / libm::logf(self.max / self.min)
            }
        }
    }

    /// Converts a normalized value (0.0 to 1.0) to the plain range.
    ///
    /// Inverse of [`normalize`](Self::normalize).
    ///
    /// ```rust
    /// use maxsynth_core::ParamDescriptor;
    ///
    /// let cutoff = ParamDescriptor::frequency("Cutoff", "Cutoff", 20.0, 20000.0, 1000.0);
    /// assert!((cutoff.denormalize(0.5) - 632.46).abs() < 0.1);
    /// ```
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        if normalized.is_nan() {
            return self.default;
        }
        let n = normalized.clamp(0.0, 1.0);
        let plain = match self.scale {
            ParamScale::Linear => self.min + n * (self.max - self.min),
            ParamScale::Logarithmic if self.min > 0.0 => {
                self.min * libm::powf(self.max / self.min, n)
            }
            ParamScale::Logarithmic => self.min + n * (self.max - self.min),
        };
        self.clamp(plain)
    }

    /// Label of the choice selected by `value`, if this is a choice parameter.
    pub fn choice_label(&self, value: f32) -> Option<&'static str> {
        if self.choices.is_empty() {
            return None;
        }
        self.choices.get(self.clamp(value) as usize).copied()
    }

    /// Index of a choice label, compared case-insensitively.
    ///
    /// ```rust
    /// use maxsynth_core::ParamDescriptor;
    ///
    /// let wave = ParamDescriptor::choice("Wave", "Wave", &["Sine", "Saw"], 0);
    /// assert_eq!(wave.choice_index("saw"), Some(1));
    /// assert_eq!(wave.choice_index("pulse"), None);
    /// ```
    pub fn choice_index(&self, label: &str) -> Option<usize> {
        self.choices
            .iter()
            .position(|c| c.eq_ignore_ascii_case(label.trim()))
    }
}
