//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Output Stage
//!
//! - [`soft_limit`] - Bounded soft-knee limiter applied to the final mix
//!
//! # Utilities
//!
//! - [`flush_denormal`] - Zero out subnormal-range values in filter state
//! - [`linear_to_db`] - Level conversion for meters and reports

use libm::{copysignf, logf, tanhf};

/// Threshold below which [`soft_limit`] is the identity.
pub const SOFT_LIMIT_KNEE: f32 = 0.95;

/// Soft-knee limiter.
///
/// Linear for `|x| <= 0.95`. Above the knee the excess is compressed with
/// `tanh`, so the curve is continuous with slope 1 at the knee and
/// approaches ±1 asymptotically. The output never leaves `[-1, 1]`.
///
/// # Example
/// ```rust
/// use maxsynth_core::soft_limit;
///
/// assert_eq!(soft_limit(0.5), 0.5);
/// assert!(soft_limit(10.0) <= 1.0);
/// assert!(soft_limit(-10.0) >= -1.0);
/// ```
#[inline]
pub fn soft_limit(x: f32) -> f32 {
    const HEADROOM: f32 = 1.0 - SOFT_LIMIT_KNEE;

    let magnitude = x.abs();
    if magnitude <= SOFT_LIMIT_KNEE {
        return x;
    }
    if !magnitude.is_finite() {
        // NaN maps to silence, infinities to the rail
        return if x.is_nan() { 0.0 } else { copysignf(1.0, x) };
    }
    let limited = SOFT_LIMIT_KNEE + HEADROOM * tanhf((magnitude - SOFT_LIMIT_KNEE) / HEADROOM);
    copysignf(limited.min(1.0), x)
}

/// Flush denormal (subnormal-range) values to zero.
///
/// Recursive filter state decaying toward zero can enter the subnormal
/// range where some CPUs slow down by orders of magnitude. Values below
/// `1e-20` are inaudible (about -400 dBFS) and are replaced with `0.0`.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Convert linear gain to decibels.
///
/// Input is floored at `1e-10` so silence reports -200 dB instead of -inf.
///
/// # Example
/// ```rust
/// use maxsynth_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_limit_transparent_below_knee() {
        for &x in &[0.0, 0.1, -0.3, 0.9, -0.95, 0.95] {
            assert_eq!(soft_limit(x), x, "knee region must be untouched");
        }
    }

    #[test]
    fn test_soft_limit_bounds() {
        for i in 0..2000 {
            let x = (i as f32 - 1000.0) * 0.05;
            let y = soft_limit(x);
            assert!((-1.0..=1.0).contains(&y), "soft_limit({x}) = {y}");
        }
        assert_eq!(soft_limit(f32::INFINITY), 1.0);
        assert_eq!(soft_limit(f32::NEG_INFINITY), -1.0);
        assert_eq!(soft_limit(f32::NAN), 0.0);
    }

    #[test]
    fn test_soft_limit_monotonic_and_continuous() {
        let mut prev = soft_limit(-4.0);
        let mut x = -4.0f32;
        while x < 4.0 {
            x += 0.001;
            let y = soft_limit(x);
            assert!(y >= prev, "not monotonic at {x}");
            assert!(y - prev < 0.0011, "jump at {x}: {prev} -> {y}");
            prev = y;
        }
    }

    #[test]
    fn test_soft_limit_symmetric() {
        for &x in &[0.96, 1.2, 3.0, 50.0] {
            assert_eq!(soft_limit(-x), -soft_limit(x));
        }
    }

    #[test]
    fn test_linear_to_db_floor() {
        assert!((linear_to_db(0.0) - (-200.0)).abs() < 0.01);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(-0.5), -0.5);
        assert_eq!(flush_denormal(1e-10), 1e-10);
        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-21), 0.0);
        assert_eq!(flush_denormal(0.0), 0.0);
    }
}
