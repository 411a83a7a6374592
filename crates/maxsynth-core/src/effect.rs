//! Mono sample-processor trait.
//!
//! The [`Effect`] trait is the seam between stateful DSP blocks and the
//! voices that drive them. A voice owns its processors by value and calls
//! them through static dispatch. The trait stays object-safe so a processor
//! can also be boxed behind `dyn Effect` in tooling and tests.
//!
//! All methods are real-time safe: none of them allocate, block or fail.

/// Core trait for single-channel audio processors.
///
/// # Example
///
/// ```rust
/// use maxsynth_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut g = Gain { gain: 0.5 };
/// let mut block = [1.0f32; 4];
/// g.process_block_inplace(&mut block);
/// assert_eq!(block, [0.5; 4]);
/// ```
pub trait Effect {
    /// Process a single sample, advancing internal state by one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate and recompute rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal history without touching parameters.
    fn reset(&mut self);
}
