//! Property-based tests for maxsynth-core DSP primitives.
//!
//! Tests ladder filter stability across every mode, limiter bounds and LFO
//! range using proptest for randomized input generation.

use maxsynth_core::{Effect, FilterMode, LadderFilter, Lfo, LfoWaveform, soft_limit};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For any cutoff, resonance and mode, the ladder produces finite output
    /// for random finite input.
    #[test]
    fn ladder_stability(
        freq in 20.0f32..20000.0f32,
        resonance in 0.0f32..=10.0f32,
        mode in 0usize..6,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut filter = LadderFilter::new(48000.0);
        filter.set_cutoff(freq);
        filter.set_resonance(resonance);
        filter.set_mode(FilterMode::from_index(mode));

        // 32 random samples repeated for 1024 samples of excitation
        for _ in 0..32 {
            for &sample in &input {
                let out = filter.process(sample);
                prop_assert!(
                    out.is_finite(),
                    "mode {:?} (freq={}, res={}) produced non-finite output {}",
                    filter.mode(), freq, resonance, out
                );
            }
        }
    }

    /// Cutoff changes every 32 samples, as voices do, never destabilize
    /// the filter.
    #[test]
    fn ladder_chunked_modulation_stability(
        cutoffs in prop::collection::vec(20.0f32..20000.0f32, 1..64),
        resonance in 0.0f32..=10.0f32,
        mode in 0usize..6,
    ) {
        let mut filter = LadderFilter::new(48000.0);
        filter.set_resonance(resonance);
        filter.set_mode(FilterMode::from_index(mode));
        let mut phase = 0.0f32;

        for cutoff in cutoffs {
            filter.set_cutoff(cutoff);
            let mut chunk = [0.0f32; 32];
            for s in chunk.iter_mut() {
                phase = (phase + 0.01) % 1.0;
                *s = 2.0 * phase - 1.0;
            }
            filter.process_block_inplace(&mut chunk);
            prop_assert!(chunk.iter().all(|x| x.is_finite()));
        }
    }

    /// The limiter output never leaves [-1, 1] and is the identity inside
    /// the knee.
    #[test]
    fn soft_limit_bounded(x in -1.0e6f32..1.0e6f32) {
        let y = soft_limit(x);
        prop_assert!((-1.0..=1.0).contains(&y), "soft_limit({}) = {}", x, y);
        if x.abs() <= 0.95 {
            prop_assert_eq!(y, x);
        }
    }

    /// LFO output stays within [-1, 1] for any rate and waveform.
    #[test]
    fn lfo_bounded(freq in 0.1f32..20.0f32, wave in 0usize..4) {
        let mut lfo = Lfo::new(48000.0, freq);
        lfo.set_waveform(LfoWaveform::from_index(wave));
        let mut block = [0.0f32; 512];
        for _ in 0..8 {
            lfo.render(&mut block);
            prop_assert!(block.iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }
}
