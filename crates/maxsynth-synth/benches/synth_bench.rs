//! Criterion benchmarks for maxsynth-synth components
//!
//! Run with: cargo bench -p maxsynth-synth

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use maxsynth_synth::{
    AdsrEnvelope, AdsrParams, NoteEvent, OscillatorBank, OscillatorWaveform, ParamIndex,
    SynthEngine, SynthParams, SynthProcessor,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];
const POLYPHONY: &[usize] = &[1, 4, 10, 16];

// ============================================================================
// Oscillator benchmarks
// ============================================================================

fn bench_oscillator_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("OscillatorBank");

    for (i, label) in OscillatorWaveform::LABELS.iter().enumerate() {
        for &block_size in BLOCK_SIZES {
            let mut bank = OscillatorBank::new(SAMPLE_RATE);
            bank.set_waveform(0, OscillatorWaveform::from_index(i));
            bank.set_frequency(440.0, true);
            let mut buffer = vec![0.0f32; block_size];

            group.bench_with_input(BenchmarkId::new(*label, block_size), &block_size, |b, _| {
                b.iter(|| {
                    bank.process(&mut buffer);
                    black_box(buffer[0])
                })
            });
        }
    }

    group.finish();
}

// ============================================================================
// Envelope benchmarks
// ============================================================================

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("AdsrEnvelope");

    for &block_size in BLOCK_SIZES {
        let mut env = AdsrEnvelope::new(SAMPLE_RATE);
        env.update_envelope(AdsrParams::new(2.0, 2.0, 0.5, 1.0));
        env.note_on();

        group.bench_with_input(
            BenchmarkId::new("next_sample", block_size),
            &block_size,
            |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for _ in 0..size {
                        sum += env.next_sample();
                    }
                    if !env.is_active() {
                        env.note_on();
                    }
                    black_box(sum)
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Engine benchmarks
// ============================================================================

fn held_engine(voices: usize, block_size: usize) -> SynthEngine {
    let mut engine = SynthEngine::new(voices);
    engine.prepare(f64::from(SAMPLE_RATE), block_size, 2);
    for i in 0..voices {
        engine.note_on(48 + (i as u8 * 3) % 40, 0.8);
    }
    engine
}

fn bench_engine_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("SynthEngine");

    for &voices in POLYPHONY {
        for &block_size in BLOCK_SIZES {
            let mut engine = held_engine(voices, block_size);
            let mut left = vec![0.0f32; block_size];
            let mut right = vec![0.0f32; block_size];

            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), block_size),
                &block_size,
                |b, _| {
                    b.iter(|| {
                        engine.render(&mut [&mut left[..], &mut right[..]], &[]);
                        black_box(left[0])
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_processor_with_modulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("SynthProcessor_Modulated");

    for &block_size in BLOCK_SIZES {
        let params = Arc::new(SynthParams::new());
        params.set(ParamIndex::Osc1Waveform, 2.0);
        params.set(ParamIndex::Osc2Enabled, 1.0);
        params.set(ParamIndex::Osc2Waveform, 1.0);
        params.set(ParamIndex::LfoAmount, 0.7);
        params.set(ParamIndex::FilterResonance, 6.0);
        let mut synth = SynthProcessor::new(Arc::clone(&params), 10);
        synth.prepare(f64::from(SAMPLE_RATE), block_size, 2);

        let chord: Vec<NoteEvent> = [48, 55, 60, 64, 67, 71, 74, 79]
            .iter()
            .map(|&n| NoteEvent::note_on(n, 0.9))
            .collect();
        let mut left = vec![0.0f32; block_size];
        let mut right = vec![0.0f32; block_size];
        synth.render(&mut [&mut left[..], &mut right[..]], &chord);

        let mut cutoff = 200.0f32;
        group.bench_with_input(
            BenchmarkId::new("8_note_chord", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    // Simulated automation from the control thread
                    cutoff = if cutoff > 8000.0 { 200.0 } else { cutoff * 1.01 };
                    params.set(ParamIndex::FilterCutoff, cutoff);
                    synth.render(&mut [&mut left[..], &mut right[..]], &[]);
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_oscillator_bank,
    bench_envelope,
    bench_engine_render,
    bench_processor_with_modulation,
);
criterion_main!(benches);
