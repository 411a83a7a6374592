//! Criterion benchmarks for maxsynth-core primitives
//!
//! Run with: cargo bench -p maxsynth-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use maxsynth_core::{Effect, FilterMode, LadderFilter, Lfo, soft_limit};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn bench_ladder_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("LadderFilter");

    for mode in FilterMode::ALL {
        for &block_size in BLOCK_SIZES {
            let mut filter = LadderFilter::new(SAMPLE_RATE);
            filter.set_mode(mode);
            filter.set_cutoff(1200.0);
            filter.set_resonance(4.0);
            let mut buffer: Vec<f32> = (0..block_size)
                .map(|i| ((i as f32) * 0.05).sin() * 0.5)
                .collect();

            group.bench_with_input(
                BenchmarkId::new(mode.label(), block_size),
                &block_size,
                |b, _| {
                    b.iter(|| {
                        filter.process_block_inplace(&mut buffer);
                        black_box(&buffer);
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_ladder_chunked_cutoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("LadderFilter_chunked_cutoff");

    for &block_size in BLOCK_SIZES {
        let mut filter = LadderFilter::new(SAMPLE_RATE);
        let mut buffer = vec![0.25f32; block_size];

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    for (i, chunk) in buffer.chunks_mut(32).enumerate() {
                        filter.set_cutoff(500.0 + i as f32 * 100.0);
                        filter.process_block_inplace(chunk);
                    }
                    black_box(&buffer);
                })
            },
        );
    }

    group.finish();
}

fn bench_lfo_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("Lfo");

    for &block_size in BLOCK_SIZES {
        let mut lfo = Lfo::new(SAMPLE_RATE, 2.0);
        let mut buffer = vec![0.0f32; block_size];

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    lfo.render(&mut buffer);
                    black_box(&buffer);
                })
            },
        );
    }

    group.finish();
}

fn bench_soft_limit(c: &mut Criterion) {
    let input: Vec<f32> = (0..1024).map(|i| (i as f32 - 512.0) / 256.0).collect();
    c.bench_function("soft_limit_1024", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for &x in &input {
                sum += soft_limit(black_box(x));
            }
            black_box(sum)
        })
    });
}

criterion_group!(
    benches,
    bench_ladder_modes,
    bench_ladder_chunked_cutoff,
    bench_lfo_render,
    bench_soft_limit
);
criterion_main!(benches);
