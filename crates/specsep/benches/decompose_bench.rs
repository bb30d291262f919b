//! Criterion benchmarks for specsep operations
//!
//! Run with: cargo bench -p specsep

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use specsep::ndarray::{Array2, Axis};
use specsep::{
    Aggregate, DecomposeOptions, HpssOptions, NmfOptions, RecurrenceBuilder, RecurrenceMode, Stft,
    Window, decompose, hpss, magphase, median_filter, nn_filter,
};
use std::f32::consts::PI;

const SAMPLE_RATE: f32 = 22050.0;

/// Tone plus white noise bursts
fn generate_signal(size: usize) -> Vec<f32> {
    let mut state = 0x12345678u32;
    (0..size)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = (state as i32 as f32) / (i32::MAX as f32);
            let tone = (2.0 * PI * 440.0 * i as f32 / SAMPLE_RATE).sin();
            let burst = if (i / 2048) % 4 == 0 { noise } else { 0.0 };
            0.5 * tone + burst
        })
        .collect()
}

/// Magnitude spectrogram with `frames` columns
fn magnitude(frames: usize) -> Array2<f32> {
    let stft = Stft::new(1024, 256, Window::Hann).unwrap();
    let signal = generate_signal(1024 + 256 * (frames - 1));
    let (mag, _) = magphase(stft.analyze(&signal).view());
    mag
}

// ============================================================================
// HPSS benchmarks
// ============================================================================

fn bench_median_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("MedianFilter");
    let mag = magnitude(128);

    for &size in &[5usize, 17, 31] {
        group.bench_with_input(BenchmarkId::new("time", size), &size, |b, &size| {
            b.iter(|| black_box(median_filter(black_box(mag.view()), Axis(1), size)))
        });
        group.bench_with_input(BenchmarkId::new("freq", size), &size, |b, &size| {
            b.iter(|| black_box(median_filter(black_box(mag.view()), Axis(0), size)))
        });
    }

    group.finish();
}

fn bench_hpss(c: &mut Criterion) {
    let mut group = c.benchmark_group("HPSS");

    for &frames in &[64usize, 256] {
        let stft = Stft::new(1024, 256, Window::Hann).unwrap();
        let spec = stft.analyze(&generate_signal(1024 + 256 * (frames - 1)));

        group.bench_with_input(BenchmarkId::new("soft", frames), &frames, |b, _| {
            b.iter(|| black_box(hpss(black_box(spec.view()), &HpssOptions::default())))
        });
        group.bench_with_input(BenchmarkId::new("mask", frames), &frames, |b, _| {
            let options = HpssOptions::default().with_mask(true);
            b.iter(|| black_box(hpss(black_box(spec.view()), &options)))
        });
    }

    group.finish();
}

// ============================================================================
// Nearest-neighbor filter benchmarks
// ============================================================================

fn bench_nn_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("NnFilter");

    for &frames in &[64usize, 256] {
        let mag = magnitude(frames);

        group.bench_with_input(BenchmarkId::new("median", frames), &frames, |b, _| {
            let builder = RecurrenceBuilder::new();
            b.iter(|| black_box(nn_filter(mag.view(), None, &Aggregate::Median, -1, &builder)))
        });
        group.bench_with_input(BenchmarkId::new("nlm", frames), &frames, |b, _| {
            let builder = RecurrenceBuilder::new()
                .with_mode(RecurrenceMode::Affinity)
                .with_sym(true);
            b.iter(|| {
                black_box(nn_filter(
                    mag.view(),
                    None,
                    &Aggregate::WeightedAverage,
                    -1,
                    &builder,
                ))
            })
        });
    }

    group.finish();
}

// ============================================================================
// Decomposition benchmarks
// ============================================================================

fn bench_decompose(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decompose");
    group.sample_size(10);
    let mag = magnitude(128);

    for &k in &[2usize, 8, 16] {
        let options = DecomposeOptions::default()
            .with_n_components(k)
            .with_sort(true)
            .with_nmf(NmfOptions {
                max_iter: 50,
                ..NmfOptions::default()
            });
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, _| {
            b.iter(|| black_box(decompose(black_box(mag.view()), None, &options)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_median_filter,
    bench_hpss,
    bench_nn_filter,
    bench_decompose,
);

criterion_main!(benches);
