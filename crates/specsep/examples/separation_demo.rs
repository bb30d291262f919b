//! Separation demo: HPSS on a tone plus clicks, then NMF on the harmonic part.
//!
//! Run with: cargo run -p specsep --example separation_demo

use specsep::{
    Aggregate, DecomposeOptions, HpssOptions, RecurrenceBuilder, Stft, Window, decompose, hpss,
    magphase, nn_filter,
};
use std::f32::consts::PI;

fn main() -> specsep::Result<()> {
    let sample_rate = 16000.0;

    // --- 440 Hz tone with a click every 2000 samples ---
    let signal: Vec<f32> = (0..16000)
        .map(|i| {
            let tone = 0.5 * (2.0 * PI * 440.0 * i as f32 / sample_rate).sin();
            let click = if i % 2000 == 0 { 1.0 } else { 0.0 };
            tone + click
        })
        .collect();

    let stft = Stft::new(512, 128, Window::Hann)?;
    let spectrogram = stft.analyze(&signal);
    println!("=== STFT ===\n");
    println!("  bins x frames: {:?}\n", spectrogram.dim());

    // --- HPSS ---
    println!("=== Harmonic/Percussive Separation ===\n");
    let options = HpssOptions::default().with_kernel_size(17);
    let (harmonic, percussive) = hpss(spectrogram.view(), &options)?;

    let energy = |s: &specsep::ndarray::Array2<specsep::Complex<f32>>| -> f32 {
        s.iter().map(|z| z.norm_sqr()).sum()
    };
    println!("  harmonic energy:   {:.1}", energy(&harmonic));
    println!("  percussive energy: {:.1}\n", energy(&percussive));

    // --- Nearest-neighbor smoothing of the harmonic magnitude ---
    println!("=== Nearest-Neighbor Median Filter ===\n");
    let (magnitude, _) = magphase(harmonic.view());
    let builder = RecurrenceBuilder::default().with_k(5);
    let smoothed = nn_filter(magnitude.view(), None, &Aggregate::Median, -1, &builder)?;
    let change: f32 = (&smoothed - &magnitude).mapv(f32::abs).sum() / magnitude.len() as f32;
    println!("  mean absolute change: {change:.4}\n");

    // --- NMF on the smoothed magnitude ---
    println!("=== Decomposition ===\n");
    let result = decompose(
        smoothed.view(),
        None,
        &DecomposeOptions::default().with_n_components(4).with_sort(true),
    )?;
    for (k, column) in result.components.columns().into_iter().enumerate() {
        let peak = column
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        let freq = peak.0 as f32 * sample_rate / stft.fft_size() as f32;
        println!("  component {k}: peak bin {:3} ({freq:.0} Hz)", peak.0);
    }

    Ok(())
}
