//! Harmonic/percussive separation command.

use super::common::{SettingsArgs, report};
use crate::matrix_io::{Spectrogram, read_spectrogram, write_spectrogram};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct HpssArgs {
    /// Input spectrogram (JSON, real or complex)
    input: PathBuf,

    /// Output file for the harmonic part
    #[arg(long)]
    harmonic: PathBuf,

    /// Output file for the percussive part
    #[arg(long)]
    percussive: PathBuf,

    /// Median filter length for both directions
    #[arg(long, conflicts_with_all = ["kernel_harmonic", "kernel_percussive"])]
    kernel: Option<usize>,

    /// Median filter length along time
    #[arg(long)]
    kernel_harmonic: Option<usize>,

    /// Median filter length along frequency
    #[arg(long)]
    kernel_percussive: Option<usize>,

    /// Soft mask exponent
    #[arg(long)]
    power: Option<f32>,

    /// Write binary masks instead of separated spectrograms
    #[arg(long)]
    mask: bool,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub fn run(args: HpssArgs) -> anyhow::Result<()> {
    let mut hpss = args.settings.load()?.hpss;
    if let Some(k) = args.kernel {
        hpss.kernel_size = k;
        hpss.kernel_harmonic = None;
        hpss.kernel_percussive = None;
    }
    if args.kernel_harmonic.is_some() {
        hpss.kernel_harmonic = args.kernel_harmonic;
    }
    if args.kernel_percussive.is_some() {
        hpss.kernel_percussive = args.kernel_percussive;
    }
    if let Some(power) = args.power {
        hpss.power = power;
    }
    hpss.mask |= args.mask;
    let options = hpss.to_options();

    let input = read_spectrogram(&args.input)?;
    let (rows, cols) = input.dim();
    tracing::info!(
        input = %args.input.display(),
        rows,
        cols,
        harmonic_kernel = options.kernel_size.harmonic(),
        percussive_kernel = options.kernel_size.percussive(),
        "separating"
    );

    let (harmonic, percussive) = match input {
        Spectrogram::Real(s) => {
            let (h, p) = specsep::hpss(s.view(), &options)?;
            (Spectrogram::Real(h), Spectrogram::Real(p))
        }
        Spectrogram::Complex(s) if options.mask => {
            let (h, p) = specsep::hpss_masks(s.view(), &options)?;
            (Spectrogram::Real(h), Spectrogram::Real(p))
        }
        Spectrogram::Complex(s) => {
            let (h, p) = specsep::hpss(s.view(), &options)?;
            (Spectrogram::Complex(h), Spectrogram::Complex(p))
        }
    };

    write_spectrogram(&args.harmonic, &harmonic)?;
    write_spectrogram(&args.percussive, &percussive)?;

    let kind = if options.mask { "masks" } else { "components" };
    println!("HPSS {kind}:");
    report("harmonic", &args.harmonic, &[rows, cols]);
    report("percussive", &args.percussive, &[rows, cols]);
    Ok(())
}
