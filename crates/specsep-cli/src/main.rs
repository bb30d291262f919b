//! specsep CLI - spectrogram decomposition from the command line.
//!
//! Matrices are read and written as JSON (see [`matrix_io`]). Logging goes
//! to stderr and is controlled with `RUST_LOG`.

mod commands;
mod matrix_io;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "specsep")]
#[command(author, version, about = "Spectrogram decomposition CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a spectrogram into harmonic and percussive parts
    Hpss(commands::hpss::HpssArgs),

    /// Replace each slice with an aggregate of its nearest neighbors
    NnFilter(commands::nn_filter::NnFilterArgs),

    /// Factorize a spectrogram into components and activations
    Decompose(commands::decompose::DecomposeArgs),

    /// Show, validate and write settings files
    Config(commands::config::ConfigArgs),

    /// List and inspect profiles
    Profiles(commands::profiles::ProfilesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hpss(args) => commands::hpss::run(args),
        Commands::NnFilter(args) => commands::nn_filter::run(args),
        Commands::Decompose(args) => commands::decompose::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Profiles(args) => commands::profiles::run(args),
    }
}
