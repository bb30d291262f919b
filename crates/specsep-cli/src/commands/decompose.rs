//! Spectrogram factorization command.

use super::common::{SettingsArgs, report};
use crate::matrix_io::{read_matrix, write_array};
use clap::Args;
use specsep::{Decomposition, Factorizer, Nmf};
use std::path::PathBuf;

#[derive(Args)]
pub struct DecomposeArgs {
    /// Input spectrogram (JSON, non-negative, features x samples)
    input: PathBuf,

    /// Output file for the components (features x n)
    #[arg(long)]
    components: PathBuf,

    /// Output file for the activations (n x samples)
    #[arg(long)]
    activations: PathBuf,

    /// Number of components (defaults to the number of features)
    #[arg(short, long)]
    n_components: Option<usize>,

    /// Sort components by the frequency of their peak
    #[arg(long)]
    sort: bool,

    /// Iteration cap
    #[arg(long)]
    max_iter: Option<usize>,

    /// Random initialization seed
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub fn run(args: DecomposeArgs) -> anyhow::Result<()> {
    let mut decompose = args.settings.load()?.decompose;
    if args.n_components.is_some() {
        decompose.n_components = args.n_components;
    }
    decompose.sort |= args.sort;
    if let Some(max_iter) = args.max_iter {
        decompose.max_iter = max_iter;
    }
    if let Some(seed) = args.seed {
        decompose.seed = seed;
    }
    let options = decompose.to_options();

    let s = read_matrix(&args.input)?;
    let n_components = options.n_components.unwrap_or(s.nrows());
    let mut model = Nmf::with_options(n_components, options.nmf);

    tracing::info!(
        input = %args.input.display(),
        shape = ?s.shape(),
        n_components,
        "decomposing"
    );
    let Decomposition {
        components,
        activations,
    } = specsep::decompose(s.view(), Some(&mut model as &mut dyn Factorizer), &options)?;
    tracing::info!(
        iterations = model.n_iter(),
        error = model.reconstruction_err(),
        "factorization finished"
    );

    write_array(&args.components, &components)?;
    write_array(&args.activations, &activations)?;

    println!("Decomposition ({n_components} components):");
    report("components", &args.components, components.shape());
    report("activations", &args.activations, activations.shape());
    Ok(())
}
