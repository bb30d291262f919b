//! Nearest-neighbor filter command.

use super::common::{SettingsArgs, report};
use crate::matrix_io::{read_array, read_matrix, write_array};
use clap::Args;
use specsep::CsrGraph;
use std::path::PathBuf;

#[derive(Args)]
pub struct NnFilterArgs {
    /// Input array (JSON, any rank)
    input: PathBuf,

    /// Output file
    output: PathBuf,

    /// Reducer: mean, median, max, min or weighted
    #[arg(short, long)]
    aggregate: Option<String>,

    /// Axis whose slices are filtered (negative counts from the end)
    #[arg(long, allow_hyphen_values = true)]
    axis: Option<isize>,

    /// Neighbors per point
    #[arg(short, long)]
    k: Option<usize>,

    /// Exclusion band around each point
    #[arg(long)]
    width: Option<usize>,

    /// Distance metric: euclidean, sqeuclidean, manhattan or cosine
    #[arg(long)]
    metric: Option<String>,

    /// Link values: connectivity, distance or affinity
    #[arg(long)]
    mode: Option<String>,

    /// Keep only mutual links
    #[arg(long)]
    sym: bool,

    /// Precomputed similarity graph (dense square JSON matrix); skips graph construction
    #[arg(long)]
    graph: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub fn run(args: NnFilterArgs) -> anyhow::Result<()> {
    let mut nn = args.settings.load()?.nn_filter;
    if let Some(aggregate) = args.aggregate {
        nn.aggregate = aggregate;
    }
    if let Some(axis) = args.axis {
        nn.axis = axis;
    }
    if args.k.is_some() {
        nn.k = args.k;
    }
    if let Some(width) = args.width {
        nn.width = width;
    }
    if let Some(metric) = args.metric {
        nn.metric = metric;
    }
    if let Some(mode) = args.mode {
        nn.mode = mode;
    }
    nn.sym |= args.sym;

    let aggregate = nn.aggregate()?;
    let builder = nn.builder()?;

    let data = read_array(&args.input)?;
    let graph = match &args.graph {
        Some(path) => {
            let dense = read_matrix(path)?;
            let graph = CsrGraph::from_dense(dense.view())?;
            tracing::info!(path = %path.display(), edges = graph.nnz(), "loaded graph");
            Some(graph)
        }
        None => None,
    };

    tracing::info!(
        input = %args.input.display(),
        shape = ?data.shape(),
        aggregate = aggregate.name(),
        axis = nn.axis,
        "filtering"
    );
    let filtered = specsep::nn_filter(data.view(), graph.as_ref(), &aggregate, nn.axis, &builder)?;
    write_array(&args.output, &filtered)?;

    println!("Nearest-neighbor filter ({}):", aggregate.name());
    report("output", &args.output, filtered.shape());
    Ok(())
}
