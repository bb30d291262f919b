//! Nearest-neighbor filtering of feature matrices.
//!
//! Each slice of the input along the filtering axis (by default, each
//! column/frame) is replaced by an aggregate of the slices it is linked to
//! in a similarity graph. With a median aggregate this is REPET-SIM style
//! de-noising (Rafii & Pardo, 2012); with an affinity-weighted graph and
//! [`Aggregate::WeightedAverage`] it is non-local means (Buades et al., 2005).
//!
//! ```rust,ignore
//! use specsep::{nn_filter, Aggregate, RecurrenceBuilder, Metric};
//!
//! let builder = RecurrenceBuilder::new().with_metric(Metric::Cosine);
//! let smoothed = nn_filter(chroma.view(), None, &Aggregate::Median, -1, &builder)?;
//! ```

use ndarray::{Array, ArrayView, Axis, RemoveAxis, Zip};

use crate::aggregate::Aggregate;
use crate::error::{Result, SpecsepError};
use crate::graph::CsrGraph;
use crate::recurrence::{GraphBuilder, RecurrenceBuilder};

/// Resolve a possibly negative axis index against `ndim` dimensions.
pub fn normalize_axis(axis: isize, ndim: usize) -> Result<Axis> {
    let resolved = if axis < 0 { axis + ndim as isize } else { axis };
    if resolved < 0 || resolved >= ndim as isize {
        return Err(SpecsepError::invalid(
            "axis",
            format!("axis {axis} out of range for {ndim}-d input"),
        ));
    }
    Ok(Axis(resolved as usize))
}

/// Check that `rec` is square and matches the length of the filtering axis.
fn check_graph(rec: &CsrGraph, expected: usize) -> Result<()> {
    let (rows, cols) = rec.shape();
    if rows != cols || rows != expected {
        return Err(SpecsepError::GraphShape {
            rows,
            cols,
            expected,
        });
    }
    Ok(())
}

/// Filter `data` by aggregating graph neighbors along `axis`.
///
/// When `rec` is `None` a graph is built from `data` with `builder`.
/// Slices without neighbors are copied through unchanged. Neighbors are
/// always read from the unfiltered input, never from slices already
/// written to the output.
///
/// # Errors
///
/// [`SpecsepError::GraphShape`] when the graph is not square or its
/// dimension differs from `data.len_of(axis)`;
/// [`SpecsepError::InvalidParameter`] for an out-of-range axis.
pub fn nn_filter<D: RemoveAxis>(
    data: ArrayView<f32, D>,
    rec: Option<&CsrGraph>,
    aggregate: &Aggregate,
    axis: isize,
    builder: &dyn GraphBuilder,
) -> Result<Array<f32, D>> {
    let axis = normalize_axis(axis, data.ndim())?;
    let n = data.len_of(axis);

    let built;
    let rec = match rec {
        Some(rec) => rec,
        None => {
            built = builder.build(data.view().into_dyn(), axis)?;
            &built
        }
    };
    check_graph(rec, n)?;

    let mut output = data.to_owned();
    let mut lane_values = Vec::new();
    let mut skipped = 0usize;

    for i in 0..n {
        let targets = rec.neighbors(i);
        if targets.is_empty() {
            skipped += 1;
            continue;
        }
        let weights = rec.weights(i);
        let neighbors = data.select(axis, targets);

        Zip::from(output.index_axis_mut(axis, i))
            .and(neighbors.lanes(axis))
            .for_each(|out, lane| {
                lane_values.clear();
                lane_values.extend(lane.iter().copied());
                *out = aggregate.reduce(&mut lane_values, weights);
            });
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        points = n,
        skipped,
        aggregate = aggregate.name(),
        "nn_filter done"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = skipped;

    Ok(output)
}

/// [`nn_filter`] with the default [`RecurrenceBuilder`].
pub fn nn_filter_default<D: RemoveAxis>(
    data: ArrayView<f32, D>,
    rec: Option<&CsrGraph>,
    aggregate: &Aggregate,
    axis: isize,
) -> Result<Array<f32, D>> {
    nn_filter(data, rec, aggregate, axis, &RecurrenceBuilder::default())
}
