//! Reducers that combine a point's neighbors into one value.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Result, SpecsepError};

/// User-supplied reducer over the neighbor values of one lane.
pub type Reducer = Arc<dyn Fn(&[f32]) -> f32 + Send + Sync>;

/// How [`nn_filter`](crate::nn_filter::nn_filter) combines neighbors.
///
/// Only [`Aggregate::WeightedAverage`] looks at link weights; every other
/// reducer treats all neighbors equally.
#[derive(Clone, Default)]
pub enum Aggregate {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Median; mean of the two middle values for even counts
    Median,
    /// Maximum
    Max,
    /// Minimum
    Min,
    /// Mean weighted by link weights, normalized to sum to 1
    WeightedAverage,
    /// Arbitrary reduction, weights ignored
    Custom(Reducer),
}

impl Aggregate {
    /// Wrap a closure as a custom reducer.
    pub fn custom(f: impl Fn(&[f32]) -> f32 + Send + Sync + 'static) -> Self {
        Aggregate::Custom(Arc::new(f))
    }

    /// Whether this reducer consumes link weights.
    pub fn uses_weights(&self) -> bool {
        matches!(self, Aggregate::WeightedAverage)
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::Mean => "mean",
            Aggregate::Median => "median",
            Aggregate::Max => "max",
            Aggregate::Min => "min",
            Aggregate::WeightedAverage => "weighted",
            Aggregate::Custom(_) => "custom",
        }
    }

    /// Reduce `values` to a single number.
    ///
    /// `weights` must be aligned with `values`; it is read only by
    /// [`Aggregate::WeightedAverage`]. `values` may be reordered.
    pub fn reduce(&self, values: &mut [f32], weights: &[f32]) -> f32 {
        match self {
            Aggregate::Mean => values.iter().sum::<f32>() / values.len() as f32,
            Aggregate::Median => median(values),
            Aggregate::Max => values.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            Aggregate::Min => values.iter().copied().fold(f32::INFINITY, f32::min),
            Aggregate::WeightedAverage => {
                let total: f32 = weights.iter().sum();
                values
                    .iter()
                    .zip(weights)
                    .map(|(v, w)| v * w)
                    .sum::<f32>()
                    / total
            }
            Aggregate::Custom(f) => f(&*values),
        }
    }
}

fn median(values: &mut [f32]) -> f32 {
    let n = values.len();
    values.sort_unstable_by(f32::total_cmp);
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

impl fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aggregate {
    type Err = SpecsepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Aggregate::Mean),
            "median" => Ok(Aggregate::Median),
            "max" => Ok(Aggregate::Max),
            "min" => Ok(Aggregate::Min),
            "weighted" | "average" | "weighted-average" => Ok(Aggregate::WeightedAverage),
            other => Err(SpecsepError::invalid(
                "aggregate",
                format!("unknown aggregate '{other}'"),
            )),
        }
    }
}
