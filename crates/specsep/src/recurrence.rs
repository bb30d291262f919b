//! k-nearest-neighbor recurrence graphs.
//!
//! [`GraphBuilder`] is the seam through which [`nn_filter`](crate::nn_filter)
//! obtains a similarity graph when the caller does not supply one.
//! [`RecurrenceBuilder`] is the default: every slice of the input along the
//! chosen axis is a point, and each point links to its `k` nearest
//! neighbors outside a `width`-wide band around itself.

use std::str::FromStr;

use ndarray::{ArrayViewD, Axis};

use crate::error::{Result, SpecsepError};
use crate::graph::CsrGraph;

/// Builds a sparse neighbor graph over the slices of `data` along `axis`.
///
/// Implementations must return a square graph whose dimension equals
/// `data.len_of(axis)`; row `i` lists the neighbors of slice `i`.
pub trait GraphBuilder {
    /// Build the graph.
    fn build(&self, data: ArrayViewD<f32>, axis: Axis) -> Result<CsrGraph>;
}

/// Distance between two feature vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// L2 distance
    #[default]
    Euclidean,
    /// Squared L2 distance
    SqEuclidean,
    /// L1 distance
    Manhattan,
    /// One minus cosine similarity; 1 when either vector is all zeros
    Cosine,
}

impl Metric {
    /// Distance between `a` and `b`.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Euclidean => Metric::SqEuclidean.distance(a, b).sqrt(),
            Metric::SqEuclidean => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            Metric::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            Metric::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if na == 0.0 || nb == 0.0 {
                    1.0
                } else {
                    (1.0 - dot / (na * nb)).max(0.0)
                }
            }
        }
    }
}

impl FromStr for Metric {
    type Err = SpecsepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "sqeuclidean" => Ok(Metric::SqEuclidean),
            "manhattan" | "cityblock" | "l1" => Ok(Metric::Manhattan),
            "cosine" => Ok(Metric::Cosine),
            other => Err(SpecsepError::invalid(
                "metric",
                format!("unknown metric '{other}'"),
            )),
        }
    }
}

/// What the stored link values mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecurrenceMode {
    /// Every link has weight 1
    #[default]
    Connectivity,
    /// Link weight is the distance
    Distance,
    /// Link weight is `exp(-distance / bandwidth)`
    Affinity,
}

impl FromStr for RecurrenceMode {
    type Err = SpecsepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "connectivity" => Ok(RecurrenceMode::Connectivity),
            "distance" => Ok(RecurrenceMode::Distance),
            "affinity" => Ok(RecurrenceMode::Affinity),
            other => Err(SpecsepError::invalid(
                "mode",
                format!("unknown recurrence mode '{other}'"),
            )),
        }
    }
}

/// k-nearest-neighbor recurrence graph builder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceBuilder {
    /// Neighbors kept per point; `None` picks `2 * ceil(sqrt(t - 2 * width + 1))`
    pub k: Option<usize>,
    /// Points closer than `width` in index are never linked
    pub width: usize,
    /// Distance function
    pub metric: Metric,
    /// Keep only mutual links
    pub sym: bool,
    /// Link value semantics
    pub mode: RecurrenceMode,
    /// Affinity kernel bandwidth; `None` uses the median of per-row maximum distances
    pub bandwidth: Option<f32>,
}

impl Default for RecurrenceBuilder {
    fn default() -> Self {
        Self {
            k: None,
            width: 1,
            metric: Metric::Euclidean,
            sym: false,
            mode: RecurrenceMode::Connectivity,
            bandwidth: None,
        }
    }
}

impl RecurrenceBuilder {
    /// Builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of neighbors.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Set the exclusion band width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Keep only mutual links.
    pub fn with_sym(mut self, sym: bool) -> Self {
        self.sym = sym;
        self
    }

    /// Set the link value mode.
    pub fn with_mode(mut self, mode: RecurrenceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the affinity bandwidth.
    pub fn with_bandwidth(mut self, bandwidth: f32) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    /// Effective neighbor count for `t` points.
    pub fn effective_k(&self, t: usize) -> usize {
        self.k.unwrap_or_else(|| {
            if t > 2 * self.width + 1 {
                2 * ((t - 2 * self.width + 1) as f32).sqrt().ceil() as usize
            } else {
                2
            }
        })
    }

    fn validate(&self, t: usize) -> Result<()> {
        if self.width < 1 || self.width > t {
            return Err(SpecsepError::invalid(
                "width",
                format!("must satisfy 1 <= width <= {t}, got {}", self.width),
            ));
        }
        if self.k == Some(0) {
            return Err(SpecsepError::invalid("k", "must be at least 1"));
        }
        if let Some(bw) = self.bandwidth
            && !(bw > 0.0 && bw.is_finite())
        {
            return Err(SpecsepError::invalid(
                "bandwidth",
                format!("must be positive, got {bw}"),
            ));
        }
        Ok(())
    }

    /// Nearest-neighbor distances for every point, before mode conversion.
    ///
    /// Distance-valued modes cannot store a zero distance, so such links are
    /// dropped before the k nearest are chosen.
    fn neighbor_distances(&self, points: &[Vec<f32>]) -> Vec<Vec<(usize, f32)>> {
        let drop_zero = self.mode != RecurrenceMode::Connectivity;
        let t = points.len();
        let k = self.effective_k(t);
        let n_candidates = (t - 1).min(k + 2 * self.width);

        (0..t)
            .map(|i| {
                let mut candidates: Vec<(usize, f32)> = (0..t)
                    .filter(|&j| j != i)
                    .map(|j| (j, self.metric.distance(&points[i], &points[j])))
                    .collect();
                candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
                candidates.truncate(n_candidates);
                candidates.retain(|&(j, d)| i.abs_diff(j) >= self.width && !(drop_zero && d == 0.0));
                candidates.truncate(k);
                candidates
            })
            .collect()
    }
}

impl GraphBuilder for RecurrenceBuilder {
    fn build(&self, data: ArrayViewD<f32>, axis: Axis) -> Result<CsrGraph> {
        if axis.index() >= data.ndim() {
            return Err(SpecsepError::invalid(
                "axis",
                format!("axis {} out of range for {}-d input", axis.index(), data.ndim()),
            ));
        }
        let t = data.len_of(axis);
        self.validate(t)?;

        let points: Vec<Vec<f32>> = data
            .axis_iter(axis)
            .map(|slice| slice.iter().copied().collect())
            .collect();

        let values = self
            .neighbor_distances(&points)
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(j, d)| match self.mode {
                        RecurrenceMode::Connectivity => (j, 1.0),
                        _ => (j, d),
                    })
                    .collect()
            })
            .collect();
        let mut graph = CsrGraph::from_rows(t, values);

        if self.sym {
            graph = graph.minimum(&graph.transpose())?;
        }

        if self.mode == RecurrenceMode::Affinity {
            let bandwidth = match self.bandwidth {
                Some(bw) => bw,
                None => median_row_max(&graph),
            };
            graph = graph.map_weights(|d| (-d / bandwidth).exp());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            points = t,
            links = graph.nnz(),
            mode = ?self.mode,
            "recurrence graph built"
        );

        Ok(graph)
    }
}

/// Median over rows of the largest link value; 1 for an empty graph.
fn median_row_max(graph: &CsrGraph) -> f32 {
    let (n, _) = graph.shape();
    let mut maxima: Vec<f32> = (0..n).filter_map(|i| graph.row_max(i)).collect();
    if maxima.is_empty() {
        return 1.0;
    }
    maxima.sort_unstable_by(f32::total_cmp);
    let m = maxima.len();
    if m % 2 == 1 {
        maxima[m / 2]
    } else {
        0.5 * (maxima[m / 2 - 1] + maxima[m / 2])
    }
}
