//! Spectrogram factorization into components and activations.
//!
//! `S ≈ components · activations`, where `S` has shape
//! `(n_features, n_samples)` (e.g. frequency bins by frames), components
//! have shape `(n_features, n_components)` and activations
//! `(n_components, n_samples)`.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis, ErrorKind, ShapeError};

use crate::error::{Result, SpecsepError};
use crate::factorize::{Factorizer, Nmf, NmfOptions};

/// Options for [`decompose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecomposeOptions {
    /// Number of components for the built-in NMF; defaults to `n_features`
    pub n_components: Option<usize>,
    /// Order components by the feature index of their peak
    pub sort: bool,
    /// Fit the factorizer to `S` before transforming
    pub fit: bool,
    /// Solver settings for the built-in NMF
    pub nmf: NmfOptions,
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            n_components: None,
            sort: false,
            fit: true,
            nmf: NmfOptions::default(),
        }
    }
}

impl DecomposeOptions {
    /// Set the number of components.
    pub fn with_n_components(mut self, n: usize) -> Self {
        self.n_components = Some(n);
        self
    }

    /// Enable or disable sorting by spectral peak.
    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Enable or disable fitting.
    pub fn with_fit(mut self, fit: bool) -> Self {
        self.fit = fit;
        self
    }

    /// Set the built-in NMF solver settings.
    pub fn with_nmf(mut self, nmf: NmfOptions) -> Self {
        self.nmf = nmf;
        self
    }
}

/// Result of [`decompose`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// `(n_features, n_components)`
    pub components: Array2<f32>,
    /// `(n_components, n_samples)`
    pub activations: Array2<f32>,
}

impl Decomposition {
    /// `components · activations`
    pub fn reconstruct(&self) -> Array2<f32> {
        self.components.dot(&self.activations)
    }

    /// Number of components.
    pub fn n_components(&self) -> usize {
        self.components.ncols()
    }
}

/// Factorize a spectrogram.
///
/// With no `transformer`, a fresh [`Nmf`] is fit using
/// `options.n_components` and `options.nmf`. A supplied transformer is
/// fit in place when `options.fit` is set, otherwise it must already be
/// fit and is only used to transform `S`.
///
/// # Errors
///
/// - [`SpecsepError::InvalidParameter`] when `fit` is false and no
///   transformer is given.
/// - [`SpecsepError::NotFitted`] when transforming with an unfitted model.
/// - [`SpecsepError::Shape`] when the factorizer output does not match `S`.
pub fn decompose(
    s: ArrayView2<f32>,
    transformer: Option<&mut dyn Factorizer>,
    options: &DecomposeOptions,
) -> Result<Decomposition> {
    let (n_features, n_samples) = s.dim();

    let mut default_model;
    let transformer: &mut dyn Factorizer = match transformer {
        Some(t) => t,
        None => {
            if !options.fit {
                return Err(SpecsepError::invalid(
                    "fit",
                    "fit=false requires a pre-fit transformer",
                ));
            }
            let n_components = options.n_components.unwrap_or(n_features);
            default_model = Nmf::with_options(n_components, options.nmf);
            &mut default_model
        }
    };

    let coefficients = if options.fit {
        transformer.fit_transform(s.t())?
    } else {
        transformer.transform(s.t())?
    };
    let basis = transformer.components().ok_or(SpecsepError::NotFitted)?;

    let n_components = basis.nrows();
    if basis.ncols() != n_features || coefficients.dim() != (n_samples, n_components) {
        return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
    }

    let mut components = basis.t().to_owned();
    let mut activations = coefficients.reversed_axes();

    if options.sort {
        let order = peak_order(components.view());
        components = components.select(Axis(1), &order);
        activations = activations.select(Axis(0), &order);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        n_features,
        n_samples,
        n_components,
        sorted = options.sort,
        "decompose done"
    );

    Ok(Decomposition {
        components,
        activations,
    })
}

/// Index of the largest magnitude; the first one wins ties.
fn peak_index(column: ArrayView1<f32>) -> usize {
    column
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, peak), (i, v)| {
            if v.abs() > peak { (i, v.abs()) } else { (best, peak) }
        })
        .0
}

/// Column permutation that orders components by ascending peak index.
fn peak_order(components: ArrayView2<f32>) -> Vec<usize> {
    let peaks: Vec<usize> = components.columns().into_iter().map(peak_index).collect();
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by_key(|&c| peaks[c]);
    order
}
