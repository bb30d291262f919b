//! Matrix factorization backends for [`decompose`](crate::decompose).
//!
//! A [`Factorizer`] learns a basis from sample-major data `X` (rows are
//! samples, columns are features) and expresses samples as non-negative
//! combinations of that basis. [`Nmf`] is the built-in implementation.

use ndarray::{Array2, ArrayView2, ErrorKind, ShapeError, Zip};

use crate::error::{Result, SpecsepError};

/// Guards the multiplicative update denominators.
const EPSILON: f32 = 1e-12;

/// Convergence is tested every this many iterations.
const CHECK_EVERY: usize = 10;

/// Fit/transform interface for a factorization backend.
///
/// For `X` of shape `(n_samples, n_features)`, both methods return the
/// per-sample coefficients with shape `(n_samples, n_components)`, and
/// [`components`](Factorizer::components) has shape
/// `(n_components, n_features)`.
pub trait Factorizer {
    /// Learn a basis from `x` and return its coefficients.
    fn fit_transform(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Express `x` in the already-learned basis.
    ///
    /// # Errors
    ///
    /// [`SpecsepError::NotFitted`] if no basis has been learned.
    fn transform(&self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Learned basis, one component per row, or `None` before fitting.
    fn components(&self) -> Option<ArrayView2<'_, f32>>;
}

/// Solver settings for [`Nmf`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NmfOptions {
    /// Iteration cap
    pub max_iter: usize,
    /// Stop when the relative change in reconstruction error falls below this
    pub tol: f32,
    /// Seed for the random initialization
    pub seed: u64,
}

impl Default for NmfOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol: 1e-4,
            seed: 0,
        }
    }
}

/// Non-negative matrix factorization `X ≈ W · H` with multiplicative
/// updates on the Frobenius loss (Lee & Seung, 2001).
#[derive(Debug, Clone)]
pub struct Nmf {
    n_components: usize,
    options: NmfOptions,
    basis: Option<Array2<f32>>,
    n_iter: usize,
    reconstruction_err: f32,
}

impl Nmf {
    /// Unfitted model with `n_components` basis vectors.
    pub fn new(n_components: usize) -> Self {
        Self::with_options(n_components, NmfOptions::default())
    }

    /// Unfitted model with explicit solver settings.
    pub fn with_options(n_components: usize, options: NmfOptions) -> Self {
        Self {
            n_components,
            options,
            basis: None,
            n_iter: 0,
            reconstruction_err: 0.0,
        }
    }

    /// Number of basis vectors.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Solver settings.
    pub fn options(&self) -> &NmfOptions {
        &self.options
    }

    /// Iterations run by the last fit.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Frobenius norm of `X - W·H` after the last fit.
    pub fn reconstruction_err(&self) -> f32 {
        self.reconstruction_err
    }

    fn check_input(&self, x: ArrayView2<f32>) -> Result<()> {
        if self.n_components == 0 {
            return Err(SpecsepError::invalid("n_components", "must be at least 1"));
        }
        if x.is_empty() {
            return Err(SpecsepError::invalid("S", "input must be non-empty"));
        }
        if let Some(((row, col), &value)) = x.indexed_iter().find(|(_, v)| !(**v >= 0.0)) {
            return Err(SpecsepError::NegativeInput { row, col, value });
        }
        Ok(())
    }

    /// Multiplicative updates; `update_basis == false` keeps `h` fixed.
    fn solve(
        &self,
        x: ArrayView2<f32>,
        w: &mut Array2<f32>,
        h: &mut Array2<f32>,
        update_basis: bool,
    ) -> (usize, f32) {
        let mut previous = frobenius_error(x, w, h);
        let initial = previous.max(EPSILON);
        let mut iterations = 0;

        for iter in 1..=self.options.max_iter {
            iterations = iter;

            if update_basis {
                let numer = w.t().dot(&x);
                let denom = w.t().dot(&*w).dot(&*h);
                multiplicative_step(h, &numer, &denom);
            }

            let numer = x.dot(&h.t());
            let denom = w.dot(&*h).dot(&h.t());
            multiplicative_step(w, &numer, &denom);

            if iter % CHECK_EVERY == 0 {
                let error = frobenius_error(x, w, h);
                let converged = (previous - error) / initial < self.options.tol;
                previous = error;
                if converged {
                    break;
                }
            }
        }

        (iterations, frobenius_error(x, w, h))
    }
}

impl Factorizer for Nmf {
    fn fit_transform(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(x)?;
        let (n_samples, n_features) = x.dim();
        let k = self.n_components;

        let mean = x.mean().unwrap_or(0.0);
        let scale = (mean / k as f32).sqrt();
        let mut rng = XorShift::new(self.options.seed);
        let mut h = random_init((k, n_features), scale, &mut rng);
        let mut w = random_init((n_samples, k), scale, &mut rng);

        let (n_iter, error) = self.solve(x, &mut w, &mut h, true);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            n_components = k,
            n_iter,
            error,
            converged = n_iter < self.options.max_iter,
            "nmf fit"
        );

        self.n_iter = n_iter;
        self.reconstruction_err = error;
        self.basis = Some(h);
        Ok(w)
    }

    fn transform(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let basis = self.basis.as_ref().ok_or(SpecsepError::NotFitted)?;
        self.check_input(x)?;
        if x.ncols() != basis.ncols() {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }

        let mean = x.mean().unwrap_or(0.0);
        let scale = (mean / self.n_components as f32).sqrt();
        let mut rng = XorShift::new(self.options.seed);
        let mut w = random_init((x.nrows(), self.n_components), scale, &mut rng);
        let mut h = basis.clone();

        self.solve(x, &mut w, &mut h, false);
        Ok(w)
    }

    fn components(&self) -> Option<ArrayView2<'_, f32>> {
        self.basis.as_ref().map(Array2::view)
    }
}

fn random_init(shape: (usize, usize), scale: f32, rng: &mut XorShift) -> Array2<f32> {
    Array2::from_shape_simple_fn(shape, || scale * rng.next_f32())
}

fn multiplicative_step(target: &mut Array2<f32>, numer: &Array2<f32>, denom: &Array2<f32>) {
    Zip::from(target)
        .and(numer)
        .and(denom)
        .for_each(|t, &n, &d| *t *= n / (d + EPSILON));
}

fn frobenius_error(x: ArrayView2<f32>, w: &Array2<f32>, h: &Array2<f32>) -> f32 {
    let approx = w.dot(h);
    Zip::from(&x)
        .and(&approx)
        .fold(0.0f32, |acc, &a, &b| acc + (a - b) * (a - b))
        .sqrt()
}

/// Small deterministic generator for initialization.
#[derive(Debug, Clone)]
struct XorShift(u64);

impl XorShift {
    /// Seeds are scrambled with the splitmix64 finalizer; zero is a fixed
    /// point of xorshift and is never used as the state.
    fn new(seed: u64) -> Self {
        const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut z = seed.wrapping_add(GOLDEN);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self(if z == 0 { GOLDEN } else { z })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}
