//! Specsep - spectrogram decomposition for audio analysis
//!
//! This crate separates and smooths time-frequency representations:
//!
//! - [`hpss`] - Harmonic/percussive separation by directional median filtering
//! - [`nn_filter`] - Nearest-neighbor filtering over a sparse similarity graph
//! - [`decompose`] - Factorization into spectral components and activations
//! - [`factorize`] - The [`Factorizer`] trait and a built-in [`Nmf`]
//! - [`recurrence`] - k-NN recurrence graph construction
//! - [`graph`] - Row-compressed sparse weight matrices
//! - [`aggregate`] - Neighbor reducers (mean, median, weighted average, ...)
//! - [`median`] - N-d median filter along one axis
//! - [`stft`] - Windowed STFT and magnitude/phase splitting
//!
//! Spectrograms are `ndarray` matrices of shape `(bins, frames)`. HPSS
//! accepts real or complex input; the other operations work on real
//! magnitudes.
//!
//! ## Harmonic/Percussive Separation
//!
//! ```rust,ignore
//! use specsep::{Stft, Window, hpss, HpssOptions};
//!
//! let stft = Stft::new(2048, 512, Window::Hann)?;
//! let spec = stft.analyze(&signal);
//!
//! let (harmonic, percussive) = hpss(spec.view(), &HpssOptions::default())?;
//!
//! // Tighter harmonic filter, binary masks
//! let options = HpssOptions::default().with_kernel_sizes(13, 31).with_mask(true);
//! let (mask_h, mask_p) = hpss(spec.view(), &options)?;
//! ```
//!
//! ## Nearest-Neighbor Filtering
//!
//! ```rust,ignore
//! use specsep::{nn_filter, Aggregate, RecurrenceBuilder, RecurrenceMode};
//!
//! // Non-local means: affinity-weighted average of similar frames
//! let builder = RecurrenceBuilder::new().with_mode(RecurrenceMode::Affinity);
//! let smoothed = nn_filter(mag.view(), None, &Aggregate::WeightedAverage, -1, &builder)?;
//! ```
//!
//! ## Decomposition
//!
//! ```rust,ignore
//! use specsep::{decompose, DecomposeOptions};
//!
//! let d = decompose(mag.view(), None, &DecomposeOptions::default().with_n_components(8).with_sort(true))?;
//! let approx = d.reconstruct();
//! ```
//!
//! ## Logging
//!
//! With the `tracing` feature enabled, operations emit `tracing::debug!`
//! events (graph sizes, NMF convergence, kernel sizes). The crate never
//! installs a subscriber.

pub mod aggregate;
pub mod decompose;
pub mod error;
pub mod factorize;
pub mod graph;
pub mod hpss;
pub mod median;
pub mod nn_filter;
pub mod recurrence;
pub mod stft;

// Re-export main types
pub use aggregate::{Aggregate, Reducer};
pub use decompose::{DecomposeOptions, Decomposition, decompose};
pub use error::{Result, SpecsepError};
pub use factorize::{Factorizer, Nmf, NmfOptions};
pub use graph::CsrGraph;
pub use hpss::{HpssOptions, KernelSize, TINY, hpss, hpss_masks};
pub use median::median_filter;
pub use nn_filter::{nn_filter, nn_filter_default, normalize_axis};
pub use recurrence::{GraphBuilder, Metric, RecurrenceBuilder, RecurrenceMode};
pub use stft::{SpectralValue, Stft, Window, magphase};

pub use ndarray;
pub use rustfft::num_complex::Complex;
