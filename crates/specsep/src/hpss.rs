//! Median-filtering harmonic-percussive source separation (HPSS)
//!
//! Decomposes a spectrogram `S = H + P` where `H` holds the components that
//! are smooth along time (sustained tones) and `P` the components that are
//! smooth along frequency (transients). Based on Fitzgerald, "Harmonic/
//! percussive separation using median filtering", DAFx 2010.
//!
//! Two median filters are run over the magnitude spectrogram:
//!
//! - harmonic response: `1 x win_harm` window along the frame axis
//! - percussive response: `win_perc x 1` window along the frequency axis
//!
//! The responses are turned into either a hard binary mask or a soft
//! Wiener-style mask `H^p / (H^p + P^p)`, and the masks are applied to the
//! input.
//!
//! ```rust,ignore
//! use specsep::hpss::{hpss, HpssOptions};
//!
//! let (harmonic, percussive) = hpss(spectrogram.view(), &HpssOptions::default())?;
//! ```

use ndarray::{Array2, ArrayView2, Axis, Zip};

use crate::error::{Result, SpecsepError};
use crate::median::median_filter;
use crate::stft::{SpectralValue, magphase};

/// Values below this are treated as silence when building soft masks.
pub const TINY: f32 = 1e-20;

/// Median filter sizes for the two directional filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelSize {
    /// Same window for both filters
    Uniform(usize),
    /// Separate windows
    Split {
        /// Window length along time (harmonic filter)
        harmonic: usize,
        /// Window length along frequency (percussive filter)
        percussive: usize,
    },
}

impl KernelSize {
    /// Harmonic (time-axis) window length
    pub fn harmonic(self) -> usize {
        match self {
            KernelSize::Uniform(size) => size,
            KernelSize::Split { harmonic, .. } => harmonic,
        }
    }

    /// Percussive (frequency-axis) window length
    pub fn percussive(self) -> usize {
        match self {
            KernelSize::Uniform(size) => size,
            KernelSize::Split { percussive, .. } => percussive,
        }
    }
}

impl Default for KernelSize {
    fn default() -> Self {
        KernelSize::Uniform(31)
    }
}

impl From<usize> for KernelSize {
    fn from(size: usize) -> Self {
        KernelSize::Uniform(size)
    }
}

impl From<(usize, usize)> for KernelSize {
    fn from((harmonic, percussive): (usize, usize)) -> Self {
        KernelSize::Split {
            harmonic,
            percussive,
        }
    }
}

/// HPSS parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpssOptions {
    /// Median filter window sizes
    pub kernel_size: KernelSize,
    /// Wiener mask exponent; values below [`TINY`] select a hard mask
    pub power: f32,
    /// Return the binary masks instead of the separated components
    pub mask: bool,
}

impl Default for HpssOptions {
    fn default() -> Self {
        Self {
            kernel_size: KernelSize::default(),
            power: 2.0,
            mask: false,
        }
    }
}

impl HpssOptions {
    /// Use the same window length for both filters.
    pub fn with_kernel_size(mut self, size: usize) -> Self {
        self.kernel_size = KernelSize::Uniform(size);
        self
    }

    /// Use separate harmonic and percussive window lengths.
    pub fn with_kernel_sizes(mut self, harmonic: usize, percussive: usize) -> Self {
        self.kernel_size = KernelSize::Split {
            harmonic,
            percussive,
        };
        self
    }

    /// Set the mask exponent.
    pub fn with_power(mut self, power: f32) -> Self {
        self.power = power;
        self
    }

    /// Request binary masks instead of components.
    pub fn with_mask(mut self, mask: bool) -> Self {
        self.mask = mask;
        self
    }

    /// Whether these options produce a hard (binary) mask.
    pub fn is_hard(&self) -> bool {
        self.mask || self.power < TINY
    }

    /// Check kernel sizes and exponent.
    pub fn validate(&self) -> Result<()> {
        if self.kernel_size.harmonic() == 0 {
            return Err(SpecsepError::invalid(
                "kernel_size",
                "harmonic kernel size must be at least 1",
            ));
        }
        if self.kernel_size.percussive() == 0 {
            return Err(SpecsepError::invalid(
                "kernel_size",
                "percussive kernel size must be at least 1",
            ));
        }
        if !self.power.is_finite() || self.power < 0.0 {
            return Err(SpecsepError::invalid(
                "power",
                format!("must be finite and non-negative, got {}", self.power),
            ));
        }
        Ok(())
    }
}

/// Harmonic and percussive median-filter responses of a magnitude spectrogram.
fn responses(magnitude: ArrayView2<f32>, kernel_size: KernelSize) -> Result<(Array2<f32>, Array2<f32>)> {
    let harm = median_filter(magnitude, Axis(1), kernel_size.harmonic())?;
    let perc = median_filter(magnitude, Axis(0), kernel_size.percussive())?;
    Ok((harm, perc))
}

/// Binary masks: harmonic wins strictly greater responses.
fn hard_masks(harm: &Array2<f32>, perc: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let mask_harm = Zip::from(harm)
        .and(perc)
        .map_collect(|&h, &p| if h > p { 1.0 } else { 0.0 });
    let mask_perc = mask_harm.mapv(|m| 1.0 - m);
    (mask_harm, mask_perc)
}

/// Wiener-style soft masks with the 0.5/0.5 tie-break in silent regions.
fn soft_masks(mut harm: Array2<f32>, mut perc: Array2<f32>, power: f32) -> (Array2<f32>, Array2<f32>) {
    Zip::from(&mut harm).and(&mut perc).for_each(|h, p| {
        let mut hp = h.powf(power);
        let mut pp = p.powf(power);

        let zero_h = hp < TINY;
        let zero_p = pp < TINY;
        if zero_h {
            hp = 0.0;
        }
        if zero_p {
            pp = 0.0;
        }
        if zero_h && zero_p {
            hp = 0.5;
            pp = 0.5;
        }

        let total = hp + pp;
        *h = hp / total;
        *p = pp / total;
    });
    (harm, perc)
}

/// Masks from the filterable part of a spectrogram (see [`SpectralValue`]).
fn masks(magnitude: ArrayView2<f32>, options: &HpssOptions) -> Result<(Array2<f32>, Array2<f32>)> {
    let (harm, perc) = responses(magnitude, options.kernel_size)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        win_harm = options.kernel_size.harmonic(),
        win_perc = options.kernel_size.percussive(),
        power = options.power,
        hard = options.is_hard(),
        "hpss: computed median responses"
    );

    if options.is_hard() {
        return Ok(hard_masks(&harm, &perc));
    }
    if options.power.fract() != 0.0 && harm.iter().chain(perc.iter()).any(|&v| v < 0.0) {
        return Err(SpecsepError::invalid(
            "power",
            format!(
                "fractional power {} needs non-negative median responses",
                options.power
            ),
        ));
    }
    Ok(soft_masks(harm, perc, options.power))
}

/// Compute the harmonic and percussive masks of a spectrogram.
///
/// Soft masks sum to 1 at every bin; hard masks are 0/1 complements. Which
/// kind is produced follows [`HpssOptions::is_hard`].
///
/// # Errors
///
/// [`SpecsepError::InvalidParameter`] for bad options, and for a soft mask
/// with a fractional `power` when real input yields a negative median
/// response.
pub fn hpss_masks<T: SpectralValue>(
    spectrogram: ArrayView2<T>,
    options: &HpssOptions,
) -> Result<(Array2<f32>, Array2<f32>)> {
    options.validate()?;
    let (magnitude, _) = magphase(spectrogram);
    masks(magnitude.view(), options)
}

/// Separate a spectrogram into harmonic and percussive parts.
///
/// Works on real (`f32`) and complex (`Complex<f32>`) spectrograms of shape
/// `(bins, frames)`. Complex input is filtered on its magnitude and the
/// phase is reapplied; real input is filtered as-is. Either way the outputs
/// satisfy `harmonic + percussive ≈ S`.
///
/// With `options.mask` set, the binary masks are returned instead (as
/// values of the input element type, without phase).
pub fn hpss<T: SpectralValue>(
    spectrogram: ArrayView2<T>,
    options: &HpssOptions,
) -> Result<(Array2<T>, Array2<T>)> {
    options.validate()?;
    let (magnitude, phase) = magphase(spectrogram);
    let (mask_harm, mask_perc) = masks(magnitude.view(), options)?;

    if options.mask {
        return Ok((mask_harm.mapv(T::from_mask), mask_perc.mapv(T::from_mask)));
    }

    let apply = |mask: &Array2<f32>| {
        Zip::from(&magnitude)
            .and(mask)
            .and(&phase)
            .map_collect(|&m, &g, &ph| T::recombine(m * g, ph))
    };

    Ok((apply(&mask_harm), apply(&mask_perc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rustfft::num_complex::Complex;

    /// Spectrogram with one sustained row and one transient column.
    fn cross_spectrogram() -> Array2<f32> {
        let mut s = Array2::from_elem((9, 12), 0.1f32);
        s.row_mut(4).fill(1.0);
        s.column_mut(6).fill(1.0);
        s
    }

    #[test]
    fn test_defaults() {
        let options = HpssOptions::default();
        assert_eq!(options.kernel_size, KernelSize::Uniform(31));
        assert_eq!(options.power, 2.0);
        assert!(!options.mask);
        assert!(!options.is_hard());
    }

    #[test]
    fn test_kernel_size_conversions() {
        let split = KernelSize::from((13_usize, 31_usize));
        assert_eq!(split.harmonic(), 13);
        assert_eq!(split.percussive(), 31);
        let uniform = KernelSize::from(5_usize);
        assert_eq!(uniform.harmonic(), 5);
        assert_eq!(uniform.percussive(), 5);
    }

    #[test]
    fn test_separates_row_from_column() {
        let s = cross_spectrogram();
        let options = HpssOptions::default().with_kernel_size(5);
        let (h, p) = hpss(s.view(), &options).unwrap();

        // Sustained row lands in the harmonic part
        assert!(h[[4, 2]] > 0.9, "harmonic row energy {}", h[[4, 2]]);
        assert!(p[[4, 2]] < 0.1);
        // Transient column lands in the percussive part
        assert!(p[[1, 6]] > 0.9, "percussive column energy {}", p[[1, 6]]);
        assert!(h[[1, 6]] < 0.1);
    }

    #[test]
    fn test_soft_masks_sum_to_one() {
        let s = cross_spectrogram();
        let (mh, mp) = hpss_masks(s.view(), &HpssOptions::default().with_kernel_size(3)).unwrap();
        for (a, b) in mh.iter().zip(mp.iter()) {
            assert!((a + b - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_silence_splits_evenly() {
        let s = Array2::<f32>::zeros((4, 5));
        let (mh, mp) = hpss_masks(s.view(), &HpssOptions::default().with_kernel_size(3)).unwrap();
        assert!(mh.iter().all(|&m| m == 0.5));
        assert!(mp.iter().all(|&m| m == 0.5));
    }

    #[test]
    fn test_hard_mask_is_binary_complement() {
        let s = cross_spectrogram();
        let options = HpssOptions::default().with_kernel_size(5).with_mask(true);
        let (mh, mp) = hpss(s.view(), &options).unwrap();
        for (a, b) in mh.iter().zip(mp.iter()) {
            assert!(*a == 0.0 || *a == 1.0);
            assert_eq!(*b, 1.0 - *a);
        }
    }

    #[test]
    fn test_zero_power_uses_hard_mask_but_returns_components() {
        let s = cross_spectrogram();
        let options = HpssOptions::default().with_kernel_size(5).with_power(0.0);
        let (h, p) = hpss(s.view(), &options).unwrap();
        for ((hv, pv), sv) in h.iter().zip(p.iter()).zip(s.iter()) {
            assert!(*hv == 0.0 || *hv == *sv);
            assert_eq!(hv + pv, *sv);
        }
    }

    #[test]
    fn test_ties_go_to_percussive_in_hard_mask() {
        let s = Array2::from_elem((3, 3), 2.0f32);
        let (mh, mp) = hpss_masks(s.view(), &HpssOptions::default().with_mask(true)).unwrap();
        assert!(mh.iter().all(|&m| m == 0.0));
        assert!(mp.iter().all(|&m| m == 1.0));
    }

    #[test]
    fn test_complex_input_keeps_phase() {
        let s = array![
            [Complex::new(0.0f32, 1.0), Complex::new(1.0, 1.0), Complex::new(-2.0, 0.0)],
            [Complex::new(0.5, -0.5), Complex::new(0.0, 0.0), Complex::new(3.0, 4.0)],
        ];
        let options = HpssOptions::default().with_kernel_size(3);
        let (h, p) = hpss(s.view(), &options).unwrap();

        for ((hv, pv), sv) in h.iter().zip(p.iter()).zip(s.iter()) {
            assert!((*hv + *pv - *sv).norm() < 1e-5);
        }
    }

    #[test]
    fn test_complex_matches_magnitude_times_phase() {
        let s = array![
            [Complex::new(0.0f32, 1.0), Complex::new(1.0, 1.0), Complex::new(-2.0, 0.0)],
            [Complex::new(0.5, -0.5), Complex::new(0.0, 0.0), Complex::new(3.0, 4.0)],
            [Complex::new(1.5, 2.0), Complex::new(-0.2, 0.1), Complex::new(0.0, -3.0)],
        ];
        let (mag, phase) = magphase(s.view());
        let options = HpssOptions::default().with_kernel_size(3).with_power(1.5);

        let (h, p) = hpss(s.view(), &options).unwrap();
        let (h_mag, p_mag) = hpss(mag.view(), &options).unwrap();

        for (((hc, hm), ph), (pc, pm)) in h
            .iter()
            .zip(h_mag.iter())
            .zip(phase.iter())
            .zip(p.iter().zip(p_mag.iter()))
        {
            assert!((*hc - *ph * *hm).norm() < 1e-6);
            assert!((*pc - *ph * *pm).norm() < 1e-6);
        }
    }

    #[test]
    fn test_responses_below_tiny_split_evenly() {
        // 1e-11 squared is 1e-22, nonzero but under TINY
        let s = Array2::from_elem((4, 5), 1e-11f32);
        let (mh, mp) = hpss_masks(s.view(), &HpssOptions::default().with_kernel_size(3)).unwrap();
        assert!(mh.iter().all(|&m| m == 0.5));
        assert!(mp.iter().all(|&m| m == 0.5));
    }

    #[test]
    fn test_real_input_is_filtered_signed() {
        // Time median of [-5, 1, 2] is [-5, 1, 2]; frequency median of one row is S
        let s = array![[-5.0f32, 1.0, 2.0]];
        let options = HpssOptions::default().with_kernel_size(3).with_mask(true);
        let (mh, mp) = hpss_masks(s.view(), &options).unwrap();
        assert_eq!(mh, array![[0.0f32, 0.0, 0.0]]);
        assert_eq!(mp, array![[1.0f32, 1.0, 1.0]]);
    }

    #[test]
    fn test_signed_input_with_integer_power() {
        let s = array![[-3.0f32, 1.0, -2.0, 4.0], [0.5, -1.0, 2.0, -0.5]];
        let (h, p) = hpss(s.view(), &HpssOptions::default().with_kernel_size(3)).unwrap();
        for ((hv, pv), sv) in h.iter().zip(p.iter()).zip(s.iter()) {
            assert!((hv + pv - sv).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fractional_power_rejects_negative_responses() {
        let s = array![[-3.0f32, -1.0, -2.0]];
        let options = HpssOptions::default().with_kernel_size(3).with_power(1.5);
        let err = hpss(s.view(), &options).unwrap_err();
        assert!(err.is_parameter_error());

        // Hard masks never raise to a power
        assert!(hpss(s.view(), &options.with_mask(true)).is_ok());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let s = cross_spectrogram();
        assert!(hpss(s.view(), &HpssOptions::default().with_kernel_size(0)).is_err());
        assert!(hpss(s.view(), &HpssOptions::default().with_kernel_sizes(3, 0)).is_err());
        assert!(hpss(s.view(), &HpssOptions::default().with_power(-1.0)).is_err());
        assert!(hpss(s.view(), &HpssOptions::default().with_power(f32::NAN)).is_err());
    }

    #[test]
    fn test_empty_spectrogram() {
        let s = Array2::<f32>::zeros((0, 4));
        let (h, p) = hpss(s.view(), &HpssOptions::default()).unwrap();
        assert_eq!(h.dim(), (0, 4));
        assert_eq!(p.dim(), (0, 4));
    }
}
