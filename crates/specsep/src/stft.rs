//! Complex STFT and magnitude/phase separation
//!
//! Produces spectrograms in the `(frequency_bin, frame)` orientation used
//! by [`hpss`](crate::hpss) and [`decompose`](crate::decompose).

use std::f32::consts::PI;
use std::str::FromStr;
use std::sync::Arc;

use ndarray::{Array2, ArrayView2};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

use crate::error::{Result, SpecsepError};

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    #[default]
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
}

impl Window {
    /// Window value at position `i` of a periodic window of length `n`
    fn value(self, i: usize, n: usize) -> f32 {
        let x = 2.0 * PI * i as f32 / n as f32;
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 * (1.0 - x.cos()),
            Window::Hamming => 0.54 - 0.46 * x.cos(),
            Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
        }
    }

    /// Get window coefficients
    pub fn coefficients(self, size: usize) -> Vec<f32> {
        (0..size).map(|i| self.value(i, size)).collect()
    }
}

impl FromStr for Window {
    type Err = SpecsepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Ok(Window::Rectangular),
            "hann" => Ok(Window::Hann),
            "hamming" => Ok(Window::Hamming),
            "blackman" => Ok(Window::Blackman),
            other => Err(SpecsepError::invalid(
                "window",
                format!("unknown window '{other}'"),
            )),
        }
    }
}

/// Short-time Fourier transform analyzer
pub struct Stft {
    fft_size: usize,
    hop_size: usize,
    window: Window,
    window_coeffs: Vec<f32>,
    fft: Arc<dyn rustfft::Fft<f32>>,
}

impl Stft {
    /// Create a new STFT analyzer
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (power of 2 recommended)
    /// * `hop_size` - Hop size between frames (typically fft_size / 4)
    /// * `window` - Window function to use
    pub fn new(fft_size: usize, hop_size: usize, window: Window) -> Result<Self> {
        if fft_size == 0 {
            return Err(SpecsepError::invalid("fft_size", "must be at least 1"));
        }
        if hop_size == 0 {
            return Err(SpecsepError::invalid("hop_size", "must be at least 1"));
        }

        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Ok(Self {
            fft_size,
            hop_size,
            window,
            window_coeffs: window.coefficients(fft_size),
            fft,
        })
    }

    /// Number of frequency bins per frame (fft_size / 2 + 1)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Number of frames produced for a signal of `len` samples
    pub fn num_frames(&self, len: usize) -> usize {
        if len >= self.fft_size {
            (len - self.fft_size) / self.hop_size + 1
        } else {
            0
        }
    }

    /// Compute the complex spectrogram, shape `(num_bins, num_frames)`
    pub fn analyze(&self, signal: &[f32]) -> Array2<Complex<f32>> {
        let num_frames = self.num_frames(signal.len());
        let mut out = Array2::zeros((self.num_bins(), num_frames));
        let mut buffer = vec![Complex::new(0.0, 0.0); self.fft_size];

        for (frame_idx, mut column) in out.columns_mut().into_iter().enumerate() {
            let start = frame_idx * self.hop_size;
            let frame = &signal[start..start + self.fft_size];

            for ((slot, &sample), &coeff) in buffer
                .iter_mut()
                .zip(frame.iter())
                .zip(self.window_coeffs.iter())
            {
                *slot = Complex::new(sample * coeff, 0.0);
            }

            self.fft.process(&mut buffer);

            for (dst, src) in column.iter_mut().zip(buffer.iter()) {
                *dst = *src;
            }
        }

        out
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get hop size
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Get the window function used
    pub fn window(&self) -> Window {
        self.window
    }
}

/// Element type of a spectrogram that can be split into a filterable
/// real part and a phase factor.
///
/// Complex numbers split into `|z|` and the unit-modulus `z / |z|` (phase 1
/// at zero). Reals are filtered as they are, with phase 1.
pub trait SpectralValue: Copy + Send + Sync + 'static {
    /// Split into `(magnitude, phase)`.
    fn split(self) -> (f32, Self);

    /// Scale a phase factor by a magnitude.
    fn recombine(magnitude: f32, phase: Self) -> Self;

    /// Lift a mask value into this element type.
    fn from_mask(value: f32) -> Self;
}

impl SpectralValue for f32 {
    fn split(self) -> (f32, Self) {
        (self, 1.0)
    }

    fn recombine(magnitude: f32, phase: Self) -> Self {
        magnitude * phase
    }

    fn from_mask(value: f32) -> Self {
        value
    }
}

impl SpectralValue for Complex<f32> {
    fn split(self) -> (f32, Self) {
        let mag = self.norm();
        if mag > 0.0 {
            (mag, self / mag)
        } else {
            (0.0, Complex::new(1.0, 0.0))
        }
    }

    fn recombine(magnitude: f32, phase: Self) -> Self {
        phase * magnitude
    }

    fn from_mask(value: f32) -> Self {
        Complex::new(value, 0.0)
    }
}

/// Separate a spectrogram into magnitude and unit-modulus phase.
///
/// `magnitude * phase` recovers the input (up to rounding). Real input
/// comes back unchanged with phase 1.
pub fn magphase<T: SpectralValue>(spectrogram: ArrayView2<T>) -> (Array2<f32>, Array2<T>) {
    let mut magnitude = Array2::zeros(spectrogram.raw_dim());
    let phase = ndarray::Zip::from(&mut magnitude)
        .and(&spectrogram)
        .map_collect(|mag, &value| {
            let (m, p) = value.split();
            *mag = m;
            p
        });
    (magnitude, phase)
}
