//! JSON matrix files.
//!
//! ```json
//! {"shape": [3, 4], "data": [ ...12 values, row-major... ]}
//! ```
//!
//! Complex matrices add an `"imag"` array of the same length; `"data"`
//! then holds the real parts.

use serde::{Deserialize, Serialize};
use specsep::Complex;
use specsep::ndarray::{Array2, ArrayD, IxDyn};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing matrix files.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// File could not be read
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File could not be written
    #[error("failed to write '{path}': {source}")]
    Write {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Not a valid matrix document
    #[error("invalid matrix JSON in '{path}': {source}")]
    Json {
        /// Path of the file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Data length does not match the declared shape
    #[error("'{path}': shape {shape:?} needs {expected} values, found {found}")]
    Length {
        /// Path of the file.
        path: PathBuf,
        /// Declared shape.
        shape: Vec<usize>,
        /// Product of the shape.
        expected: usize,
        /// Length of the data array.
        found: usize,
    },

    /// Matrix could not be encoded
    #[error("failed to encode '{path}': {source}")]
    Encode {
        /// Path of the file.
        path: PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Complex data where only real values are accepted
    #[error("'{path}': complex input (an \"imag\" array) is not supported here")]
    Complex {
        /// Path of the file.
        path: PathBuf,
    },

    /// Wrong number of dimensions
    #[error("'{path}': expected a {expected}-d matrix, found shape {shape:?}")]
    Rank {
        /// Path of the file.
        path: PathBuf,
        /// Required number of dimensions.
        expected: usize,
        /// Declared shape.
        shape: Vec<usize>,
    },
}

/// On-disk representation.
#[derive(Debug, Serialize, Deserialize)]
struct MatrixFile {
    shape: Vec<usize>,
    data: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    imag: Option<Vec<f32>>,
}

/// A spectrogram read from disk, real or complex.
#[derive(Debug, Clone)]
pub enum Spectrogram {
    /// Magnitudes or real values
    Real(Array2<f32>),
    /// Complex STFT values
    Complex(Array2<Complex<f32>>),
}

impl Spectrogram {
    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Spectrogram::Real(s) => s.dim(),
            Spectrogram::Complex(s) => s.dim(),
        }
    }
}

fn read_file(path: &Path) -> Result<MatrixFile, MatrixError> {
    let content = std::fs::read_to_string(path).map_err(|source| MatrixError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: MatrixFile = serde_json::from_str(&content).map_err(|source| MatrixError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let expected: usize = file.shape.iter().product();
    let lengths = std::iter::once(file.data.len()).chain(file.imag.as_ref().map(Vec::len));
    for found in lengths {
        if found != expected {
            return Err(MatrixError::Length {
                path: path.to_path_buf(),
                shape: file.shape.clone(),
                expected,
                found,
            });
        }
    }
    Ok(file)
}

fn check_2d(path: &Path, shape: &[usize]) -> Result<(usize, usize), MatrixError> {
    match *shape {
        [rows, cols] => Ok((rows, cols)),
        _ => Err(MatrixError::Rank {
            path: path.to_path_buf(),
            expected: 2,
            shape: shape.to_vec(),
        }),
    }
}

fn write_file(path: &Path, file: &MatrixFile) -> Result<(), MatrixError> {
    let json = serde_json::to_string(file).map_err(|source| MatrixError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| MatrixError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a real array of any rank; an `imag` part is rejected.
pub fn read_array(path: &Path) -> Result<ArrayD<f32>, MatrixError> {
    let file = read_file(path)?;
    if file.imag.is_some() {
        return Err(MatrixError::Complex {
            path: path.to_path_buf(),
        });
    }
    let found = file.data.len();
    ArrayD::from_shape_vec(IxDyn(&file.shape), file.data).map_err(|_| MatrixError::Length {
        path: path.to_path_buf(),
        expected: file.shape.iter().product(),
        shape: file.shape.clone(),
        found,
    })
}

/// Read a real 2-d matrix.
pub fn read_matrix(path: &Path) -> Result<Array2<f32>, MatrixError> {
    match read_spectrogram(path)? {
        Spectrogram::Real(m) => Ok(m),
        Spectrogram::Complex(m) => Ok(m.mapv(|z| z.re)),
    }
}

/// Read a real or complex 2-d spectrogram.
pub fn read_spectrogram(path: &Path) -> Result<Spectrogram, MatrixError> {
    let file = read_file(path)?;
    let (rows, cols) = check_2d(path, &file.shape)?;

    let spectrogram = match file.imag {
        None => Spectrogram::Real(Array2::from_shape_fn((rows, cols), |(i, j)| {
            file.data[i * cols + j]
        })),
        Some(imag) => Spectrogram::Complex(Array2::from_shape_fn((rows, cols), |(i, j)| {
            Complex::new(file.data[i * cols + j], imag[i * cols + j])
        })),
    };
    Ok(spectrogram)
}

/// Write a real array of any rank.
pub fn write_array<D: specsep::ndarray::Dimension>(
    path: &Path,
    array: &specsep::ndarray::Array<f32, D>,
) -> Result<(), MatrixError> {
    let file = MatrixFile {
        shape: array.shape().to_vec(),
        data: array.iter().copied().collect(),
        imag: None,
    };
    write_file(path, &file)
}

/// Write a real or complex spectrogram.
pub fn write_spectrogram(path: &Path, spectrogram: &Spectrogram) -> Result<(), MatrixError> {
    match spectrogram {
        Spectrogram::Real(s) => write_array(path, s),
        Spectrogram::Complex(s) => {
            let file = MatrixFile {
                shape: s.shape().to_vec(),
                data: s.iter().map(|z| z.re).collect(),
                imag: Some(s.iter().map(|z| z.im).collect()),
            };
            write_file(path, &file)
        }
    }
}
