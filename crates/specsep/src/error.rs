//! Error types for decomposition operations.

use thiserror::Error;

/// Errors that can occur while decomposing or filtering a spectrogram.
#[derive(Debug, Error)]
pub enum SpecsepError {
    /// An argument, or a combination of arguments, is invalid.
    #[error("invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        param: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// A similarity graph does not fit the data it is applied to.
    #[error("invalid similarity graph shape {rows}x{cols} for axis length {expected}")]
    GraphShape {
        /// Number of rows in the graph.
        rows: usize,
        /// Number of columns in the graph.
        cols: usize,
        /// Length of the filtering axis of the input.
        expected: usize,
    },

    /// Transform requested from a factorizer that has not been fit.
    #[error("factorizer has not been fit")]
    NotFitted,

    /// Non-negative factorization was given a negative or non-finite value.
    #[error("factorization input must be finite and non-negative, found {value} at ({row}, {col})")]
    NegativeInput {
        /// Row of the offending value.
        row: usize,
        /// Column of the offending value.
        col: usize,
        /// The offending value.
        value: f32,
    },

    /// Array construction failed.
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl SpecsepError {
    /// Create an invalid parameter error.
    pub fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        SpecsepError::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error reports a bad argument rather than a runtime failure.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            SpecsepError::InvalidParameter { .. } | SpecsepError::GraphShape { .. }
        )
    }
}

/// Result type for decomposition operations.
pub type Result<T> = std::result::Result<T, SpecsepError>;
