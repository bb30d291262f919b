//! Settings validation.
//!
//! Checks every field of a [`Settings`] without running any operation, and
//! reports all problems at once.
//!
//! # Example
//!
//! ```rust
//! use specsep_config::{Settings, validate_settings};
//!
//! let mut settings = Settings::default();
//! assert!(validate_settings(&settings).is_ok());
//!
//! settings.hpss.power = -1.0;
//! assert!(validate_settings(&settings).is_err());
//! ```

use thiserror::Error;

use specsep::{Aggregate, Metric, RecurrenceMode};

use crate::settings::{DecomposeSettings, HpssSettings, NnFilterSettings, Settings};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted parameter path, e.g. `hpss.power`.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Name that does not match any known choice.
    #[error("unknown value '{value}' for '{param}' (expected one of: {})", .choices.join(", "))]
    UnknownChoice {
        /// Dotted parameter path.
        param: String,
        /// The rejected value.
        value: String,
        /// Accepted values.
        choices: Vec<&'static str>,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const AGGREGATES: &[&str] = &["mean", "median", "max", "min", "weighted"];
const METRICS: &[&str] = &["euclidean", "sqeuclidean", "manhattan", "cosine"];
const MODES: &[&str] = &["connectivity", "distance", "affinity"];

fn check_range(errors: &mut Vec<ValidationError>, param: &str, value: f64, min: f64, max: f64) {
    // NaN fails both comparisons
    if !(value >= min && value <= max) {
        errors.push(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        });
    }
}

fn check_choice<T: std::str::FromStr>(
    errors: &mut Vec<ValidationError>,
    param: &str,
    value: &str,
    choices: &[&'static str],
) {
    if value.parse::<T>().is_err() {
        errors.push(ValidationError::UnknownChoice {
            param: param.to_string(),
            value: value.to_string(),
            choices: choices.to_vec(),
        });
    }
}

/// Validate the `[hpss]` section.
pub fn validate_hpss(hpss: &HpssSettings) -> ValidationResult<()> {
    let mut errors = Vec::new();
    check_range(&mut errors, "hpss.kernel_size", hpss.kernel_size as f64, 1.0, f64::INFINITY);
    if let Some(h) = hpss.kernel_harmonic {
        check_range(&mut errors, "hpss.kernel_harmonic", h as f64, 1.0, f64::INFINITY);
    }
    if let Some(p) = hpss.kernel_percussive {
        check_range(&mut errors, "hpss.kernel_percussive", p as f64, 1.0, f64::INFINITY);
    }
    check_range(&mut errors, "hpss.power", f64::from(hpss.power), 0.0, f64::from(f32::MAX));
    collect(errors)
}

/// Validate the `[nn_filter]` section.
pub fn validate_nn_filter(nn: &NnFilterSettings) -> ValidationResult<()> {
    let mut errors = Vec::new();
    check_choice::<Aggregate>(&mut errors, "nn_filter.aggregate", &nn.aggregate, AGGREGATES);
    check_choice::<Metric>(&mut errors, "nn_filter.metric", &nn.metric, METRICS);
    check_choice::<RecurrenceMode>(&mut errors, "nn_filter.mode", &nn.mode, MODES);
    check_range(&mut errors, "nn_filter.width", nn.width as f64, 1.0, f64::INFINITY);
    if let Some(k) = nn.k {
        check_range(&mut errors, "nn_filter.k", k as f64, 1.0, f64::INFINITY);
    }
    if let Some(bw) = nn.bandwidth {
        check_range(&mut errors, "nn_filter.bandwidth", f64::from(bw), f64::MIN_POSITIVE, f64::from(f32::MAX));
    }
    collect(errors)
}

/// Validate the `[decompose]` section.
pub fn validate_decompose(decompose: &DecomposeSettings) -> ValidationResult<()> {
    let mut errors = Vec::new();
    if let Some(n) = decompose.n_components {
        check_range(&mut errors, "decompose.n_components", n as f64, 1.0, f64::INFINITY);
    }
    check_range(&mut errors, "decompose.max_iter", decompose.max_iter as f64, 1.0, f64::INFINITY);
    check_range(&mut errors, "decompose.tol", f64::from(decompose.tol), 0.0, 1.0);
    collect(errors)
}

/// Validate every section, reporting all problems together.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    let mut errors = Vec::new();
    for result in [
        validate_hpss(&settings.hpss),
        validate_nn_filter(&settings.nn_filter),
        validate_decompose(&settings.decompose),
    ] {
        match result {
            Ok(()) => {}
            Err(ValidationError::Multiple(inner)) => errors.extend(inner),
            Err(e) => errors.push(e),
        }
    }
    collect(errors)
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
