//! Error types for simulation runs

use pyo3::PyErr;
use pyo3::exceptions::PyValueError;
use thiserror::Error;

/// Result type for simulation calls
pub type Result<T> = std::result::Result<T, SimError>;

/// Configuration problems caught before a run starts.
///
/// Numerical blow-up inside a run (NaN, overflow) is not represented here:
/// those samples are returned to the caller untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid parameter {parameter}: {value} (expected a finite number)")]
    NonFinite { parameter: &'static str, value: f64 },

    #[error("Invalid parameter {parameter}: {value} (expected a positive number)")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("Invalid parameter {parameter}: a run needs at least one sample")]
    EmptyRun { parameter: &'static str },

    #[error("Run too long: {samples} samples do not fit in memory")]
    TooManySamples { samples: f64 },

    #[error("Sequence length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

impl From<SimError> for PyErr {
    fn from(err: SimError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

pub(crate) fn require_finite(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::NonFinite { parameter, value })
    }
}

/// Empty buffer for `len` samples; reports allocation failure instead of aborting
pub(crate) fn series_with_capacity(len: usize) -> Result<Vec<f64>> {
    let mut series = Vec::new();
    series
        .try_reserve_exact(len)
        .map_err(|_| SimError::TooManySamples { samples: len as f64 })?;
    Ok(series)
}

pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<f64> {
    let value = require_finite(parameter, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::NonPositive { parameter, value })
    }
}
