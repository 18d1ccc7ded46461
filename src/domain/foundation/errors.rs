//! Error types for the domain layer.
//!
//! The pipeline's error taxonomy:
//!
//! - [`ValidationError`] - malformed input, rejected synchronously; the caller
//!   must fix and retry.
//! - [`DetectorError`] - a detector queried before fitting or with a backend
//!   that is down; fatal for that call only, the orchestrator degrades.
//! - [`CalibrationError`] - invalid fit input or a failed refit; a failed
//!   refit preserves the feedback buffer and the prior model.

use thiserror::Error;

/// Errors that occur during value object construction and input validation.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Fields '{left}' and '{right}' must have equal length, got {left_len} and {right_len}")]
    LengthMismatch {
        left: String,
        right: String,
        left_len: usize,
        right_len: usize,
    },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a length mismatch validation error.
    pub fn length_mismatch(
        left: impl Into<String>,
        right: impl Into<String>,
        left_len: usize,
        right_len: usize,
    ) -> Self {
        ValidationError::LengthMismatch {
            left: left.into(),
            right: right.into(),
            left_len,
            right_len,
        }
    }
}

/// Errors raised by the candidate detectors and the clusterer.
#[derive(Debug, Clone, Error)]
pub enum DetectorError {
    /// A model-backed detector was queried before its one-time fit phase.
    #[error("detector '{detector}' queried before fit")]
    NotFitted { detector: String },

    /// The backing service (embedding backend) is unreachable.
    ///
    /// Callers degrade to a documented fallback rather than failing the
    /// pipeline; this variant is surfaced in ranking metadata.
    #[error("detector '{detector}' unavailable: {reason}")]
    Unavailable { detector: String, reason: String },
}

impl DetectorError {
    /// Creates a not-fitted error.
    pub fn not_fitted(detector: impl Into<String>) -> Self {
        DetectorError::NotFitted {
            detector: detector.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(detector: impl Into<String>, reason: impl Into<String>) -> Self {
        DetectorError::Unavailable {
            detector: detector.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the confidence calibrator.
#[derive(Debug, Clone, Error)]
pub enum CalibrationError {
    /// Fit input failed validation (empty, mismatched, out-of-range, non-binary).
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    /// A refit triggered by the feedback buffer failed.
    ///
    /// The buffer is preserved and the prior model retained so the next
    /// trigger can retry.
    #[error("calibrator refit failed: {reason}")]
    RefitFailed { reason: String },

    /// The calibrator was asked for fitted-model metrics before any fit.
    #[error("calibrator has not been fitted")]
    NotFitted,
}
