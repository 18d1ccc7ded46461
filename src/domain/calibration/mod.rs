//! Calibration module - Stage 5 confidence correction.
//!
//! Raw detector scores are heuristic, not probabilities. Accumulated user
//! feedback (was the finding correct?) fits a monotone map from raw score to
//! empirical accuracy via isotonic regression; pre-fit the calibrator passes
//! raw scores through unchanged with an explicit flag.

mod calibrator;
mod isotonic;
mod metrics;

pub use calibrator::{CalibratedConfidence, CalibrationReport, ConfidenceCalibrator, ConfidenceTier};
pub use isotonic::IsotonicModel;
pub use metrics::{brier_score, expected_calibration_error, ECE_BINS};
