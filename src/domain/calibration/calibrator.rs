//! The confidence calibrator - fit lifecycle, tiers, and quality metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::domain::foundation::{CalibrationError, Confidence, ValidationError};

use super::isotonic::IsotonicModel;
use super::metrics::{brier_score, expected_calibration_error};

/// Calibrated-confidence tier thresholds.
const HIGH_TIER_MIN: f64 = 0.85;
const MODERATE_TIER_MIN: f64 = 0.60;

/// Confidence tier after calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    /// Buckets a calibrated confidence: HIGH at or above 0.85, MODERATE at
    /// or above 0.60, LOW below.
    pub fn from_confidence(confidence: Confidence) -> Self {
        let v = confidence.value();
        if v >= HIGH_TIER_MIN {
            ConfidenceTier::High
        } else if v >= MODERATE_TIER_MIN {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Result of calibrating one raw confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedConfidence {
    pub raw: Confidence,
    pub calibrated: Confidence,
    pub tier: ConfidenceTier,
    /// False when the calibrator was unfitted and passed the raw value
    /// through unchanged.
    pub is_calibrated: bool,
}

/// Metrics from one completed fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub samples: usize,
    pub ece: f64,
    pub brier_before: f64,
    pub brier_after: f64,
    pub retrain_count: u64,
    pub fitted_at: DateTime<Utc>,
}

/// Isotonic confidence calibrator.
///
/// Starts unfitted (identity pass-through). Each `fit` call replaces the
/// model wholesale; the fitted model itself is immutable and shared by
/// `Arc` so in-flight readers keep a consistent snapshot across a refit.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceCalibrator {
    model: Option<Arc<IsotonicModel>>,
    last_report: Option<CalibrationReport>,
    retrain_count: u64,
}

impl ConfidenceCalibrator {
    /// Creates an unfitted calibrator.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once at least one fit has succeeded.
    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Fits a new model from raw confidences and binary outcomes
    /// (1.0 correct, 0.0 incorrect).
    ///
    /// On any error the previous model and report are left untouched.
    pub fn fit(
        &mut self,
        raw: &[f64],
        outcomes: &[f64],
    ) -> Result<CalibrationReport, CalibrationError> {
        validate_fit_input(raw, outcomes)?;

        let model = IsotonicModel::fit(raw, outcomes)?;
        let calibrated: Vec<f64> = raw.iter().map(|&r| model.predict(r)).collect();

        self.retrain_count += 1;
        let report = CalibrationReport {
            samples: raw.len(),
            ece: expected_calibration_error(&calibrated, outcomes),
            brier_before: brier_score(raw, outcomes),
            brier_after: brier_score(&calibrated, outcomes),
            retrain_count: self.retrain_count,
            fitted_at: Utc::now(),
        };
        info!(
            samples = report.samples,
            ece = report.ece,
            retrain = report.retrain_count,
            "calibrator refit"
        );

        self.model = Some(Arc::new(model));
        self.last_report = Some(report.clone());
        Ok(report)
    }

    /// Maps a raw confidence through the fitted model, or passes it through
    /// unchanged when unfitted.
    pub fn calibrate(&self, raw: Confidence) -> CalibratedConfidence {
        match &self.model {
            Some(model) => {
                let calibrated = Confidence::new(model.predict(raw.value()));
                CalibratedConfidence {
                    raw,
                    calibrated,
                    tier: ConfidenceTier::from_confidence(calibrated),
                    is_calibrated: true,
                }
            }
            None => CalibratedConfidence {
                raw,
                calibrated: raw,
                tier: ConfidenceTier::from_confidence(raw),
                is_calibrated: false,
            },
        }
    }

    /// Metrics from the most recent fit.
    pub fn last_report(&self) -> Result<&CalibrationReport, CalibrationError> {
        self.last_report.as_ref().ok_or(CalibrationError::NotFitted)
    }

    /// Number of completed refits.
    pub fn retrain_count(&self) -> u64 {
        self.retrain_count
    }
}

fn validate_fit_input(raw: &[f64], outcomes: &[f64]) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::empty_field("raw_confidences"));
    }
    if raw.len() != outcomes.len() {
        return Err(ValidationError::length_mismatch(
            "raw_confidences",
            "outcomes",
            raw.len(),
            outcomes.len(),
        ));
    }
    for &r in raw {
        if !r.is_finite() || !(0.0..=1.0).contains(&r) {
            return Err(ValidationError::out_of_range("raw_confidences", 0.0, 1.0, r));
        }
    }
    for &y in outcomes {
        if y != 0.0 && y != 1.0 {
            return Err(ValidationError::invalid_format(
                "outcomes",
                format!("expected binary 0.0/1.0 labels, got {}", y),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfitted_calibrator_passes_through() {
        let cal = ConfidenceCalibrator::new();
        let result = cal.calibrate(Confidence::new(0.72));
        assert_eq!(result.calibrated.value(), 0.72);
        assert!(!result.is_calibrated);
        assert_eq!(result.tier, ConfidenceTier::Moderate);
    }

    #[test]
    fn tiers_bucket_at_documented_thresholds() {
        assert_eq!(
            ConfidenceTier::from_confidence(Confidence::new(0.85)),
            ConfidenceTier::High
        );
        assert_eq!(
            ConfidenceTier::from_confidence(Confidence::new(0.84)),
            ConfidenceTier::Moderate
        );
        assert_eq!(
            ConfidenceTier::from_confidence(Confidence::new(0.60)),
            ConfidenceTier::Moderate
        );
        assert_eq!(
            ConfidenceTier::from_confidence(Confidence::new(0.59)),
            ConfidenceTier::Low
        );
    }

    #[test]
    fn half_correct_at_high_raw_pulls_confidence_down() {
        let raw = vec![0.9; 100];
        let outcomes: Vec<f64> = (0..100).map(|i| if i < 50 { 1.0 } else { 0.0 }).collect();

        let mut cal = ConfidenceCalibrator::new();
        let report = cal.fit(&raw, &outcomes).unwrap();

        let result = cal.calibrate(Confidence::new(0.9));
        assert!(result.is_calibrated);
        assert!(result.calibrated.value() < 0.6);
        assert!(report.brier_after < report.brier_before);
    }

    #[test]
    fn calibration_is_monotone_after_fit() {
        let raw = vec![0.1, 0.3, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95];
        let outcomes = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let mut cal = ConfidenceCalibrator::new();
        cal.fit(&raw, &outcomes).unwrap();

        let mut prev = -1.0;
        for i in 0..=20 {
            let c = cal.calibrate(Confidence::new(i as f64 / 20.0));
            assert!(c.calibrated.value() >= prev);
            prev = c.calibrated.value();
        }
    }

    #[test]
    fn fit_rejects_invalid_input() {
        let mut cal = ConfidenceCalibrator::new();
        assert!(cal.fit(&[], &[]).is_err());
        assert!(cal.fit(&[0.5], &[1.0, 0.0]).is_err());
        assert!(cal.fit(&[1.5], &[1.0]).is_err());
        assert!(cal.fit(&[0.5], &[0.7]).is_err());
        assert!(!cal.is_fitted());
    }

    #[test]
    fn failed_fit_preserves_previous_model() {
        let mut cal = ConfidenceCalibrator::new();
        cal.fit(&[0.2, 0.8], &[0.0, 1.0]).unwrap();
        let before = cal.calibrate(Confidence::new(0.8));

        assert!(cal.fit(&[2.0], &[1.0]).is_err());
        let after = cal.calibrate(Confidence::new(0.8));
        assert_eq!(before, after);
        assert_eq!(cal.retrain_count(), 1);
    }

    #[test]
    fn retrain_count_increments_per_successful_fit() {
        let mut cal = ConfidenceCalibrator::new();
        cal.fit(&[0.2, 0.8], &[0.0, 1.0]).unwrap();
        cal.fit(&[0.3, 0.7], &[0.0, 1.0]).unwrap();
        assert_eq!(cal.retrain_count(), 2);
        assert_eq!(cal.last_report().unwrap().retrain_count, 2);
    }

    #[test]
    fn last_report_errors_before_any_fit() {
        let cal = ConfidenceCalibrator::new();
        assert!(matches!(
            cal.last_report(),
            Err(CalibrationError::NotFitted)
        ));
    }
}
